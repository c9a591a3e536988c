//! Copying rendered frames back to the CPU and saving them as PNG.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::mpsc;

/// Row pitch for a `width`-pixel RGBA8 copy, rounded up to wgpu's copy alignment.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * 4).div_ceil(align) * align
}

/// Strip row padding from a mapped copy buffer.
fn unpad_rows(mapped: &[u8], padded_row: u32, size: (u32, u32)) -> Vec<u8> {
    let row = (size.0 * 4) as usize;
    mapped
        .chunks(padded_row as usize)
        .take(size.1 as usize)
        .flat_map(|chunk| &chunk[..row])
        .copied()
        .collect()
}

/// Reorder texels of `format` into RGBA8 in place.
fn normalize_channels(format: wgpu::TextureFormat, pixels: &mut [u8]) -> Result<()> {
    match format {
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => Ok(()),
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => {
            pixels.chunks_exact_mut(4).for_each(|px| px.swap(0, 2));
            Ok(())
        }
        other => bail!("cannot capture frames in {other:?}"),
    }
}

/// Frame copy queued on a command encoder, waiting to be mapped.
pub struct FrameCapture {
    buffer: wgpu::Buffer,
    padded_row: u32,
    size: (u32, u32),
    format: wgpu::TextureFormat,
}

impl FrameCapture {
    /// Queue a copy of `texture` into a mappable buffer on `encoder`.
    ///
    /// Submit the encoder before calling [`FrameCapture::into_rgba8`].
    pub fn record(
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        texture: &wgpu::Texture,
        format: wgpu::TextureFormat,
        size: (u32, u32),
    ) -> Self {
        let padded_row = padded_bytes_per_row(size.0);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Capture Buffer"),
            size: padded_row as u64 * size.1 as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(size.1),
                },
            },
            wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );

        Self {
            buffer,
            padded_row,
            size,
            format,
        }
    }

    /// Pixel dimensions of the captured frame.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Block until the copy lands, then return tightly packed RGBA8 rows.
    pub fn into_rgba8(self, device: &wgpu::Device) -> Result<Vec<u8>> {
        let slice = self.buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .context("frame capture channel closed")?
            .context("mapping frame capture buffer failed")?;

        let mut pixels = {
            let mapped = slice.get_mapped_range();
            unpad_rows(&mapped, self.padded_row, self.size)
        };
        self.buffer.unmap();

        normalize_channels(self.format, &mut pixels)?;
        tracing::debug!(width = self.size.0, height = self.size.1, "frame captured");
        Ok(pixels)
    }
}

/// Save RGBA8 pixels as a PNG, creating parent directories as needed.
pub fn write_png(path: &Path, size: (u32, u32), rgba: &[u8]) -> Result<()> {
    let image = image::RgbaImage::from_raw(size.0, size.1, rgba.to_vec()).with_context(|| {
        format!(
            "{} bytes do not describe a {}x{} RGBA image",
            rgba.len(),
            size.0,
            size.1
        )
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "screenshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}_{nanos}"))
    }

    #[test]
    fn rows_are_padded_to_copy_alignment() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(1), 256);
    }

    #[test]
    fn unpad_drops_trailing_bytes() {
        let padded_row = 8;
        let mapped = [1, 2, 3, 4, 9, 9, 9, 9, 5, 6, 7, 8, 9, 9, 9, 9];
        assert_eq!(
            unpad_rows(&mapped, padded_row, (1, 2)),
            vec![1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn bgra_is_swizzled_to_rgba() {
        let mut pixels = vec![3, 2, 1, 4, 7, 6, 5, 8];
        normalize_channels(wgpu::TextureFormat::Bgra8UnormSrgb, &mut pixels).unwrap();
        assert_eq!(pixels, vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let mut rgba = vec![1, 2, 3, 4];
        normalize_channels(wgpu::TextureFormat::Rgba8UnormSrgb, &mut rgba).unwrap();
        assert_eq!(rgba, vec![1, 2, 3, 4]);
    }

    #[test]
    fn float_formats_are_rejected() {
        let mut pixels = vec![0; 8];
        assert!(normalize_channels(wgpu::TextureFormat::Rgba16Float, &mut pixels).is_err());
    }

    #[test]
    fn png_survives_a_trip_through_disk() {
        let dir = temp_dir("barscape_png");
        let path = dir.join("nested").join("frame.png");
        let rgba = vec![
            255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 255, 255, 255, 255,
        ];
        write_png(&path, (2, 2), &rgba).expect("write png");

        let image = image::open(&path).expect("open png").to_rgba8();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.as_raw(), &rgba);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn short_buffers_are_an_error() {
        let path = temp_dir("barscape_short").join("frame.png");
        assert!(write_png(&path, (4, 4), &[0; 8]).is_err());
    }
}
