#![warn(missing_docs)]
//! Rendering facade built on top of wgpu.
//!
//! [`Renderer`] owns the GPU context, the scene pipeline and the camera. It
//! draws into a window surface or an off-screen texture that can be captured
//! to PNG.

mod camera;
mod color;
mod mesh;
mod pipeline;
mod readback;
mod window;

pub use camera::Camera;
pub use color::{clear_color, linear_rgba, srgb_to_linear};
pub use mesh::{unit_cube, unit_disk, unit_sphere, MeshBuffers, MeshVertex};
pub use pipeline::{
    HeadlessTarget, InstanceRaw, LightUniform, LineVertexRaw, RenderContext, ScenePipeline,
    SceneUniform, MAX_LIGHTS,
};
pub use readback::{padded_bytes_per_row, write_png, FrameCapture};
pub use window::{ChartWindow, WindowConfig, WindowSignal};

use anyhow::{Context, Result};
use barscape_scene::SceneContext;
use std::path::Path;

/// Renderer configuration for headless + onscreen paths.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// Present with vsync in windowed mode.
    pub vsync: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// Outcome of one [`Renderer::render_frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The frame was drawn (and presented, when windowed).
    Drawn,
    /// The surface was lost or outdated; it was reconfigured and the frame skipped.
    Skipped,
    /// GPU initialisation has not happened yet.
    Uninitialized,
}

/// Main renderer owning GPU resources.
pub struct Renderer {
    config: RendererConfig,
    scene: SceneContext,
    context: Option<RenderContext>,
    pipeline: Option<ScenePipeline>,
    camera: Camera,
}

impl Renderer {
    /// Construct a renderer for `scene`. GPU resources are created later.
    pub fn new(config: RendererConfig, scene: SceneContext) -> Self {
        let camera = Camera::from_rig(
            scene.camera(),
            config.width as f32 / config.height.max(1) as f32,
        );
        tracing::info!(?config, "renderer initialized");

        Self {
            config,
            scene,
            context: None,
            pipeline: None,
            camera,
        }
    }

    /// Initialize GPU resources with a window (async).
    pub async fn initialize_gpu(
        &mut self,
        window: std::sync::Arc<winit::window::Window>,
    ) -> Result<()> {
        let context = RenderContext::new(window, self.config.vsync).await?;
        self.install(context)
    }

    /// Initialize GPU resources for headless/offscreen rendering (async).
    pub async fn initialize_gpu_headless(&mut self) -> Result<()> {
        let context = RenderContext::new_headless(
            (self.config.width, self.config.height),
            wgpu::TextureFormat::Rgba8UnormSrgb,
        )
        .await?;
        self.install(context)
    }

    fn install(&mut self, context: RenderContext) -> Result<()> {
        let pipeline = ScenePipeline::new(&context, &self.scene)?;
        self.camera.set_viewport(context.size);
        self.config.width = context.size.0;
        self.config.height = context.size.1;
        self.context = Some(context);
        self.pipeline = Some(pipeline);
        Ok(())
    }

    /// Access the renderer configuration.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Get reference to the camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Resize the renderer. Zero-sized requests are ignored.
    pub fn resize(&mut self, new_size: (u32, u32)) {
        if new_size.0 == 0 || new_size.1 == 0 {
            return;
        }
        self.config.width = new_size.0;
        self.config.height = new_size.1;
        self.camera.set_viewport(new_size);
        if let Some(context) = &mut self.context {
            context.resize(new_size);
            if let Some(pipeline) = &mut self.pipeline {
                pipeline.resize(&context.device, new_size);
            }
        }
    }

    /// Draw one frame into the window surface or the headless target.
    pub fn render_frame(&mut self) -> Result<FrameStatus> {
        let (Some(context), Some(pipeline)) = (self.context.as_ref(), self.pipeline.as_ref())
        else {
            return Ok(FrameStatus::Uninitialized);
        };

        pipeline.update_camera(&context.queue, &self.camera);

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        if let Some(surface) = context.surface.as_ref() {
            let output = match surface.get_current_texture() {
                Ok(output) => output,
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    tracing::warn!("surface lost or outdated; reconfiguring");
                    context.reconfigure();
                    return Ok(FrameStatus::Skipped);
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    tracing::warn!("surface timed out; skipping frame");
                    return Ok(FrameStatus::Skipped);
                }
                Err(err @ wgpu::SurfaceError::OutOfMemory) => {
                    return Err(err).context("GPU is out of memory");
                }
            };
            let view = output
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            pipeline.render(&mut encoder, &view);
            context.queue.submit(Some(encoder.finish()));
            output.present();
        } else {
            let headless = context
                .headless
                .as_ref()
                .context("render context has neither a surface nor a headless target")?;
            let view = headless
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            pipeline.render(&mut encoder, &view);
            context.queue.submit(Some(encoder.finish()));
        }

        Ok(FrameStatus::Drawn)
    }

    /// Render a frame off-screen and return its RGBA8 pixels.
    pub fn capture_rgba(&mut self) -> Result<((u32, u32), Vec<u8>)> {
        if self.render_frame()? != FrameStatus::Drawn {
            anyhow::bail!("renderer is not ready to capture a frame");
        }
        let context = self
            .context
            .as_ref()
            .context("renderer is not initialized")?;
        let headless = context
            .headless
            .as_ref()
            .context("frame capture needs a headless renderer")?;

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Capture Encoder"),
            });
        let capture = FrameCapture::record(
            &context.device,
            &mut encoder,
            &headless.texture,
            context.config.format,
            context.size,
        );
        context.queue.submit(Some(encoder.finish()));

        let size = capture.size();
        let pixels = capture.into_rgba8(&context.device)?;
        Ok((size, pixels))
    }

    /// Render a frame off-screen and save it to `path` as PNG.
    pub fn capture_png(&mut self, path: &Path) -> Result<()> {
        let (size, pixels) = self.capture_rgba()?;
        write_png(path, size, &pixels)
    }
}
