//! Hex colour → GPU colour conversion.

use barscape_layout::Rgb;

/// Decode one sRGB-encoded channel in `[0, 1]` to linear.
pub fn srgb_to_linear(channel: f32) -> f32 {
    if channel <= 0.04045 {
        channel / 12.92
    } else {
        ((channel + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear RGBA with alpha 1, for vertex/instance data written to an sRGB target.
pub fn linear_rgba(color: Rgb) -> [f32; 4] {
    let channel = |c: u8| srgb_to_linear(c as f32 / 255.0);
    [channel(color.r()), channel(color.g()), channel(color.b()), 1.0]
}

/// Linear clear colour.
pub fn clear_color(color: Rgb) -> wgpu::Color {
    let [r, g, b, a] = linear_rgba(color);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: a as f64,
    }
}
