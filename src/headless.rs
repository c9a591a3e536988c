use anyhow::{Context, Result};
use barscape_render::{Renderer, RendererConfig};
use barscape_scene::SceneContext;
use std::path::PathBuf;

pub struct HeadlessConfig {
    pub scene: SceneContext,
    pub width: u32,
    pub height: u32,
    pub screenshot: PathBuf,
}

/// Render a single frame off-screen and write it to `cfg.screenshot`.
pub fn run(cfg: HeadlessConfig) -> Result<()> {
    let mut renderer = Renderer::new(
        RendererConfig {
            width: cfg.width.max(1),
            height: cfg.height.max(1),
            vsync: false,
        },
        cfg.scene,
    );

    pollster::block_on(renderer.initialize_gpu_headless())
        .context("failed to initialize headless renderer")?;

    renderer
        .capture_png(&cfg.screenshot)
        .with_context(|| format!("failed to capture {}", cfg.screenshot.display()))?;

    tracing::info!(
        path = %cfg.screenshot.display(),
        width = renderer.config().width,
        height = renderer.config().height,
        aspect = renderer.camera().aspect,
        "headless frame captured"
    );
    Ok(())
}
