use anyhow::{Context, Result};
use barscape_render::{
    ChartWindow, FrameStatus, Renderer, RendererConfig, WindowConfig, WindowSignal,
};
use barscape_scene::SceneContext;
use tracing::{debug, info};

/// Open a window and redraw the chart until it is closed.
pub fn run(scene: SceneContext, window_config: WindowConfig) -> Result<()> {
    let window = ChartWindow::open(&window_config).context("failed to create window")?;
    let (width, height) = window.size();

    let mut renderer = Renderer::new(
        RendererConfig {
            width,
            height,
            vsync: window_config.vsync,
        },
        scene,
    );
    pollster::block_on(renderer.initialize_gpu(window.window()))
        .context("failed to initialize GPU")?;
    info!(width, height, "viewer started");

    window.run(move |signal| match signal {
        WindowSignal::Resized(size) => {
            renderer.resize(size);
            Ok(())
        }
        WindowSignal::Redraw => {
            let status = renderer.render_frame().context("render failed")?;
            if status == FrameStatus::Skipped {
                debug!("frame skipped");
            }
            Ok(())
        }
    })
}
