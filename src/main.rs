//! barscape - a static 3D bar chart
//!
//! Main executable: windowed viewer, headless screenshot and layout dump modes

mod config;
mod headless;
mod viewer;

use anyhow::{Context, Result};
use barscape_layout::{map_records, Fixture};
use barscape_scene::SceneContext;
use config::BarscapeConfig;
use std::{env, path::Path, path::PathBuf};
use tracing::info;

const DEFAULT_SCREENSHOT_PATH: &str = "target/barscape.png";

fn main() -> Result<()> {
    // WARN by default; override with RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting barscape v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let mut config = match cli.config.as_deref() {
        Some(path) => BarscapeConfig::load_from_path(path),
        None => BarscapeConfig::load(),
    };
    cli.apply_to(&mut config);

    if let Some(path) = cli.save_config.as_deref() {
        config
            .save_to_path(path)
            .with_context(|| format!("failed to save config to {}", path.display()))?;
        info!(path = %path.display(), "config saved");
        return Ok(());
    }

    let fixture = load_fixture(config.fixture.as_deref())?;

    if cli.dump_layout {
        let boxes = map_records(fixture.records(), config.scene.grid)?;
        println!("{}", serde_json::to_string_pretty(&boxes)?);
        return Ok(());
    }

    let scene = SceneContext::build(fixture.records(), &config.scene)?;

    if cli.headless {
        let screenshot = cli
            .screenshot
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCREENSHOT_PATH));
        return headless::run(headless::HeadlessConfig {
            scene,
            width: config.window.width,
            height: config.window.height,
            screenshot,
        });
    }

    if cli.screenshot.is_some() {
        tracing::error!("--screenshot requires --headless");
    }

    viewer::run(scene, config.window.to_window_config())
}

fn load_fixture(path: Option<&Path>) -> Result<Fixture> {
    match path {
        Some(path) => Fixture::from_path(path)
            .with_context(|| format!("failed to load records from {}", path.display())),
        None => Fixture::builtin().context("built-in records are malformed"),
    }
}

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    config: Option<PathBuf>,
    save_config: Option<PathBuf>,
    fixture: Option<PathBuf>,
    dump_layout: bool,
    headless: bool,
    screenshot: Option<PathBuf>,
    resolution: Option<(u32, u32)>,
    show_ground: bool,
    hide_markers: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--config requires a file path");
                    }
                }
                "--save-config" => {
                    if let Some(path) = args.next() {
                        opts.save_config = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--save-config requires a file path");
                    }
                }
                "--fixture" => {
                    if let Some(path) = args.next() {
                        opts.fixture = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--fixture requires a file path");
                    }
                }
                "--dump-layout" => opts.dump_layout = true,
                "--headless" => opts.headless = true,
                "--screenshot" => {
                    if let Some(path) = args.next() {
                        opts.screenshot = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--screenshot requires a file path");
                    }
                }
                "--resolution" => {
                    if let Some(raw) = args.next() {
                        match parse_resolution(&raw) {
                            Some(resolution) => opts.resolution = Some(resolution),
                            None => {
                                tracing::error!(value = %raw, "--resolution must be like 1280x720");
                            }
                        }
                    } else {
                        tracing::error!("--resolution requires a value like 1280x720");
                    }
                }
                "--show-ground" => opts.show_ground = true,
                "--hide-markers" => opts.hide_markers = true,
                other => {
                    tracing::error!(arg = %other, "Unknown argument");
                }
            }
        }

        opts
    }

    /// Layer command-line overrides on top of the loaded config.
    fn apply_to(&self, config: &mut BarscapeConfig) {
        if let Some(path) = &self.fixture {
            config.fixture = Some(path.clone());
        }
        if self.show_ground {
            config.scene.show_ground = true;
        }
        if self.hide_markers {
            config.scene.show_markers = false;
        }
        if let Some((width, height)) = self.resolution {
            config.window.width = width;
            config.window.height = height;
        }
    }
}

fn parse_resolution(raw: &str) -> Option<(u32, u32)> {
    let (w, h) = raw.split_once('x')?;
    match (w.parse::<u32>(), h.parse::<u32>()) {
        (Ok(width), Ok(height)) if width > 0 && height > 0 => Some((width, height)),
        _ => None,
    }
}
