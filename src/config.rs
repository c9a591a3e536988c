use anyhow::Result;
use barscape_render::WindowConfig;
use barscape_scene::SceneOptions;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/barscape.toml";

/// Window section of `barscape.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        let defaults = WindowConfig::default();
        Self {
            title: defaults.title,
            width: defaults.width,
            height: defaults.height,
            vsync: defaults.vsync,
        }
    }
}

impl WindowSettings {
    pub fn to_window_config(&self) -> WindowConfig {
        WindowConfig {
            title: self.title.clone(),
            width: self.width.max(1),
            height: self.height.max(1),
            vsync: self.vsync,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BarscapeConfig {
    /// JSON record file; the built-in dataset is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture: Option<PathBuf>,
    pub window: WindowSettings,
    pub scene: SceneOptions,
}

impl BarscapeConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<BarscapeConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    BarscapeConfig::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if path != Path::new(DEFAULT_CONFIG_PATH) {
                    warn!("Config not found at {}. Using defaults", path.display());
                }
                BarscapeConfig::default()
            }
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                BarscapeConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barscape_layout::Rgb;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(prefix: &str, ext: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}_{nanos}.{ext}"))
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = BarscapeConfig::load_from_path(&temp_path("barscape_missing", "toml"));
        assert_eq!(cfg, BarscapeConfig::default());
        assert!(cfg.scene.show_markers);
        assert!(!cfg.scene.show_ground);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let path = temp_path("barscape_partial", "toml");
        fs::write(
            &path,
            "[scene]\nshow_ground = true\naxis_color = 0x333333\n\n[scene.camera]\nposition = [15.0, 15.0, 15.0]\n",
        )
        .unwrap();

        let cfg = BarscapeConfig::load_from_path(&path);
        assert!(cfg.scene.show_ground);
        assert_eq!(cfg.scene.axis_color, Rgb(0x333333));
        assert_eq!(cfg.scene.camera.position, [15.0, 15.0, 15.0]);
        assert_eq!(cfg.scene.camera.target, [3.0, 0.0, 3.0]);
        assert_eq!(cfg.scene.grid.columns, 4);
        assert_eq!(cfg.window, WindowSettings::default());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn invalid_toml_uses_defaults() {
        let path = temp_path("barscape_invalid", "toml");
        fs::write(&path, "[scene\nshow_ground = ").unwrap();
        assert_eq!(BarscapeConfig::load_from_path(&path), BarscapeConfig::default());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = temp_path("barscape_cfg_dir", "d");
        let path = dir.join("barscape.toml");
        let mut cfg = BarscapeConfig::default();
        cfg.fixture = Some(PathBuf::from("data/records.json"));
        cfg.window.width = 640;
        cfg.scene.vertical_ticks = 3;

        cfg.save_to_path(&path).unwrap();
        assert_eq!(BarscapeConfig::load_from_path(&path), cfg);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn window_settings_never_produce_zero_size() {
        let settings = WindowSettings {
            width: 0,
            height: 0,
            ..WindowSettings::default()
        };
        let window = settings.to_window_config();
        assert_eq!((window.width, window.height), (1, 1));
    }
}
