//! On-disk configuration for the stereo viewer.
//!
//! Stored as TOML under the platform config directory. A missing or
//! unreadable file never blocks startup: [`AppConfig::load_or_default`]
//! falls back to the built-in defaults.

mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

impl AppConfig {
    /// Default config file location:
    /// `<platform config dir>/vista-app/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("vista-app");
        Ok(dir.join("config.toml"))
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(?path, "No config found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        info!(?path, "Loaded config");
        Ok(config)
    }

    /// Load from the default location, falling back to the defaults on
    /// any error so a corrupt file only costs the saved settings.
    pub fn load_or_default() -> Self {
        match Self::default_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                warn!(?e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(?path, "Saved config");
        Ok(())
    }

    /// Write to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vista-config-{}-{}.toml", name, std::process::id()))
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let path = temp_path("roundtrip");
        let mut config = AppConfig::default();
        config.camera.position = Vec3::new(1.5, -2.0, 0.25);
        config.camera.parallax = 0.32;
        config.tracker.drift_correction = false;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.camera.position, config.camera.position);
        assert!((loaded.camera.parallax - 0.32).abs() < 1e-6);
        assert!(!loaded.tracker.drift_correction);
    }

    #[test]
    fn position_parses_from_plain_array() {
        let toml_src = r#"
            [display]
            width = 3840
            height = 1080

            [camera]
            fov_y_degrees = 80.0
            parallax = 0.4
            near = 0.1
            far = 30.0
            position = [-1.7, 3.0, 3.0]

            [tracker]
            drift_correction = true
        "#;
        let config: AppConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.camera.position, Vec3::new(-1.7, 3.0, 3.0));
        assert!((config.display.eye_aspect() - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = temp_path("does-not-exist");
        std::fs::remove_file(&path).ok();
        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.tracker.drift_correction);
        assert_eq!(config.camera.position, Vec3::new(-1.7, 3.0, 3.0));
    }
}
