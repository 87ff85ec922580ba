// SPDX-License-Identifier: GPL-3.0-only

//! Runtime configuration
//!
//! Configuration is a JSON file under the user's config directory. Every
//! field has a default, so a partial (or missing) file is valid.

use crate::constants::{self, timing};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Directory name under the platform config dir
const APP_DIR: &str = "bactrack";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP bind address
    pub host: String,
    /// HTTP bind port
    pub port: u16,
    /// V4L2 capture node
    pub camera_device: String,
    /// Requested capture width
    pub frame_width: u32,
    /// Requested capture height
    pub frame_height: u32,
    /// Replay an image file or a directory of images instead of a webcam
    pub image_source: Option<PathBuf>,
    /// Mirror frames horizontally (selfie mode)
    pub mirror_preview: bool,
    /// Command line of the external pose helper; empty disables pose detection
    pub extractor_command: Vec<String>,
    /// TTF font for overlay labels
    pub font_path: Option<PathBuf>,
    /// JPEG quality of the video stream (1-100)
    pub jpeg_quality: u8,
    /// Delay between video stream parts
    pub stream_interval_ms: u64,
    /// Cadence of the rating push channel
    pub push_interval_ms: u64,
    /// Pause after a `rating` command on the command channel
    pub rating_cooldown_secs: u64,
    /// Maximum number of rating samples kept
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: constants::DEFAULT_HOST.to_string(),
            port: constants::DEFAULT_PORT,
            camera_device: constants::DEFAULT_CAMERA_DEVICE.to_string(),
            frame_width: constants::DEFAULT_FRAME_WIDTH,
            frame_height: constants::DEFAULT_FRAME_HEIGHT,
            image_source: None,
            mirror_preview: true,
            extractor_command: Vec::new(),
            font_path: None,
            jpeg_quality: constants::DEFAULT_JPEG_QUALITY,
            stream_interval_ms: timing::STREAM_INTERVAL.as_millis() as u64,
            push_interval_ms: timing::PUSH_INTERVAL.as_millis() as u64,
            rating_cooldown_secs: timing::RATING_COOLDOWN.as_secs(),
            history_limit: constants::RATING_HISTORY_LIMIT,
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration from `path`, or defaults when the file does not exist
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded configuration");
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location, falling back to defaults
    pub fn load_default() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Write configuration as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> AppResult<()> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(AppError::Config(format!(
                "jpeg_quality must be within 1-100, got {}",
                self.jpeg_quality
            )));
        }
        if self.history_limit == 0 {
            return Err(AppError::Config("history_limit must be positive".into()));
        }
        if self.push_interval_ms == 0 {
            return Err(AppError::Config("push_interval_ms must be positive".into()));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(AppError::Config("frame size must be non-zero".into()));
        }
        Ok(())
    }

    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }

    pub fn push_interval(&self) -> Duration {
        Duration::from_millis(self.push_interval_ms)
    }

    pub fn rating_cooldown(&self) -> Duration {
        Duration::from_secs(self.rating_cooldown_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.history_limit, 1000);
        assert!(config.mirror_preview);
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        let config = Config {
            jpeg_quality: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_push_interval() {
        let config: Config = serde_json::from_str(r#"{"push_interval_ms": 0}"#).unwrap();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("bactrack-config-{}", std::process::id()));
        let path = dir.join("config.json");
        let config = Config {
            port: 8123,
            extractor_command: vec!["pose-helper".into(), "--fast".into()],
            ..Config::default()
        };

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = Path::new("/nonexistent/bactrack/config.json");
        assert_eq!(Config::load(path).unwrap(), Config::default());
    }
}
