//! Configuration for the gesture trainer.
//!
//! Four values drive the pipeline: sampling rate, window size, window offset,
//! and the gesture vocabulary. Every buffer-capacity figure is derived from
//! them; nothing downstream hard-codes a size. Validation is fatal at
//! startup: a geometry that would misalign windows refuses to run.

use crate::core::window::{WindowBuffer, WindowGeometryError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the pipeline and game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Nominal sampling cadence in Hz
    pub samples_per_second: u32,

    /// Samples per classification window
    pub window_size: usize,

    /// Samples advanced between consecutive windows
    pub window_offset: usize,

    /// Gesture vocabulary, in model output order
    pub labels: Vec<String>,

    /// Countdown length of one game round, in seconds
    pub round_seconds: u32,

    /// How long a finished round stays on screen, in seconds
    pub hold_seconds: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            samples_per_second: 25,
            window_size: 20,
            window_offset: 5,
            labels: ["chop_it", "drive_it", "shake_it", "rest_it"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            round_seconds: 3,
            hold_seconds: 1,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gesture-trainer")
            .join("config.json")
    }

    /// Check that the pipeline can run with this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples_per_second == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        WindowBuffer::check_geometry(self.window_size, self.window_offset)?;
        if self.labels.is_empty() {
            return Err(ConfigError::EmptyLabels);
        }
        if self.round_seconds == 0 {
            return Err(ConfigError::ZeroRoundSeconds);
        }
        Ok(())
    }

    /// Overlapping windows held simultaneously.
    pub fn number_of_windows(&self) -> usize {
        WindowBuffer::number_of_windows_for(self.window_size, self.window_offset)
    }

    /// Derived sample capacity of the window buffer.
    pub fn buffer_size(&self) -> usize {
        WindowBuffer::capacity_for(self.window_size, self.window_offset)
    }

    /// Interval between consecutive samples.
    ///
    /// Total even for an invalid rate (reported elsewhere), so a bad config
    /// can still be displayed.
    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.samples_per_second.max(1)))
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    Geometry(WindowGeometryError),
    ZeroSampleRate,
    EmptyLabels,
    ZeroRoundSeconds,
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl From<WindowGeometryError> for ConfigError {
    fn from(e: WindowGeometryError) -> Self {
        ConfigError::Geometry(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Geometry(e) => write!(f, "Window geometry error: {e}"),
            ConfigError::ZeroSampleRate => write!(f, "Sampling rate must be nonzero"),
            ConfigError::EmptyLabels => write!(f, "Gesture label set must not be empty"),
            ConfigError::ZeroRoundSeconds => write!(f, "Round length must be nonzero"),
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.samples_per_second, 25);
        assert_eq!(config.window_size, 20);
        assert_eq!(config.window_offset, 5);
        assert_eq!(config.labels.len(), 4);
    }

    #[test]
    fn test_derived_sizes() {
        let config = Config::default();
        assert_eq!(config.number_of_windows(), 4);
        assert_eq!(config.buffer_size(), 35);
        assert_eq!(config.sample_interval(), Duration::from_millis(40));
    }

    #[test]
    fn test_unaligned_offset_refused() {
        let config = Config {
            window_offset: 7,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Geometry(
                WindowGeometryError::UnalignedOffset { .. }
            ))
        ));
    }

    #[test]
    fn test_empty_labels_refused() {
        let config = Config {
            labels: Vec::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyLabels)));
    }
}
