use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CaptureError;

/// Fixed capture sample rate in Hz.
pub const SAMPLE_RATE: u32 = 44_100;

/// Samples per capture frame; the block size requested from the device.
pub const FRAME_SIZE: usize = 1024;

/// Spectral bins over the non-negative frequencies of one frame.
pub const SPECTRUM_BINS: usize = FRAME_SIZE / 2 + 1;

/// Immutable snapshot driving one capture session.
///
/// A reconfiguration never mutates a running session; it tears the session
/// down and starts a new one from a fresh snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Input device name (substring match); `None` uses the default device.
    pub device: Option<String>,
    /// Number of frequency bars to produce per frame.
    pub bars: usize,
    /// Linear gain applied to magnitudes before display scaling.
    pub sensitivity: f32,
    /// Exponential smoothing factor in `[0, 1)`.
    pub smoothing: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: None,
            bars: 16,
            sensitivity: 150.0,
            smoothing: 0.7,
        }
    }
}

impl CaptureConfig {
    /// Check the session invariants before any device is touched.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.bars == 0 {
            return Err(CaptureError::InvalidConfig(
                "band count must be positive".into(),
            ));
        }
        if self.bars > SPECTRUM_BINS {
            return Err(CaptureError::InvalidConfig(format!(
                "band count {} exceeds the {} available spectral bins",
                self.bars, SPECTRUM_BINS
            )));
        }
        if !(self.sensitivity > 0.0) {
            return Err(CaptureError::InvalidConfig(
                "sensitivity must be positive".into(),
            ));
        }
        if !(self.smoothing >= 0.0 && self.smoothing < 1.0) {
            return Err(CaptureError::InvalidConfig(format!(
                "smoothing factor {} outside [0, 1)",
                self.smoothing
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the default XDG config path (~/.config/barspec/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("barspec").join("config.toml"))
    }

    /// Load config from the default XDG path if it exists
    /// Returns None if file doesn't exist, logs warning on parse errors
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            match Self::load(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    eprintln!(
                        "Warning: Failed to parse config at {}: {}\nUsing defaults.",
                        path.display(),
                        e
                    );
                    None
                }
            }
        } else {
            None
        }
    }

    /// Initialize default config file at XDG path, returns the path
    pub fn init_default_config() -> Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = Self::generate_config_template();
        std::fs::write(&path, template)?;

        Ok(path)
    }

    /// Generate a commented TOML config template
    pub fn generate_config_template() -> String {
        r#"# Barspec Configuration
# This file is auto-generated. Edit as needed.

[capture]
# Input device name, matched as a substring of the device's display name
# (omit for the default input device; see `barspec --list-devices`)
# device = "pipewire"
# Number of frequency bars (1-513)
bars = 16
# Linear gain applied to magnitudes before display scaling
sensitivity = 150.0
# Smoothing factor (0.0-0.95, higher = smoother)
smoothing = 0.7
"#
        .to_string()
    }

    /// Merge CLI arguments into config (CLI takes priority)
    pub fn merge_args(&mut self, args: &crate::Args) {
        if let Some(ref device) = args.device {
            self.capture.device = Some(device.clone());
        }
        if let Some(bars) = args.bars {
            self.capture.bars = bars;
        }
        if let Some(sensitivity) = args.sensitivity {
            self.capture.sensitivity = sensitivity;
        }
        if let Some(smoothing) = args.smoothing {
            self.capture.smoothing = smoothing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CaptureConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_bars() {
        let config = CaptureConfig {
            bars: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CaptureError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_more_bars_than_spectral_bins() {
        let config = CaptureConfig {
            bars: SPECTRUM_BINS + 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CaptureError::InvalidConfig(_))
        ));

        // The boundary itself is allowed.
        let config = CaptureConfig {
            bars: SPECTRUM_BINS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_smoothing_outside_unit_interval() {
        for smoothing in [1.0, 1.5, -0.1, f32::NAN] {
            let config = CaptureConfig {
                smoothing,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "smoothing {smoothing} accepted");
        }

        // Both configured extremes are valid.
        for smoothing in [0.0, 0.95] {
            let config = CaptureConfig {
                smoothing,
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn rejects_non_positive_sensitivity() {
        for sensitivity in [0.0, -1.0, f32::NAN] {
            let config = CaptureConfig {
                sensitivity,
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn template_parses_to_defaults() {
        let config: Config = toml::from_str(&Config::generate_config_template()).unwrap();
        assert_eq!(config.capture.bars, 16);
        assert_eq!(config.capture.sensitivity, 150.0);
        assert_eq!(config.capture.smoothing, 0.7);
        assert!(config.capture.device.is_none());
    }

    #[test]
    fn partial_config_file_uses_defaults() {
        let config: Config = toml::from_str("[capture]\nbars = 32\n").unwrap();
        assert_eq!(config.capture.bars, 32);
        assert_eq!(config.capture.smoothing, 0.7);
    }
}
