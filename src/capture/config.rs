//! Camera capture configuration.
//!
//! Settings applied to a device after initialization, plus the TOML file
//! format the command-line tool reads.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Highest frame rate accepted by [`CaptureConfig::validate`].
pub const MAX_FRAME_RATE_HZ: f64 = 120.0;

/// Configuration for camera capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Gain in percent.
    pub gain: i32,
    /// Exposure time in seconds.
    pub exposure_s: f64,
    /// Target frame rate in Hz.
    pub frame_rate_hz: f64,
    /// Bits per pixel element (8 or 16).
    pub bit_depth: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            gain: 1,
            exposure_s: 0.01, // 10ms
            frame_rate_hz: 30.0,
            bit_depth: 8,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if !(0..=100).contains(&self.gain) {
            return Err(ConfigError::InvalidGain(self.gain));
        }
        if !(self.exposure_s > 0.0) {
            return Err(ConfigError::InvalidExposure);
        }
        if !(self.frame_rate_hz > 0.0 && self.frame_rate_hz <= MAX_FRAME_RATE_HZ) {
            return Err(ConfigError::InvalidFrameRate);
        }
        if self.bit_depth != 8 && self.bit_depth != 16 {
            return Err(ConfigError::InvalidBitDepth(self.bit_depth));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    /// Gain is outside 0-100 percent.
    #[error("invalid gain {0}% (must be 0-100)")]
    InvalidGain(i32),
    /// Exposure is not a positive number of seconds.
    #[error("invalid exposure time")]
    InvalidExposure,
    /// Frame rate is not above zero or exceeds the maximum.
    #[error("invalid frame rate (must be above 0 and at most 120 Hz)")]
    InvalidFrameRate,
    /// Bit depth is neither 8 nor 16.
    #[error("invalid bit depth {0} (must be 8 or 16)")]
    InvalidBitDepth(u8),
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Sensor settings.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Session and exporter settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Frames to collect in continuous mode before stopping.
    pub frame_count: u64,
    /// Make the synthetic camera fail after this many frames.
    pub fail_after: Option<u64>,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            frame_count: 100,
            fail_after: None,
            metrics_port: 9090,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.capture.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = CaptureConfig::default();
        config.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_out_of_range_values_invalid() {
        let mut config = CaptureConfig::default();
        config.gain = 101;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGain(101))));

        let mut config = CaptureConfig::default();
        config.exposure_s = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidExposure)));

        let mut config = CaptureConfig::default();
        config.frame_rate_hz = 240.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidFrameRate)));

        let mut config = CaptureConfig::default();
        config.bit_depth = 12;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBitDepth(12))));
    }

    #[test]
    fn test_parse_partial_file() {
        let config = FileConfig::from_toml(
            r#"
            [capture]
            width = 320
            height = 240
            bit_depth = 16

            [output]
            frame_count = 5
            fail_after = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.capture.width, 320);
        assert_eq!(config.capture.height, 240);
        assert_eq!(config.capture.bit_depth, 16);
        assert_eq!(config.capture.frame_rate_hz, 30.0);
        assert_eq!(config.output.frame_count, 5);
        assert_eq!(config.output.fail_after, Some(3));
        assert_eq!(config.output.metrics_port, 9090);
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        let result = FileConfig::from_toml("[capture]\nwidth = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidDimensions)));

        let result = FileConfig::from_toml("[capture\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
