//! Run configuration
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! file (or no file) is a valid configuration. Command-line flags are applied
//! on top by the binary.
//!
//! ```toml
//! backends = ["rustcrypto", "ring"]
//! seed = 42
//! max_verification_failures = 0
//!
//! [calibration]
//! policy = "window"
//! window_ms = 500
//! min_batch_us = 1000
//!
//! [output]
//! json = "speed.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::calibrate::Calibration;
use crate::error::{BenchError, Result};

/// Complete run configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeedConfig {
    /// Backends to run, in order
    #[serde(default = "default_backends")]
    pub backends: Vec<String>,

    /// Seed for the input generator; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Verification failures tolerated per case before the run fails
    #[serde(default)]
    pub max_verification_failures: u64,

    #[serde(default)]
    pub calibration: CalibrationConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            backends: default_backends(),
            seed: None,
            max_verification_failures: 0,
            calibration: CalibrationConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_backends() -> Vec<String> {
    vec!["rustcrypto".to_string(), "ring".to_string()]
}

/// Measurement policy selector
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Window,
    Fixed,
}

impl std::str::FromStr for PolicyKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "window" => Ok(Self::Window),
            "fixed" => Ok(Self::Fixed),
            other => Err(BenchError::InvalidConfig(format!(
                "unknown calibration policy '{other}' (expected 'window' or 'fixed')"
            ))),
        }
    }
}

/// Calibration settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default)]
    pub policy: PolicyKind,

    /// Measured time per case (window policy)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Minimum timed batch length (window policy)
    #[serde(default = "default_min_batch_us")]
    pub min_batch_us: u64,

    /// Calls per case (fixed policy)
    #[serde(default = "default_iterations")]
    pub iterations: u64,
}

fn default_window_ms() -> u64 {
    500
}

fn default_min_batch_us() -> u64 {
    1_000
}

fn default_iterations() -> u64 {
    1_000
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            window_ms: default_window_ms(),
            min_batch_us: default_min_batch_us(),
            iterations: default_iterations(),
        }
    }
}

/// Output settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Also write a JSON report here
    #[serde(default)]
    pub json: Option<PathBuf>,
}

/// Logging settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SpeedConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.backends.is_empty() {
            return Err(BenchError::InvalidConfig("no backends selected".to_string()));
        }
        let cal = &self.calibration;
        match cal.policy {
            PolicyKind::Window => {
                if cal.window_ms == 0 {
                    return Err(BenchError::InvalidConfig("window_ms must be > 0".to_string()));
                }
                if cal.min_batch_us == 0 {
                    return Err(BenchError::InvalidConfig("min_batch_us must be > 0".to_string()));
                }
                let window_us = cal
                    .window_ms
                    .checked_mul(1_000)
                    .ok_or_else(|| BenchError::InvalidConfig(format!("window_ms {} is too large", cal.window_ms)))?;
                if cal.min_batch_us > window_us {
                    return Err(BenchError::InvalidConfig(
                        "min_batch_us must not exceed the window".to_string(),
                    ));
                }
            }
            PolicyKind::Fixed => {
                if cal.iterations == 0 {
                    return Err(BenchError::InvalidConfig("iterations must be > 0".to_string()));
                }
            }
        }
        Ok(())
    }

    /// Policy applied to every case of the run
    pub fn calibration(&self) -> Calibration {
        let cal = &self.calibration;
        match cal.policy {
            PolicyKind::Window => Calibration::Window {
                window: Duration::from_millis(cal.window_ms),
                min_batch: Duration::from_micros(cal.min_batch_us),
            },
            PolicyKind::Fixed => Calibration::Fixed {
                iterations: cal.iterations,
            },
        }
    }
}
