//! Benchmark error types

use std::time::Duration;

use thiserror::Error;

/// Result type for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors raised while running the suite
#[derive(Error, Debug)]
pub enum BenchError {
    /// The clock returned a reading earlier than the start of a timing region
    #[error("clock went backwards while timing {case}")]
    ClockRegression { case: String },

    /// A timed batch measured no elapsed time even at the largest batch size
    #[error("{case}: measured zero elapsed time over {iterations} iterations")]
    ZeroDuration { case: String, iterations: u64 },

    /// A case buffer could not be allocated
    #[error("failed to allocate {size} bytes for {role} buffer")]
    Allocation { role: &'static str, size: usize },

    /// The random source produced an all-zero input
    #[error("random source produced an all-zero {role} buffer ({size} bytes)")]
    DegenerateInput { role: &'static str, size: usize },

    /// A primitive rejected its setup (key import, parameters, ...)
    #[error("{case}: primitive setup failed: {reason}")]
    Primitive { case: String, reason: String },

    /// Verification kept failing inside the timed loop
    #[error("{case}: {failures} of {iterations} verifications failed")]
    VerificationFailures {
        case: String,
        failures: u64,
        iterations: u64,
    },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Backend name not recognised
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl BenchError {
    /// Setup failure reported by a primitive library
    pub fn primitive(case: &str, reason: impl std::fmt::Display) -> Self {
        Self::Primitive {
            case: case.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error ends the whole run rather than a single case
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::VerificationFailures { .. })
    }
}

/// Convert a measured window to seconds, rejecting empty measurements
pub(crate) fn nonzero_secs(case: &str, elapsed: Duration, iterations: u64) -> Result<f64> {
    if elapsed.is_zero() {
        return Err(BenchError::ZeroDuration {
            case: case.to_string(),
            iterations,
        });
    }
    Ok(elapsed.as_secs_f64())
}
