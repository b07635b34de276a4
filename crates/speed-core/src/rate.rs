//! Rates and display units

use serde::{Deserialize, Serialize};

use crate::calibrate::Sample;
use crate::error::{nonzero_secs, Result};

/// Payload size of every bulk throughput case (256 KiB)
pub const SIZE: usize = 256 * 1024;

/// Scale from bytes/second to megabytes/second
pub const MUL: f64 = 1.0 / (1024.0 * 1024.0);

/// How a case's rate is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Bytes processed per second, displayed scaled by [`MUL`]
    Throughput,
    /// Discrete operations per second
    Rate,
}

/// Display unit attached to a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Megabytes,
    Exchanges,
    Signatures,
    Checks,
    /// Scalar multiplications (and inversions) on Curve25519
    ScalarInv,
}

impl Unit {
    pub const ALL: [Unit; 5] = [
        Unit::Megabytes,
        Unit::Exchanges,
        Unit::Signatures,
        Unit::Checks,
        Unit::ScalarInv,
    ];

    pub fn kind(self) -> UnitKind {
        match self {
            Unit::Megabytes => UnitKind::Throughput,
            Unit::Exchanges | Unit::Signatures | Unit::Checks | Unit::ScalarInv => UnitKind::Rate,
        }
    }

    /// Unit noun as printed in the report
    pub fn noun(self) -> &'static str {
        match self {
            Unit::Megabytes => "megabytes",
            Unit::Exchanges => "exchanges",
            Unit::Signatures => "signatures",
            Unit::Checks => "checks",
            Unit::ScalarInv => "scalar inv",
        }
    }

    /// Fixed-width label, e.g. `"checks     per second"`
    pub fn label(self) -> String {
        format!("{:<10} per second", self.noun())
    }
}

/// Normalized speed of one case
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub unit: Unit,
    /// Bytes per second for throughput units, operations per second otherwise
    pub per_second: f64,
}

impl Rate {
    /// Derive a rate from a calibrated sample
    ///
    /// `bytes_per_iteration` only matters for throughput units.
    pub fn from_sample(case: &str, sample: &Sample, unit: Unit, bytes_per_iteration: u64) -> Result<Self> {
        let secs = nonzero_secs(case, sample.elapsed, sample.iterations)?;
        let amount = match unit.kind() {
            UnitKind::Throughput => sample.iterations as f64 * bytes_per_iteration as f64,
            UnitKind::Rate => sample.iterations as f64,
        };
        Ok(Self {
            unit,
            per_second: amount / secs,
        })
    }

    /// Value in the report's unit: megabytes/s for throughput, ops/s otherwise
    pub fn display_value(&self) -> f64 {
        match self.unit.kind() {
            UnitKind::Throughput => self.per_second * MUL,
            UnitKind::Rate => self.per_second,
        }
    }

    /// Rounded display value as printed in the report
    pub fn rounded(&self) -> u64 {
        self.display_value().round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use std::time::Duration;

    fn sample(iterations: u64, elapsed: Duration) -> Sample {
        Sample {
            iterations,
            elapsed,
            failures: 0,
        }
    }

    #[test]
    fn test_labels_are_aligned() {
        let widths: Vec<usize> = Unit::ALL
            .iter()
            .map(|u| u.label().len())
            .collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(Unit::Checks.label(), "checks     per second");
        assert_eq!(Unit::ScalarInv.label(), "scalar inv per second");
    }

    #[test]
    fn test_throughput_rate() {
        let rate = Rate::from_sample("x", &sample(10, Duration::from_secs(2)), Unit::Megabytes, SIZE as u64).unwrap();
        assert_eq!(rate.per_second, 10.0 * SIZE as f64 / 2.0);
        // 10 * 256 KiB over 2 s is 1.25 MiB/s
        assert!((rate.display_value() - 1.25).abs() < 1e-12);
        assert_eq!(rate.rounded(), 1);
    }

    #[test]
    fn test_operation_rate_ignores_bytes() {
        let rate = Rate::from_sample("x", &sample(500, Duration::from_millis(250)), Unit::Signatures, 64).unwrap();
        assert_eq!(rate.per_second, 2000.0);
        assert_eq!(rate.display_value(), 2000.0);
    }

    #[test]
    fn test_zero_elapsed_is_an_error() {
        let err = Rate::from_sample("idle", &sample(5, Duration::ZERO), Unit::Checks, 0).unwrap_err();
        assert!(matches!(err, BenchError::ZeroDuration { iterations: 5, .. }));
    }
}
