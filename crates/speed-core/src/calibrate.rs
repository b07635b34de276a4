//! Calibrated measurement loop
//!
//! A single policy is chosen per run and applied to every case, so rates
//! from different cases and backends stay comparable.
//!
//! | Policy | Warm-up | Measured region |
//! |--------|---------|-----------------|
//! | `Window` | 1 call | batches of a calibrated size until `window` is filled |
//! | `Fixed` | 1 call | one batch of exactly `iterations` calls |
//!
//! Only the batch loop sits inside the timing region. Failure counting is a
//! plain counter increment; anything that prints happens after the region
//! closes.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{timed, Clock};
use crate::error::{BenchError, Result};

/// Largest batch the window policy will grow to
pub const MAX_BATCH: u64 = 1 << 20;

/// Measurement policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum Calibration {
    /// Loop until `window` of measured time has accumulated
    Window {
        window: Duration,
        /// Minimum length of one timed batch; amortizes clock overhead
        min_batch: Duration,
    },
    /// Time exactly `iterations` calls
    Fixed { iterations: u64 },
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration::Window {
            window: Duration::from_millis(500),
            min_batch: Duration::from_millis(1),
        }
    }
}

/// Outcome of one calibrated run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Calls made inside measured batches
    pub iterations: u64,
    /// Total measured time across those batches
    pub elapsed: Duration,
    /// Calls that reported failure
    pub failures: u64,
}

impl Sample {
    /// Every measured call failed
    pub fn all_failed(&self) -> bool {
        self.iterations > 0 && self.failures == self.iterations
    }

    /// This sample with a separately measured per-call cost taken out
    ///
    /// Returns `None` when the overhead accounts for all of the measured time.
    pub fn net_of(&self, overhead: &Sample) -> Option<Sample> {
        if overhead.iterations == 0 {
            return Some(*self);
        }
        let per_call = overhead.elapsed.as_secs_f64() / overhead.iterations as f64;
        let cost = Duration::try_from_secs_f64(per_call * self.iterations as f64).ok()?;
        let elapsed = self.elapsed.checked_sub(cost).filter(|d| !d.is_zero())?;
        Some(Sample { elapsed, ..*self })
    }
}

struct Batch {
    elapsed: Duration,
    failures: u64,
}

fn run_batch<C, F>(clock: &C, case: &str, size: u64, op: &mut F) -> Result<Batch>
where
    C: Clock + ?Sized,
    F: FnMut() -> bool,
{
    let (failures, elapsed) = timed(clock, || {
        let mut failures = 0u64;
        for _ in 0..size {
            if !op() {
                failures += 1;
            }
        }
        failures
    });
    let elapsed = elapsed.ok_or_else(|| BenchError::ClockRegression {
        case: case.to_string(),
    })?;
    Ok(Batch { elapsed, failures })
}

/// Measure `op` under `calibration`
///
/// `op` returns `false` when the primitive reports a failure; the loop keeps
/// going and the count ends up in [`Sample::failures`].
pub fn run_calibrated<C, F>(clock: &C, calibration: &Calibration, case: &str, mut op: F) -> Result<Sample>
where
    C: Clock + ?Sized,
    F: FnMut() -> bool,
{
    // Warm-up: page in buffers and code, not counted
    op();

    match *calibration {
        Calibration::Fixed { iterations } => {
            let batch = run_batch(clock, case, iterations, &mut op)?;
            if batch.elapsed.is_zero() {
                return Err(BenchError::ZeroDuration {
                    case: case.to_string(),
                    iterations,
                });
            }
            Ok(Sample {
                iterations,
                elapsed: batch.elapsed,
                failures: batch.failures,
            })
        }
        Calibration::Window { window, min_batch } => {
            let size = calibrate_batch(clock, case, min_batch, &mut op)?;
            debug!(case, batch = size, "calibrated batch size");

            let mut sample = Sample {
                iterations: 0,
                elapsed: Duration::ZERO,
                failures: 0,
            };
            while sample.elapsed < window {
                let batch = run_batch(clock, case, size, &mut op)?;
                if batch.elapsed.is_zero() {
                    return Err(BenchError::ZeroDuration {
                        case: case.to_string(),
                        iterations: size,
                    });
                }
                sample.iterations += size;
                sample.elapsed += batch.elapsed;
                sample.failures += batch.failures;
            }
            Ok(sample)
        }
    }
}

/// Double the batch size until one batch lasts at least `min_batch`
fn calibrate_batch<C, F>(clock: &C, case: &str, min_batch: Duration, op: &mut F) -> Result<u64>
where
    C: Clock + ?Sized,
    F: FnMut() -> bool,
{
    let mut size = 1u64;
    loop {
        let batch = run_batch(clock, case, size, op)?;
        if batch.elapsed >= min_batch && !batch.elapsed.is_zero() {
            return Ok(size);
        }
        if size >= MAX_BATCH {
            if batch.elapsed.is_zero() {
                return Err(BenchError::ZeroDuration {
                    case: case.to_string(),
                    iterations: size,
                });
            }
            return Ok(size);
        }
        size *= 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;

    fn window(window_ms: u64, min_batch_ms: u64) -> Calibration {
        Calibration::Window {
            window: Duration::from_millis(window_ms),
            min_batch: Duration::from_millis(min_batch_ms),
        }
    }

    #[test]
    fn test_fixed_policy_counts_exactly() {
        let clock = SteppingClock::new(Duration::from_millis(5));
        let mut calls = 0u64;
        let sample = run_calibrated(&clock, &Calibration::Fixed { iterations: 40 }, "fixed", || {
            calls += 1;
            true
        })
        .unwrap();

        assert_eq!(sample.iterations, 40);
        assert_eq!(sample.elapsed, Duration::from_millis(5));
        assert_eq!(sample.failures, 0);
        // warm-up call is not part of the sample
        assert_eq!(calls, 41);
    }

    #[test]
    fn test_window_fills_requested_time() {
        // each batch reads the clock twice, so every batch measures one step
        let clock = SteppingClock::new(Duration::from_millis(1));
        let sample = run_calibrated(&clock, &window(100, 1), "window", || true).unwrap();

        assert_eq!(sample.iterations, 100);
        assert_eq!(sample.elapsed, Duration::from_millis(100));
    }

    #[test]
    fn test_batch_grows_until_min_batch() {
        // a batch always measures exactly one clock step
        let clock = SteppingClock::new(Duration::from_millis(1));
        let mut op = || true;
        let size = calibrate_batch(&clock, "grow", Duration::from_millis(1), &mut op).unwrap();
        assert_eq!(size, 1);

        clock.set_step(Duration::from_micros(250));
        let size = calibrate_batch(&clock, "grow", Duration::from_millis(1), &mut op).unwrap();
        assert_eq!(size, MAX_BATCH);
    }

    #[test]
    fn test_stopped_clock_is_zero_duration() {
        let clock = SteppingClock::new(Duration::ZERO);
        let err = run_calibrated(&clock, &window(10, 1), "stuck", || true).unwrap_err();
        assert!(matches!(err, BenchError::ZeroDuration { iterations: MAX_BATCH, .. }));

        let err = run_calibrated(&clock, &Calibration::Fixed { iterations: 3 }, "stuck", || true).unwrap_err();
        assert!(matches!(err, BenchError::ZeroDuration { iterations: 3, .. }));
    }

    #[test]
    fn test_clock_regression_is_fatal() {
        let clock = SteppingClock::new(Duration::from_millis(1));
        clock.now();
        clock.now();
        let mut warmed_up = false;
        let err = run_calibrated(&clock, &Calibration::Fixed { iterations: 2 }, "rewind", || {
            if warmed_up {
                clock.rewind(Duration::from_secs(60));
            }
            warmed_up = true;
            true
        })
        .unwrap_err();
        assert!(matches!(err, BenchError::ClockRegression { .. }));
    }

    #[test]
    fn test_failures_do_not_stop_the_loop() {
        let clock = SteppingClock::new(Duration::from_millis(1));
        let mut n = 0u64;
        let sample = run_calibrated(&clock, &Calibration::Fixed { iterations: 10 }, "flaky", || {
            n += 1;
            n % 5 != 0
        })
        .unwrap();

        assert_eq!(sample.iterations, 10);
        // calls 2..=11 are measured; 5 and 10 fail
        assert_eq!(sample.failures, 2);
        assert!(!sample.all_failed());
    }

    #[test]
    fn test_net_of_removes_overhead() {
        let total = Sample {
            iterations: 100,
            elapsed: Duration::from_millis(50),
            failures: 1,
        };
        let overhead = Sample {
            iterations: 400,
            elapsed: Duration::from_millis(80),
            failures: 0,
        };
        // 0.2 ms per call over 100 calls
        let net = total.net_of(&overhead).unwrap();
        assert_eq!(net.iterations, 100);
        assert_eq!(net.failures, 1);
        assert!((net.elapsed.as_secs_f64() - 0.030).abs() < 1e-9);

        let swamped = Sample {
            iterations: 10,
            elapsed: Duration::from_millis(10),
            failures: 0,
        };
        assert_eq!(total.net_of(&swamped), None);
    }

    #[test]
    fn test_all_failed() {
        let clock = SteppingClock::new(Duration::from_millis(1));
        let sample = run_calibrated(&clock, &Calibration::Fixed { iterations: 4 }, "broken", || false).unwrap();
        assert!(sample.all_failed());
    }
}
