//! Suite driver: runs a case table in order and feeds the reporter

use std::io::Write;

use rand::RngCore;
use tracing::{info, warn};

use crate::calibrate::Calibration;
use crate::case::{BenchCase, CaseResult};
use crate::clock::Clock;
use crate::error::{BenchError, Result};
use crate::report::{BackendReport, Reporter};

/// Shared inputs of one run
pub struct SuiteRunner<'a> {
    pub rng: &'a mut dyn RngCore,
    pub clock: &'a dyn Clock,
    pub calibration: Calibration,
}

impl<'a> SuiteRunner<'a> {
    pub fn new(rng: &'a mut dyn RngCore, clock: &'a dyn Clock, calibration: Calibration) -> Self {
        Self {
            rng,
            clock,
            calibration,
        }
    }

    /// Run `cases` in order, emitting one line per case as it completes
    ///
    /// Resource and measurement failures stop the run immediately.
    /// Verification failures only produce a diagnostic line here; see
    /// [`check_verification`] for turning them into an error afterwards.
    pub fn run<W: Write>(
        &mut self,
        backend: &str,
        title: &str,
        cases: &[BenchCase],
        reporter: &mut Reporter<W>,
    ) -> Result<BackendReport> {
        info!(backend, cases = cases.len(), "running suite");
        reporter.header(title)?;

        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            let result = case.execute(&mut *self.rng, self.clock, &self.calibration)?;
            info!(
                backend,
                case = case.name,
                iterations = result.sample.iterations,
                elapsed_ms = result.sample.elapsed.as_secs_f64() * 1e3,
                rate = result.rate.display_value(),
                "case complete"
            );
            reporter.emit(&result)?;
            if result.sample.failures > 0 {
                warn!(
                    backend,
                    case = case.name,
                    failures = result.sample.failures,
                    iterations = result.sample.iterations,
                    "verification failed inside the timed loop"
                );
                reporter.diagnostic(&result)?;
            }
            results.push(result);
        }
        reporter.finish()?;

        Ok(BackendReport {
            backend: backend.to_string(),
            title: title.to_string(),
            results,
        })
    }
}

/// Fail if any case exceeded `max_failures` verification failures
pub fn check_verification(results: &[CaseResult], max_failures: u64) -> Result<()> {
    match results.iter().find(|r| r.sample.failures > max_failures) {
        Some(r) => Err(BenchError::VerificationFailures {
            case: r.name.clone(),
            failures: r.sample.failures,
            iterations: r.sample.iterations,
        }),
        None => Ok(()),
    }
}
