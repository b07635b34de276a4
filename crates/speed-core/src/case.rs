//! Benchmark cases and the per-case runner

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::calibrate::{run_calibrated, Calibration, Sample};
use crate::clock::Clock;
use crate::error::{BenchError, Result};
use crate::input;
use crate::rate::{Rate, Unit};

/// Case body: sets up buffers through the context, then measures
pub type CaseFn = fn(&mut CaseContext<'_>) -> Result<Sample>;

/// One primitive under test
#[derive(Clone, Copy)]
pub struct BenchCase {
    /// Report label
    pub name: &'static str,
    pub unit: Unit,
    /// Bytes consumed per call; used by throughput units only
    pub bytes_per_iteration: u64,
    pub run: CaseFn,
}

impl std::fmt::Debug for BenchCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchCase")
            .field("name", &self.name)
            .field("unit", &self.unit)
            .field("bytes_per_iteration", &self.bytes_per_iteration)
            .finish_non_exhaustive()
    }
}

impl BenchCase {
    pub const fn throughput(name: &'static str, bytes_per_iteration: usize, run: CaseFn) -> Self {
        Self {
            name,
            unit: Unit::Megabytes,
            bytes_per_iteration: bytes_per_iteration as u64,
            run,
        }
    }

    pub const fn rate(name: &'static str, unit: Unit, run: CaseFn) -> Self {
        Self {
            name,
            unit,
            bytes_per_iteration: 0,
            run,
        }
    }

    /// Allocate, fill, measure and normalize this case
    ///
    /// Buffers live only for the duration of this call.
    pub fn execute(&self, rng: &mut dyn RngCore, clock: &dyn Clock, calibration: &Calibration) -> Result<CaseResult> {
        let mut ctx = CaseContext {
            name: self.name,
            rng,
            clock,
            calibration: *calibration,
        };
        let sample = (self.run)(&mut ctx)?;
        let rate = Rate::from_sample(self.name, &sample, self.unit, self.bytes_per_iteration)?;
        Ok(CaseResult {
            name: self.name.to_string(),
            sample,
            rate,
        })
    }
}

/// Everything a case body may touch
pub struct CaseContext<'a> {
    name: &'static str,
    rng: &'a mut dyn RngCore,
    clock: &'a dyn Clock,
    calibration: Calibration,
}

impl<'a> CaseContext<'a> {
    pub fn new(name: &'static str, rng: &'a mut dyn RngCore, clock: &'a dyn Clock, calibration: Calibration) -> Self {
        Self {
            name,
            rng,
            clock,
            calibration,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Random input buffer of `size` bytes
    pub fn random_input(&mut self, role: &'static str, size: usize) -> Result<Vec<u8>> {
        input::random_input(&mut *self.rng, role, size)
    }

    /// Random fixed-size input (keys, nonces, salts)
    pub fn random_array<const N: usize>(&mut self, role: &'static str) -> Result<[u8; N]> {
        input::random_array(&mut *self.rng, role)
    }

    /// Zeroed output buffer; primitives overwrite it before anything reads it
    pub fn output(&self, role: &'static str, size: usize) -> Result<Vec<u8>> {
        input::alloc_buffer(role, size)
    }

    /// Measure an operation that cannot fail
    pub fn measure<F: FnMut()>(&self, mut op: F) -> Result<Sample> {
        run_calibrated(self.clock, &self.calibration, self.name, || {
            op();
            true
        })
    }

    /// Measure an operation returning `true` on success
    pub fn measure_checked<F: FnMut() -> bool>(&self, op: F) -> Result<Sample> {
        run_calibrated(self.clock, &self.calibration, self.name, op)
    }

    /// Setup failure for this case
    pub fn setup_error(&self, reason: impl std::fmt::Display) -> BenchError {
        BenchError::primitive(self.name, reason)
    }
}

/// Measured outcome of one case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub name: String,
    pub sample: Sample,
    pub rate: Rate,
}
