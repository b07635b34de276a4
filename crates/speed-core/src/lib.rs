//! # Primitive speed suite: measurement core
//!
//! Calibrated timing harness used to compare cryptographic libraries on the
//! same primitives under identical conditions.
//!
//! | Piece | Module |
//! |-------|--------|
//! | Monotonic clock and scoped timing region | [`clock`] |
//! | Warm-up, batch calibration and the measured loop | [`calibrate`] |
//! | Random input buffers | [`input`] |
//! | Rates, units, `SIZE` and `MUL` | [`rate`] |
//! | Case descriptors and per-case runner | [`case`] |
//! | Suite driver | [`suite`] |
//! | Console lines and JSON report | [`report`] |
//! | TOML configuration | [`config`] |
//!
//! Setup (allocation, random fill, key derivation) always happens before the
//! timing region opens; the region contains only the primitive calls.

pub mod calibrate;
pub mod case;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod rate;
pub mod report;
pub mod suite;

pub use calibrate::{run_calibrated, Calibration, Sample};
pub use case::{BenchCase, CaseContext, CaseFn, CaseResult};
pub use clock::{Clock, MonotonicClock, SteppingClock, TimingRegion};
pub use config::SpeedConfig;
pub use error::{BenchError, Result};
pub use rate::{Rate, Unit, UnitKind, MUL, SIZE};
pub use report::{BackendReport, Reporter, SpeedReport};
pub use suite::{check_verification, SuiteRunner};

/// Benchmark prelude
pub mod prelude {
    pub use crate::calibrate::{Calibration, Sample};
    pub use crate::case::{BenchCase, CaseContext};
    pub use crate::error::{BenchError, Result};
    pub use crate::rate::{Unit, SIZE};
}
