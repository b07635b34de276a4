//! Monotonic clocks and the scoped timing region
//!
//! Every measurement in the suite goes through a [`TimingRegion`]: the start
//! reading is taken when the region is opened and the stop reading when it is
//! dropped, so the elapsed time is recorded on every exit path, early returns
//! and `?` included.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of monotonic timestamps
///
/// Readings are offsets from an arbitrary, fixed origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Deterministic clock that advances by a fixed step on every reading
///
/// Used to drive calibration in tests without depending on the host's speed.
#[derive(Debug)]
pub struct SteppingClock {
    current: Cell<Duration>,
    step: Cell<Duration>,
}

impl SteppingClock {
    pub fn new(step: Duration) -> Self {
        Self {
            current: Cell::new(Duration::ZERO),
            step: Cell::new(step),
        }
    }

    /// Change the step applied to subsequent readings
    pub fn set_step(&self, step: Duration) {
        self.step.set(step);
    }

    /// Move the clock back by `by`; the next region will observe a regression
    pub fn rewind(&self, by: Duration) {
        self.current.set(self.current.get().saturating_sub(by));
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Duration {
        let now = self.current.get();
        self.current.set(now + self.step.get());
        now
    }
}

/// Scoped timing window
///
/// On drop, writes `Some(elapsed)` into its sink, or `None` if the clock ran
/// backwards while the region was open.
pub struct TimingRegion<'a, C: Clock + ?Sized> {
    clock: &'a C,
    start: Duration,
    sink: &'a mut Option<Duration>,
}

impl<'a, C: Clock + ?Sized> TimingRegion<'a, C> {
    pub fn open(clock: &'a C, sink: &'a mut Option<Duration>) -> Self {
        *sink = None;
        let start = clock.now();
        Self { clock, start, sink }
    }
}

impl<C: Clock + ?Sized> Drop for TimingRegion<'_, C> {
    fn drop(&mut self) {
        let end = self.clock.now();
        *self.sink = end.checked_sub(self.start);
    }
}

/// Run `f` inside a timing region and return its output with the elapsed time
pub fn timed<C, F, T>(clock: &C, f: F) -> (T, Option<Duration>)
where
    C: Clock + ?Sized,
    F: FnOnce() -> T,
{
    let mut elapsed = None;
    let out = {
        let _region = TimingRegion::open(clock, &mut elapsed);
        f()
    };
    (out, elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stepping_clock_advances() {
        let clock = SteppingClock::new(Duration::from_micros(10));
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::from_micros(10));
        assert_eq!(clock.now(), Duration::from_micros(20));
    }

    #[test]
    fn test_timed_measures_one_step() {
        let clock = SteppingClock::new(Duration::from_millis(3));
        let (value, elapsed) = timed(&clock, || 7);
        assert_eq!(value, 7);
        assert_eq!(elapsed, Some(Duration::from_millis(3)));
    }

    #[test]
    fn test_region_records_on_early_return() {
        fn fallible(clock: &SteppingClock, sink: &mut Option<Duration>) -> Result<(), ()> {
            let _region = TimingRegion::open(clock, sink);
            Err::<(), ()>(())?;
            Ok(())
        }

        let clock = SteppingClock::new(Duration::from_millis(2));
        let mut elapsed = None;
        assert!(fallible(&clock, &mut elapsed).is_err());
        assert_eq!(elapsed, Some(Duration::from_millis(2)));
    }

    #[test]
    fn test_regression_yields_none() {
        let clock = SteppingClock::new(Duration::from_millis(1));
        clock.now();
        clock.now();
        let (_, elapsed) = timed(&clock, || clock.rewind(Duration::from_secs(1)));
        assert_eq!(elapsed, None);
    }

    #[test]
    fn test_monotonic_clock_never_decreases() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
