//! Hold progress timer.
//!
//! [`ProgressTimer`] converts a stream of fixed-interval ticks into a
//! normalized progress value. It does not schedule anything itself: the owner
//! arranges for [`Wake::ProgressTick`](super::Wake::ProgressTick) to be
//! delivered every `interval` and calls [`ProgressTimer::tick`] for each one.

use std::time::Duration;

/// Progress reported for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressTick {
    /// Fill fraction in `0.0..=1.0`. Exactly `1.0` on the completing tick.
    pub progress: f64,
    /// Set on the single tick that finished the hold.
    pub completed: bool,
}

/// Step counter from zero to one over a fixed number of ticks.
///
/// States: stopped and running. The completing tick stops the timer, so
/// completion is reported exactly once per [`start`](Self::start).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressTimer {
    total_steps: u32,
    step: u32,
    running: bool,
}

/// Number of ticks of length `interval` needed to cover `total`.
///
/// Never less than one, so a hold always takes at least one tick.
///
/// # Examples
///
/// ```
/// use holdsend::timing::progress::total_steps;
/// use std::time::Duration;
///
/// assert_eq!(total_steps(Duration::from_secs(2), Duration::from_millis(10)), 200);
/// assert_eq!(total_steps(Duration::from_millis(25), Duration::from_millis(10)), 3);
/// assert_eq!(total_steps(Duration::ZERO, Duration::from_millis(10)), 1);
/// ```
#[must_use]
pub fn total_steps(total: Duration, interval: Duration) -> u32 {
    let interval_nanos = interval.as_nanos().max(1);
    let steps = total.as_nanos().div_ceil(interval_nanos).max(1);
    u32::try_from(steps).unwrap_or(u32::MAX)
}

impl ProgressTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts from zero) a hold lasting `total`, ticking every `interval`.
    pub fn start(&mut self, total: Duration, interval: Duration) {
        self.total_steps = total_steps(total, interval);
        self.step = 0;
        self.running = true;
        tracing::debug!(total_steps = self.total_steps, ?interval, "progress timer started");
    }

    /// Advances one step.
    ///
    /// Returns `None` when the timer is stopped, which is how ticks that were
    /// already in flight when the hold was released get ignored.
    pub fn tick(&mut self) -> Option<ProgressTick> {
        if !self.running {
            return None;
        }

        self.step += 1;

        if self.step >= self.total_steps {
            self.running = false;
            self.step = self.total_steps;
            tracing::debug!(steps = self.step, "progress timer completed");
            return Some(ProgressTick {
                progress: 1.0,
                completed: true,
            });
        }

        Some(ProgressTick {
            progress: self.fraction(),
            completed: false,
        })
    }

    /// Cancels the timer without reporting completion.
    ///
    /// Returns `true` if it was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        self.step = 0;
        was_running
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    fn fraction(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        (f64::from(self.step) / f64::from(self.total_steps)).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_end(timer: &mut ProgressTimer) -> Vec<ProgressTick> {
        std::iter::from_fn(|| timer.tick()).collect()
    }

    #[test]
    fn completes_exactly_once_with_exact_one() {
        let mut timer = ProgressTimer::new();
        timer.start(Duration::from_secs(2), Duration::from_millis(10));

        let ticks = run_to_end(&mut timer);
        assert_eq!(ticks.len(), 200);
        assert_eq!(ticks.iter().filter(|t| t.completed).count(), 1);

        let last = ticks.last().copied().unwrap();
        assert!(last.completed);
        assert_eq!(last.progress, 1.0);
        assert!(ticks[..199].iter().all(|t| t.progress < 1.0));
        assert!(!timer.is_running());
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn progress_is_monotonic() {
        let mut timer = ProgressTimer::new();
        timer.start(Duration::from_millis(70), Duration::from_millis(30));

        let ticks = run_to_end(&mut timer);
        assert_eq!(ticks.len(), 3);
        assert!(ticks.windows(2).all(|w| w[0].progress <= w[1].progress));
        assert_eq!(ticks[2].progress, 1.0);
    }

    #[test]
    fn stop_suppresses_completion() {
        let mut timer = ProgressTimer::new();
        timer.start(Duration::from_millis(50), Duration::from_millis(10));
        timer.tick();
        assert!(timer.stop());
        assert_eq!(timer.tick(), None);
        assert!(!timer.stop());
    }

    #[test]
    fn restart_begins_from_zero() {
        let mut timer = ProgressTimer::new();
        timer.start(Duration::from_millis(40), Duration::from_millis(10));
        timer.tick();
        timer.tick();

        timer.start(Duration::from_millis(40), Duration::from_millis(10));
        let first = timer.tick().unwrap();
        assert_eq!(first.progress, 0.25);
        assert!(!first.completed);
    }
}
