//! Scheduler abstraction and the deterministic virtual clock.
//!
//! Timers never call back into the controller. Instead every scheduled entry
//! carries a [`Wake`] value that the owning event loop pops from the scheduler
//! and turns into an event. This keeps all mutation on the single owning
//! context and makes timing fully reproducible in tests.
//!
//! # Example
//!
//! ```rust
//! use holdsend::timing::{Scheduler, VirtualScheduler, Wake};
//! use std::time::Duration;
//!
//! let clock = VirtualScheduler::new();
//! clock.schedule_repeating(Duration::from_secs(1), Wake::CooldownTick);
//!
//! let deadline = Duration::from_millis(2500);
//! let mut fired = 0;
//! while let Some(wake) = clock.pop_due(deadline) {
//!     assert_eq!(wake, Wake::CooldownTick);
//!     fired += 1;
//! }
//! assert_eq!(fired, 2);
//! assert_eq!(clock.now(), deadline);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// Smallest repeat interval accepted; guards against zero-length loops.
const MIN_INTERVAL: Duration = Duration::from_micros(1);

/// Opaque identifier of a scheduled entry, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// What a scheduled entry asks the owning loop to do when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wake {
    /// Advance hold progress by one step.
    ProgressTick,
    /// Decrement the cooldown countdown by one second.
    CooldownTick,
    /// A suspended operation (such as a send) may be ready; poll it.
    Resume,
}

/// Time source that can schedule one-shot and repeating wake-ups.
///
/// Clones share one clock and one queue. Due times that would overflow
/// `Duration` saturate, so such entries are never reached.
pub trait Scheduler: Clone + fmt::Debug + Send + Sync + 'static {
    /// Current time measured from the scheduler's epoch.
    fn now(&self) -> Duration;

    /// Schedules `wake` to fire once, `delay` from now.
    fn schedule_after(&self, delay: Duration, wake: Wake) -> TimerHandle;

    /// Schedules `wake` to fire every `interval`, first one `interval` from now.
    fn schedule_repeating(&self, interval: Duration, wake: Wake) -> TimerHandle;

    /// Cancels a pending entry. Returns `false` if it already fired or was cancelled.
    fn cancel(&self, handle: TimerHandle) -> bool;

    /// Returns the earliest entry due at or before `deadline`, once its due
    /// time has been reached, or `None` once the clock has reached `deadline`
    /// with nothing left to fire.
    ///
    /// Repeating entries are re-armed one interval after their due time.
    fn pop_due(&self, deadline: Duration) -> Option<Wake>;

    /// Due time of the earliest pending entry.
    fn next_due(&self) -> Option<Duration>;

    /// Number of pending entries.
    fn pending(&self) -> usize;

    /// Returns a future that completes once the clock reaches `now + delay`.
    ///
    /// The deadline is registered immediately as a [`Wake::Resume`] entry, so the
    /// owning loop stops at that instant and can poll whatever awaits the sleep.
    fn sleep(&self, delay: Duration) -> Sleep<Self> {
        let deadline = self.now().saturating_add(delay);
        let handle = self.schedule_after(delay, Wake::Resume);
        Sleep {
            clock: self.clone(),
            deadline,
            handle,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    handle: TimerHandle,
    wake: Wake,
    repeat: Option<Duration>,
}

/// Queue key: due time, then insertion order for entries due at the same instant.
type Slot = (Duration, u64);

/// Pending entries ordered by due time. Shared by both clocks.
#[derive(Debug, Default)]
struct TimerQueue {
    next_handle: u64,
    next_seq: u64,
    queue: BTreeMap<Slot, Entry>,
    slots: HashMap<TimerHandle, Slot>,
}

impl TimerQueue {
    fn insert(&mut self, due: Duration, entry: Entry) {
        let slot = (due, self.next_seq);
        self.next_seq += 1;
        self.queue.insert(slot, entry);
        self.slots.insert(entry.handle, slot);
    }

    fn schedule(&mut self, due: Duration, wake: Wake, repeat: Option<Duration>) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.insert(due, Entry { handle, wake, repeat });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.slots.remove(&handle) {
            Some(slot) => self.queue.remove(&slot).is_some(),
            None => false,
        }
    }

    fn next_due(&self) -> Option<Duration> {
        self.queue.first_key_value().map(|((due, _), _)| *due)
    }

    /// Removes the earliest entry due at or before `limit`, re-arming it if it repeats.
    fn pop_until(&mut self, limit: Duration) -> Option<(Duration, Wake)> {
        let slot = self
            .queue
            .first_key_value()
            .map(|(slot, _)| *slot)
            .filter(|(due, _)| *due <= limit)?;

        let entry = self.queue.remove(&slot)?;
        self.slots.remove(&entry.handle);
        if let Some(interval) = entry.repeat {
            self.insert(slot.0.saturating_add(interval), entry);
        }
        Some((slot.0, entry.wake))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock cannot leave the queue half-updated,
    // so a poisoned lock is still safe to use.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct VirtualState {
    now: Duration,
    timers: TimerQueue,
}

/// Manually advanced clock for deterministic tests and script replay.
///
/// Time only moves inside [`pop_due`](Scheduler::pop_due): the clock jumps
/// straight to the next due entry, or to the deadline, without waiting.
#[derive(Debug, Clone, Default)]
pub struct VirtualScheduler {
    state: Arc<Mutex<VirtualState>>,
}

impl VirtualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for VirtualScheduler {
    fn now(&self) -> Duration {
        lock(&self.state).now
    }

    fn schedule_after(&self, delay: Duration, wake: Wake) -> TimerHandle {
        let mut state = lock(&self.state);
        let due = state.now.saturating_add(delay);
        state.timers.schedule(due, wake, None)
    }

    fn schedule_repeating(&self, interval: Duration, wake: Wake) -> TimerHandle {
        let interval = interval.max(MIN_INTERVAL);
        let mut state = lock(&self.state);
        let due = state.now.saturating_add(interval);
        state.timers.schedule(due, wake, Some(interval))
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        lock(&self.state).timers.cancel(handle)
    }

    /// Never moves the clock backwards.
    fn pop_due(&self, deadline: Duration) -> Option<Wake> {
        let mut state = lock(&self.state);
        let Some((due, wake)) = state.timers.pop_until(deadline) else {
            state.now = state.now.max(deadline);
            return None;
        };
        state.now = state.now.max(due);
        tracing::trace!(now = ?state.now, ?wake, "timer fired");
        Some(wake)
    }

    fn next_due(&self) -> Option<Duration> {
        lock(&self.state).timers.next_due()
    }

    fn pending(&self) -> usize {
        lock(&self.state).timers.queue.len()
    }
}

/// Real-time clock measured from its creation.
///
/// [`pop_due`](Scheduler::pop_due) blocks the calling thread until the next
/// entry is due or the deadline passes. Repeating entries run at a fixed rate,
/// so a late wake-up is followed by the missed ones back to back.
#[derive(Debug, Clone)]
pub struct WallScheduler {
    origin: Instant,
    timers: Arc<Mutex<TimerQueue>>,
}

impl WallScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            timers: Arc::default(),
        }
    }
}

impl Default for WallScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for WallScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn schedule_after(&self, delay: Duration, wake: Wake) -> TimerHandle {
        let due = self.now().saturating_add(delay);
        lock(&self.timers).schedule(due, wake, None)
    }

    fn schedule_repeating(&self, interval: Duration, wake: Wake) -> TimerHandle {
        let interval = interval.max(MIN_INTERVAL);
        let due = self.now().saturating_add(interval);
        lock(&self.timers).schedule(due, wake, Some(interval))
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        lock(&self.timers).cancel(handle)
    }

    fn pop_due(&self, deadline: Duration) -> Option<Wake> {
        loop {
            let now = self.now();
            if let Some((due, wake)) = lock(&self.timers).pop_until(now.min(deadline)) {
                tracing::trace!(?now, ?due, ?wake, "timer fired");
                return Some(wake);
            }
            if now >= deadline {
                return None;
            }

            let target = self.next_due().filter(|due| *due <= deadline).unwrap_or(deadline);
            std::thread::sleep(target.saturating_sub(now));
        }
    }

    fn next_due(&self) -> Option<Duration> {
        lock(&self.timers).next_due()
    }

    fn pending(&self) -> usize {
        lock(&self.timers).queue.len()
    }
}

/// Future returned by [`Scheduler::sleep`].
///
/// Dropping it before completion cancels its wake-up.
#[derive(Debug)]
pub struct Sleep<S: Scheduler> {
    clock: S,
    deadline: Duration,
    handle: TimerHandle,
}

impl<S: Scheduler> Future for Sleep<S> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.clock.now() >= self.deadline {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

impl<S: Scheduler> Drop for Sleep<S> {
    fn drop(&mut self) {
        self.clock.cancel(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::task::noop_waker;

    fn drain(clock: &impl Scheduler, deadline: Duration) -> Vec<(Duration, Wake)> {
        let mut fired = Vec::new();
        while let Some(wake) = clock.pop_due(deadline) {
            fired.push((clock.now(), wake));
        }
        fired
    }

    #[test]
    fn repeating_entry_fires_on_every_interval() {
        let clock = VirtualScheduler::new();
        clock.schedule_repeating(Duration::from_millis(10), Wake::ProgressTick);

        let fired = drain(&clock, Duration::from_millis(35));
        let times: Vec<_> = fired.iter().map(|(t, _)| t.as_millis()).collect();
        assert_eq!(times, vec![10, 20, 30]);
        assert_eq!(clock.now(), Duration::from_millis(35));
    }

    #[test]
    fn cancelled_entry_never_fires() {
        let clock = VirtualScheduler::new();
        let handle = clock.schedule_repeating(Duration::from_secs(1), Wake::CooldownTick);
        assert!(clock.cancel(handle));
        assert!(!clock.cancel(handle));
        assert!(drain(&clock, Duration::from_secs(5)).is_empty());
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn entries_due_together_fire_in_insertion_order() {
        let clock = VirtualScheduler::new();
        clock.schedule_after(Duration::from_secs(1), Wake::Resume);
        clock.schedule_repeating(Duration::from_secs(1), Wake::CooldownTick);

        let fired = drain(&clock, Duration::from_secs(1));
        assert_eq!(
            fired.iter().map(|(_, w)| *w).collect::<Vec<_>>(),
            vec![Wake::Resume, Wake::CooldownTick]
        );
    }

    #[test]
    fn clock_never_moves_backwards() {
        let clock = VirtualScheduler::new();
        assert!(clock.pop_due(Duration::from_secs(3)).is_none());
        assert!(clock.pop_due(Duration::from_secs(1)).is_none());
        assert_eq!(clock.now(), Duration::from_secs(3));
    }

    #[test]
    fn sleep_completes_at_its_deadline() {
        let clock = VirtualScheduler::new();
        let mut sleep = clock.sleep(Duration::from_secs(2));
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        assert!(Pin::new(&mut sleep).poll(&mut cx).is_pending());
        assert_eq!(clock.pop_due(Duration::from_secs(5)), Some(Wake::Resume));
        assert_eq!(clock.now(), Duration::from_secs(2));
        assert!(Pin::new(&mut sleep).poll(&mut cx).is_ready());
    }

    #[test]
    fn dropping_sleep_cancels_its_wake() {
        let clock = VirtualScheduler::new();
        drop(clock.sleep(Duration::from_secs(2)));
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn wall_clock_waits_for_due_entries() {
        let clock = WallScheduler::new();
        clock.schedule_repeating(Duration::from_millis(5), Wake::ProgressTick);

        let deadline = clock.now() + Duration::from_millis(30);
        let mut fired = 0;
        while let Some(wake) = clock.pop_due(deadline) {
            assert_eq!(wake, Wake::ProgressTick);
            fired += 1;
        }

        assert!(clock.now() >= deadline);
        assert!((5..=6).contains(&fired), "fired {fired} times");
        assert_eq!(clock.pending(), 1);
    }

    #[test]
    fn wall_clock_returns_at_deadline_when_idle() {
        let clock = WallScheduler::new();
        let deadline = clock.now() + Duration::from_millis(10);
        assert!(clock.pop_due(deadline).is_none());
        assert!(clock.now() >= deadline);
    }

    #[test]
    fn overflowing_due_times_saturate() {
        let clock = VirtualScheduler::new();
        clock.schedule_after(Duration::MAX, Wake::Resume);
        assert!(clock.pop_due(Duration::from_secs(3600)).is_none());
        assert_eq!(clock.next_due(), Some(Duration::MAX));

        drop(clock.sleep(Duration::MAX));
        assert_eq!(clock.pending(), 1);
    }
}
