//! Heart regeneration countdown.
//!
//! [`CooldownTimer`] counts whole seconds down from its period. The owner
//! delivers one [`Wake::CooldownTick`](super::Wake::CooldownTick) per second
//! while the timer runs. When the countdown hits zero one heart is
//! regenerated; the countdown then restarts unless the pool is full.

use crate::domain::{Regeneration, ResourcePool};

/// Outcome of one cooldown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownTick {
    /// The countdown moved but has not expired.
    Counting {
        remaining_seconds: u32,
    },
    /// The countdown expired and regeneration was attempted.
    Expired {
        regeneration: Regeneration,
        /// `true` when the countdown was reset for another period,
        /// `false` when the timer went idle because the pool is full.
        restarted: bool,
    },
}

/// One-second countdown feeding a [`ResourcePool`].
///
/// States: idle and running. While idle the countdown rests at the full period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownTimer {
    period_seconds: u32,
    remaining_seconds: u32,
    running: bool,
}

impl CooldownTimer {
    /// Creates an idle countdown; a zero period is treated as one second.
    #[must_use]
    pub fn new(period_seconds: u32) -> Self {
        let period_seconds = period_seconds.max(1);
        Self {
            period_seconds,
            remaining_seconds: period_seconds,
            running: false,
        }
    }

    /// Starts counting down from the full period.
    ///
    /// Returns `false`, changing nothing, when the countdown is already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.remaining_seconds = self.period_seconds;
        tracing::debug!(period_seconds = self.period_seconds, "cooldown started");
        true
    }

    /// Stops the countdown and rewinds it to the full period.
    pub fn stop(&mut self) {
        self.running = false;
        self.remaining_seconds = self.period_seconds;
    }

    /// Handles one elapsed second.
    ///
    /// Returns `None` while idle. On expiry calls [`ResourcePool::regenerate`]
    /// exactly once.
    ///
    /// # Examples
    ///
    /// ```
    /// use holdsend::domain::ResourcePool;
    /// use holdsend::timing::{CooldownTick, CooldownTimer};
    ///
    /// let mut pool = ResourcePool::with_available(5, 4);
    /// let mut cooldown = CooldownTimer::new(2);
    /// cooldown.start();
    ///
    /// assert_eq!(cooldown.tick(&mut pool), Some(CooldownTick::Counting { remaining_seconds: 1 }));
    /// assert!(matches!(
    ///     cooldown.tick(&mut pool),
    ///     Some(CooldownTick::Expired { restarted: false, .. })
    /// ));
    /// assert_eq!(pool.available(), 5);
    /// assert!(!cooldown.is_running());
    /// ```
    pub fn tick(&mut self, pool: &mut ResourcePool) -> Option<CooldownTick> {
        if !self.running {
            return None;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return Some(CooldownTick::Counting {
                remaining_seconds: self.remaining_seconds,
            });
        }

        let regeneration = pool.regenerate();
        let restarted = !regeneration.is_full();
        self.remaining_seconds = self.period_seconds;
        if !restarted {
            self.running = false;
        }

        tracing::debug!(
            ?regeneration,
            restarted,
            available = pool.available(),
            "cooldown expired"
        );

        Some(CooldownTick::Expired {
            regeneration,
            restarted,
        })
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    #[must_use]
    pub const fn period_seconds(&self) -> u32 {
        self.period_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_period_regenerates_one_heart_and_restarts() {
        let mut pool = ResourcePool::with_available(5, 3);
        let mut cooldown = CooldownTimer::new(60);
        assert!(cooldown.start());

        for expected in (1..60).rev() {
            assert_eq!(
                cooldown.tick(&mut pool),
                Some(CooldownTick::Counting {
                    remaining_seconds: expected
                })
            );
        }
        assert_eq!(
            cooldown.tick(&mut pool),
            Some(CooldownTick::Expired {
                regeneration: Regeneration::Added { became_full: false },
                restarted: true,
            })
        );
        assert_eq!(pool.available(), 4);
        assert_eq!(cooldown.remaining_seconds(), 60);
        assert!(cooldown.is_running());
    }

    #[test]
    fn expiry_on_full_pool_goes_idle() {
        let mut pool = ResourcePool::new(5);
        let mut cooldown = CooldownTimer::new(3);
        cooldown.start();

        cooldown.tick(&mut pool);
        cooldown.tick(&mut pool);
        assert_eq!(
            cooldown.tick(&mut pool),
            Some(CooldownTick::Expired {
                regeneration: Regeneration::AlreadyFull,
                restarted: false,
            })
        );
        assert_eq!(pool.available(), 5);
        assert!(!cooldown.is_running());
        assert_eq!(cooldown.tick(&mut pool), None);
    }

    #[test]
    fn start_is_noop_while_running() {
        let mut pool = ResourcePool::with_available(5, 0);
        let mut cooldown = CooldownTimer::new(10);
        assert!(cooldown.start());
        cooldown.tick(&mut pool);
        assert!(!cooldown.start());
        assert_eq!(cooldown.remaining_seconds(), 9);
    }

    #[test]
    fn many_ticks_never_overfill() {
        let mut pool = ResourcePool::with_available(5, 0);
        let mut cooldown = CooldownTimer::new(1);
        cooldown.start();
        for _ in 0..100 {
            cooldown.tick(&mut pool);
            assert!(pool.available() <= pool.capacity());
        }
        assert_eq!(pool.available(), 5);
        assert!(!cooldown.is_running());
    }
}
