//! Regenerating heart pool.
//!
//! A [`ResourcePool`] holds the hearts that gate notification sends. A heart is
//! spent only when a send is confirmed delivered and comes back one at a time
//! when the cooldown expires. The pool performs no I/O and no timing; callers
//! decide when to consume and when to regenerate.

use serde::{Deserialize, Serialize};

/// Result of a single regeneration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regeneration {
    /// One heart was added.
    Added {
        /// Whether this addition filled the pool to capacity.
        became_full: bool,
    },
    /// The pool was already at capacity; nothing changed.
    AlreadyFull,
}

impl Regeneration {
    /// Returns `true` when the pool is at capacity after this regeneration.
    #[must_use]
    pub const fn is_full(self) -> bool {
        matches!(self, Self::Added { became_full: true } | Self::AlreadyFull)
    }
}

/// Bounded counter of available hearts.
///
/// `available` stays within `0..=capacity` at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    capacity: u32,
    available: u32,
}

impl ResourcePool {
    /// Creates a full pool.
    ///
    /// # Examples
    ///
    /// ```
    /// use holdsend::domain::ResourcePool;
    ///
    /// let pool = ResourcePool::new(5);
    /// assert_eq!(pool.available(), 5);
    /// assert!(pool.is_full());
    /// ```
    #[must_use]
    pub const fn new(capacity: u32) -> Self {
        Self {
            capacity,
            available: capacity,
        }
    }

    /// Creates a pool holding `available` hearts, clamped to `capacity`.
    #[must_use]
    pub fn with_available(capacity: u32, available: u32) -> Self {
        Self {
            capacity,
            available: available.min(capacity),
        }
    }

    /// Number of hearts that can currently be spent.
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.available
    }

    /// Maximum number of hearts.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.available == 0
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.available >= self.capacity
    }

    /// Spends one heart.
    ///
    /// Returns `false` and leaves the pool untouched when it is empty.
    pub fn try_consume(&mut self) -> bool {
        if self.available == 0 {
            return false;
        }
        self.available -= 1;
        tracing::debug!(available = self.available, capacity = self.capacity, "heart consumed");
        true
    }

    /// Adds one heart if the pool is below capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use holdsend::domain::{Regeneration, ResourcePool};
    ///
    /// let mut pool = ResourcePool::with_available(2, 1);
    /// assert_eq!(pool.regenerate(), Regeneration::Added { became_full: true });
    /// assert_eq!(pool.regenerate(), Regeneration::AlreadyFull);
    /// assert_eq!(pool.available(), 2);
    /// ```
    pub fn regenerate(&mut self) -> Regeneration {
        if self.is_full() {
            return Regeneration::AlreadyFull;
        }
        self.available += 1;
        let became_full = self.is_full();
        tracing::debug!(
            available = self.available,
            capacity = self.capacity,
            became_full,
            "heart regenerated"
        );
        Regeneration::Added { became_full }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_stops_at_zero() {
        let mut pool = ResourcePool::new(2);
        assert!(pool.try_consume());
        assert!(pool.try_consume());
        assert!(!pool.try_consume());
        assert_eq!(pool.available(), 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn regenerate_never_exceeds_capacity() {
        let mut pool = ResourcePool::with_available(5, 3);
        assert_eq!(pool.regenerate(), Regeneration::Added { became_full: false });
        assert_eq!(pool.regenerate(), Regeneration::Added { became_full: true });
        for _ in 0..10 {
            assert_eq!(pool.regenerate(), Regeneration::AlreadyFull);
        }
        assert_eq!(pool.available(), 5);
    }

    #[test]
    fn initial_available_is_clamped() {
        let pool = ResourcePool::with_available(3, 9);
        assert_eq!(pool.available(), 3);
    }

    #[test]
    fn zero_capacity_pool_is_both_empty_and_full() {
        let mut pool = ResourcePool::new(0);
        assert!(pool.is_empty());
        assert!(pool.is_full());
        assert!(!pool.try_consume());
        assert_eq!(pool.regenerate(), Regeneration::AlreadyFull);
    }
}
