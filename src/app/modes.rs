//! Interaction phase of the hold-to-send state machine.
//!
//! # State Machine
//!
//! ```text
//! Idle ──press──► Holding ──progress done──► Completed ──send──► Sending ──resolved──► Settled
//!  ▲                 │                           │                                       │
//!  ├──── release ────┘                           │                                       │
//!  ├──────────────────────── reset ──────────────┘                                       │
//!  └──────────────────────────────────────── reset ──────────────────────────────────────┘
//! ```
//!
//! The phase is derived from the interaction flags rather than stored, so the
//! flags stay the single source of truth.
//!
//! # Example
//!
//! ```rust
//! use holdsend::app::Phase;
//!
//! assert_eq!(Phase::Holding.to_string(), "holding");
//! ```

/// Where the current interaction is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No hold in progress; ready for a new one.
    Idle,

    /// The control is pressed and progress is advancing.
    Holding,

    /// Progress reached one; the send may be dispatched.
    Completed,

    /// The send is outstanding.
    Sending,

    /// The send resolved; waiting for the caller to observe and reset.
    Settled,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Holding => "holding",
            Self::Completed => "completed",
            Self::Sending => "sending",
            Self::Settled => "settled",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
