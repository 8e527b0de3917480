//! The injected asynchronous send operation.
//!
//! A [`Notifier`] turns a [`SendRequest`] into a future resolving to a
//! [`SendOutcome`]. The runtime owns the future and drops it to cancel the
//! send, so a notifier must not mutate anything on its own once the future is
//! gone.

use super::messages::{SendOutcome, SendRequest};
use crate::timing::{Scheduler, VirtualScheduler};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::time::Duration;

/// Seam for the real network client.
pub trait Notifier: Send {
    /// Starts delivering `request`. The returned future resolves with the outcome.
    fn send(&mut self, request: &SendRequest) -> BoxFuture<'static, SendOutcome>;
}

/// Stand-in notifier: waits a fixed latency on the session clock, then resolves
/// with a fixed outcome.
#[derive(Debug, Clone)]
pub struct SimulatedNotifier<S: Scheduler = VirtualScheduler> {
    clock: S,
    latency: Duration,
    outcome: SendOutcome,
}

impl<S: Scheduler> SimulatedNotifier<S> {
    #[must_use]
    pub const fn new(clock: S, latency: Duration, outcome: SendOutcome) -> Self {
        Self {
            clock,
            latency,
            outcome,
        }
    }
}

impl<S: Scheduler> Notifier for SimulatedNotifier<S> {
    fn send(&mut self, request: &SendRequest) -> BoxFuture<'static, SendOutcome> {
        tracing::debug!(
            request_id = %request.id,
            latency = ?self.latency,
            outcome = ?self.outcome,
            "simulated send started"
        );
        let sleep = self.clock.sleep(self.latency);
        let outcome = self.outcome;
        async move {
            sleep.await;
            outcome
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::RequestId;
    use futures_util::task::noop_waker;
    use std::task::{Context, Poll};

    #[test]
    fn resolves_after_latency() {
        let clock = VirtualScheduler::new();
        let mut notifier =
            SimulatedNotifier::new(clock.clone(), Duration::from_secs(2), SendOutcome::Delivered);
        let mut pending = notifier.send(&SendRequest::new(RequestId(1)));

        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        assert!(pending.poll_unpin(&mut cx).is_pending());

        while clock.pop_due(Duration::from_secs(1)).is_some() {}
        assert!(pending.poll_unpin(&mut cx).is_pending());

        while clock.pop_due(Duration::from_secs(2)).is_some() {}
        assert_eq!(pending.poll_unpin(&mut cx), Poll::Ready(SendOutcome::Delivered));
    }

    #[test]
    fn dropping_the_future_cancels_the_wake() {
        let clock = VirtualScheduler::new();
        let mut notifier =
            SimulatedNotifier::new(clock.clone(), Duration::from_secs(2), SendOutcome::Failed);
        let pending = notifier.send(&SendRequest::new(RequestId(7)));
        assert_eq!(clock.pending(), 1);
        drop(pending);
        assert_eq!(clock.pending(), 0);
    }
}
