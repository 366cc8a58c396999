//! Cancellation token for backend requests.
//!
//! Every fetch a view issues is tied to a `RequestToken`. When the view's
//! parameters change (or the view goes away) the token is cancelled, the
//! in-flight request is abandoned and its eventual result is ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// A cloneable cancellation token for one request (or one group of requests).
///
/// Clones share state: cancelling any clone cancels all of them, and every
/// task awaiting [`RequestToken::cancelled`] is woken.
///
/// # Example
///
/// ```
/// use customer360_dashboard::cancel::RequestToken;
///
/// let token = RequestToken::new();
/// let in_flight = token.clone();
///
/// token.cancel();
/// assert!(in_flight.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestToken {
    inner: Arc<Inner>,
}

impl RequestToken {
    /// Create a new, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake all waiters.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the token is cancelled.
    ///
    /// Resolves immediately if the token was already cancelled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before re-checking so a concurrent cancel() is not missed.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Drop guard that cancels its token when it goes out of scope.
///
/// Views hold one of these for the request they currently own, so tearing
/// the view down abandons whatever is still in flight.
#[derive(Debug)]
pub struct CancelOnDrop(RequestToken);

impl CancelOnDrop {
    pub fn new(token: RequestToken) -> Self {
        Self(token)
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}
