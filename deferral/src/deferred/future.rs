use super::core::{Deferred, Slot};
use crate::value::Value;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

impl Future for Deferred {
    /// `Ok(value)` once fulfilled, `Err(reason)` once rejected.
    type Output = Result<Value, Value>;

    /// Polls the deferred value.
    ///
    /// A settled value returns a clone of its outcome, so the same value may
    /// be awaited any number of times. A pending value registers the
    /// current waker, which the transition wakes. The check and the
    /// registration happen under the same lock, so no wake-up is missed.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.lock();

        match &mut *slot {
            Slot::Fulfilled(value) => Poll::Ready(Ok(value.clone())),
            Slot::Rejected(reason) => Poll::Ready(Err(reason.clone())),
            Slot::Pending { waiters, .. } => {
                if !waiters.iter().any(|w| w.will_wake(cx.waker())) {
                    waiters.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}
