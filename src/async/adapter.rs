//! Bridge a one-shot callback operation into a single awaitable
//!
//! [`CallbackAdapter::run`] hands the provider a pair of callbacks, keeps the
//! optional [`CancelHandle`] it returns, and yields a concrete future that
//! resolves exactly once. The callbacks may fire on any thread; they only
//! store the outcome and wake the task, so the awaiting code always resumes
//! wherever it is being polled.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::callbacks::{self, OnFailure, OnSuccess, PendingState, Phase, ResolveOnce, Settle};
use super::cancel::{CancelHandle, CancelToken};
use super::outcome::Outcome;
use crate::error::{BridgeError, ErrorInfo};

/// Runs one callback-style operation and exposes its result as a future.
///
/// An adapter is consumed by the call that starts the operation, so every
/// in-flight operation has its own continuation slot.
#[derive(Debug)]
pub struct CallbackAdapter<T> {
    token: Option<CancelToken>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Default for CallbackAdapter<T> {
    fn default() -> Self {
        Self {
            token: None,
            _payload: PhantomData,
        }
    }
}

impl<T: Send + 'static> CallbackAdapter<T> {
    /// Create an adapter with no cancellation token attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation token for the awaiting context.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Start the operation and await it as an [`Outcome`].
    ///
    /// `register` is called immediately with the two callbacks. If it
    /// resolves synchronously, the returned future is ready on its first poll.
    pub fn run<R>(self, register: R) -> OutcomeFuture<T>
    where
        R: FnOnce(OnSuccess<T>, OnFailure<T>) -> Option<CancelHandle>,
    {
        let (sender, receiver) = oneshot::channel();
        let state = Arc::new(PendingState::new());
        let slot = Arc::new(ResolveOnce::new(Arc::clone(&state), sender));
        let (on_success, on_failure) = callbacks::pair(slot as Arc<dyn Settle<T>>);

        log::trace!("registering callbacks with provider");
        state.set_hook(register(on_success, on_failure));
        if let Some(token) = self.token {
            token.attach(&state);
        }

        OutcomeFuture {
            receiver,
            state,
            done: false,
        }
    }

    /// Start the operation and await its payload, raising failures as [`BridgeError`].
    pub fn run_raising<R>(self, register: R) -> PayloadFuture<T>
    where
        R: FnOnce(OnSuccess<T>, OnFailure<T>) -> Option<CancelHandle>,
    {
        PayloadFuture {
            inner: self.run(register),
        }
    }
}

/// How a pending operation ended.
enum Settled<T> {
    Resolved(Outcome<T>),
    Cancelled,
    Abandoned,
}

/// Future returned by [`CallbackAdapter::run`].
///
/// Dropping it before it resolves counts as cancellation: the provider's
/// cancel hook runs and any later callback is discarded.
#[must_use = "futures do nothing unless polled"]
pub struct OutcomeFuture<T> {
    receiver: oneshot::Receiver<Outcome<T>>,
    state: Arc<PendingState>,
    done: bool,
}

impl<T> OutcomeFuture<T> {
    /// Returns true while the provider's cancel hook is held and could still run.
    pub fn is_cancellable(&self) -> bool {
        self.state.has_hook()
    }

    fn poll_settled(&mut self, cx: &mut Context<'_>) -> Poll<Settled<T>> {
        assert!(!self.done, "OutcomeFuture polled after completion");
        self.state.register_waker(cx.waker());

        match self.state.phase() {
            Phase::Cancelled => {
                self.done = true;
                return Poll::Ready(Settled::Cancelled);
            }
            Phase::Cancelling => return Poll::Pending,
            Phase::Pending | Phase::Resolved => {}
        }

        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => {
                self.done = true;
                Poll::Ready(Settled::Resolved(outcome))
            }
            Poll::Ready(Err(_)) => {
                if !self.state.try_resolve() && self.state.phase() == Phase::Cancelling {
                    // The hook dropped the callbacks; wait for it to finish.
                    return Poll::Pending;
                }
                self.done = true;
                if self.state.phase() == Phase::Cancelled {
                    return Poll::Ready(Settled::Cancelled);
                }
                log::warn!("provider dropped its callbacks without resolving");
                Poll::Ready(Settled::Abandoned)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Future for OutcomeFuture<T> {
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.get_mut().poll_settled(cx) {
            Poll::Ready(Settled::Resolved(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Settled::Cancelled) => {
                Poll::Ready(Outcome::failure(ErrorInfo::cancelled()))
            }
            Poll::Ready(Settled::Abandoned) => {
                Poll::Ready(Outcome::failure(ErrorInfo::abandoned()))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for OutcomeFuture<T> {
    fn drop(&mut self) {
        if !self.done && self.state.cancel() {
            log::debug!("pending operation dropped before resolution");
        }
    }
}

/// Future returned by [`CallbackAdapter::run_raising`].
#[must_use = "futures do nothing unless polled"]
pub struct PayloadFuture<T> {
    inner: OutcomeFuture<T>,
}

impl<T> PayloadFuture<T> {
    /// Returns true while the provider's cancel hook is held and could still run.
    pub fn is_cancellable(&self) -> bool {
        self.inner.is_cancellable()
    }
}

impl<T> Future for PayloadFuture<T> {
    type Output = Result<Option<T>, BridgeError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.get_mut().inner.poll_settled(cx) {
            Poll::Ready(Settled::Resolved(outcome)) => {
                Poll::Ready(outcome.into_result().map_err(BridgeError::from))
            }
            Poll::Ready(Settled::Cancelled) => Poll::Ready(Err(BridgeError::Cancelled)),
            Poll::Ready(Settled::Abandoned) => Poll::Ready(Err(BridgeError::Abandoned)),
            Poll::Pending => Poll::Pending,
        }
    }
}
