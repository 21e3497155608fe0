//! Callback handles given to a provider
//!
//! A provider receives one [`OnSuccess`] and one [`OnFailure`] per operation.
//! Both share a resolve-once guard: whichever call lands first wins, and every
//! later call on either handle is ignored.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::task::Waker;

use futures::task::AtomicWaker;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::cancel::CancelHandle;
use super::outcome::Outcome;
use crate::error::ErrorInfo;

/// Receives the single settlement of an operation.
pub(crate) trait Settle<T>: Send + Sync {
    /// Returns true if this call resolved the operation.
    fn settle(&self, outcome: Outcome<T>) -> bool;
}

const PENDING: u8 = 0;
const CANCELLING: u8 = 1;
const RESOLVED: u8 = 2;
const CANCELLED: u8 = 3;

/// Where a pending operation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Pending,
    Cancelling,
    Resolved,
    Cancelled,
}

/// Resolve-once state shared by the callbacks, the awaiting future and any
/// attached [`CancelToken`](super::CancelToken).
///
/// `Pending -> Resolved` on the first callback, or
/// `Pending -> Cancelling -> Cancelled` when cancellation claims it first.
/// The cancel hook runs inside `Cancelling`, so it runs at most once and any
/// callback it triggers is ignored.
pub(crate) struct PendingState {
    state: AtomicU8,
    hook: Mutex<Option<CancelHandle>>,
    waker: AtomicWaker,
}

impl PendingState {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(PENDING),
            hook: Mutex::new(None),
            waker: AtomicWaker::new(),
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        match self.state.load(Ordering::Acquire) {
            PENDING => Phase::Pending,
            CANCELLING => Phase::Cancelling,
            RESOLVED => Phase::Resolved,
            _ => Phase::Cancelled,
        }
    }

    /// Stores the provider's cancel hook. A hook arriving after the operation
    /// resolved is dropped unused.
    pub(crate) fn set_hook(&self, hook: Option<CancelHandle>) {
        let mut slot = self.hook.lock();
        if self.state.load(Ordering::Acquire) == PENDING {
            *slot = hook;
        }
    }

    pub(crate) fn has_hook(&self) -> bool {
        self.hook.lock().is_some()
    }

    pub(crate) fn register_waker(&self, waker: &Waker) {
        self.waker.register(waker);
    }

    /// Claims the operation for resolution. Only one caller ever gets `true`.
    pub(crate) fn try_resolve(&self) -> bool {
        if self
            .state
            .compare_exchange(PENDING, RESOLVED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        // The hook can no longer run; release whatever it captured.
        let stale = self.hook.lock().take();
        drop(stale);
        true
    }

    /// Claims the operation for cancellation, runs the hook and wakes the awaiting task.
    ///
    /// Returns false if a callback or an earlier cancellation got there first.
    pub(crate) fn cancel(&self) -> bool {
        if self
            .state
            .compare_exchange(PENDING, CANCELLING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        let hook = self.hook.lock().take();
        match hook {
            Some(hook) => {
                log::debug!("invoking provider cancel hook");
                hook.cancel();
            }
            None => {
                log::debug!("cancelled without a provider hook; late callbacks will be discarded");
            }
        }
        self.state.store(CANCELLED, Ordering::Release);
        self.waker.wake();
        true
    }
}

/// Single-slot continuation owned by one pending operation.
pub(crate) struct ResolveOnce<T> {
    state: Arc<PendingState>,
    sender: Mutex<Option<oneshot::Sender<Outcome<T>>>>,
}

impl<T> ResolveOnce<T> {
    pub(crate) fn new(state: Arc<PendingState>, sender: oneshot::Sender<Outcome<T>>) -> Self {
        Self {
            state,
            sender: Mutex::new(Some(sender)),
        }
    }
}

impl<T: Send> Settle<T> for ResolveOnce<T> {
    fn settle(&self, outcome: Outcome<T>) -> bool {
        if !self.state.try_resolve() {
            log::debug!(
                "ignoring {:?} callback on an operation that already settled",
                outcome.tag()
            );
            return false;
        }
        let sender = self.sender.lock().take();
        if let Some(sender) = sender {
            if sender.send(outcome).is_err() {
                log::trace!("awaiting side went away before the outcome arrived");
            }
        }
        true
    }
}

type SuccessFn<T> = Box<dyn FnOnce(Option<T>) + Send + 'static>;
type FailureFn = Box<dyn FnOnce(ErrorInfo) + Send + 'static>;

/// Forwards the first settlement to plain closures.
struct FnSettle<T> {
    resolved: AtomicBool,
    on_success: Mutex<Option<SuccessFn<T>>>,
    on_failure: Mutex<Option<FailureFn>>,
}

impl<T: Send> Settle<T> for FnSettle<T> {
    fn settle(&self, outcome: Outcome<T>) -> bool {
        if self.resolved.swap(true, Ordering::AcqRel) {
            log::debug!("ignoring {:?} callback after the first one", outcome.tag());
            return false;
        }
        match outcome {
            Outcome::Success(payload) => {
                let on_success = self.on_success.lock().take();
                self.on_failure.lock().take();
                if let Some(f) = on_success {
                    f(payload);
                }
            }
            Outcome::Failure(cause) => {
                let on_failure = self.on_failure.lock().take();
                self.on_success.lock().take();
                if let Some(f) = on_failure {
                    f(cause);
                }
            }
        }
        true
    }
}

/// Success callback handed to a provider.
pub struct OnSuccess<T> {
    slot: Arc<dyn Settle<T>>,
}

/// Failure callback handed to a provider.
pub struct OnFailure<T> {
    slot: Arc<dyn Settle<T>>,
}

impl<T> OnSuccess<T> {
    /// Reports success. `payload` may be a value or `None`; an absent payload is still success.
    ///
    /// Returns false if the operation had already been resolved or cancelled.
    pub fn call(&self, payload: impl Into<Option<T>>) -> bool {
        self.slot.settle(Outcome::Success(payload.into()))
    }
}

impl<T> OnFailure<T> {
    /// Reports failure.
    ///
    /// Returns false if the operation had already been resolved or cancelled.
    pub fn call(&self, cause: ErrorInfo) -> bool {
        self.slot.settle(Outcome::Failure(cause))
    }
}

impl<T> Clone for OnSuccess<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Clone for OnFailure<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> fmt::Debug for OnSuccess<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnSuccess").finish_non_exhaustive()
    }
}

impl<T> fmt::Debug for OnFailure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnFailure").finish_non_exhaustive()
    }
}

/// Builds the callback pair sharing one settlement slot.
pub(crate) fn pair<T>(slot: Arc<dyn Settle<T>>) -> (OnSuccess<T>, OnFailure<T>) {
    (
        OnSuccess {
            slot: Arc::clone(&slot),
        },
        OnFailure { slot },
    )
}

/// Builds a guarded callback pair that forwards to plain closures.
///
/// Only the first call across both handles reaches a closure.
pub fn from_fns<T, S, F>(on_success: S, on_failure: F) -> (OnSuccess<T>, OnFailure<T>)
where
    T: Send + 'static,
    S: FnOnce(Option<T>) + Send + 'static,
    F: FnOnce(ErrorInfo) + Send + 'static,
{
    let slot: Arc<dyn Settle<T>> = Arc::new(FnSettle {
        resolved: AtomicBool::new(false),
        on_success: Mutex::new(Some(Box::new(on_success) as SuccessFn<T>)),
        on_failure: Mutex::new(Some(Box::new(on_failure) as FailureFn)),
    });
    pair(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_closure_call_wins() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (ok_seen, err_seen) = (Arc::clone(&seen), Arc::clone(&seen));
        let (on_success, on_failure) = from_fns(
            move |v: Option<u32>| ok_seen.lock().push(format!("ok {v:?}")),
            move |e| err_seen.lock().push(format!("err {e}")),
        );

        assert!(on_failure.call(ErrorInfo::new("boom")));
        assert!(!on_success.call(1));
        assert!(!on_failure.clone().call(ErrorInfo::new("again")));
        assert_eq!(*seen.lock(), vec!["err boom".to_string()]);
    }

    #[test]
    fn cancel_claim_blocks_later_callbacks() {
        let (tx, mut rx) = oneshot::channel::<Outcome<u8>>();
        let state = Arc::new(PendingState::new());
        let slot = Arc::new(ResolveOnce::new(Arc::clone(&state), tx));
        assert!(state.cancel());
        assert!(!state.cancel());
        assert_eq!(state.phase(), Phase::Cancelled);

        let (on_success, _) = pair(slot as Arc<dyn Settle<u8>>);
        assert!(!on_success.call(3));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn resolution_blocks_later_cancel() {
        let state = Arc::new(PendingState::new());
        let calls = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&calls);
        state.set_hook(Some(CancelHandle::new(move || flag.store(true, Ordering::SeqCst))));

        assert!(state.try_resolve());
        assert!(!state.cancel());
        assert_eq!(state.phase(), Phase::Resolved);
        assert!(!calls.load(Ordering::SeqCst));
    }
}
