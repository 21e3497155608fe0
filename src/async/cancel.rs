//! Cancellation plumbing between an awaiting context and a provider

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::callbacks::PendingState;

/// Hook a provider hands back so the bridge can stop the underlying operation early.
///
/// The hook is consumed by [`CancelHandle::cancel`], so it runs at most once.
pub struct CancelHandle {
    hook: Box<dyn FnOnce() + Send + 'static>,
}

impl CancelHandle {
    /// Wraps a cancel hook.
    pub fn new(hook: impl FnOnce() + Send + 'static) -> Self {
        Self {
            hook: Box::new(hook),
        }
    }

    /// Runs the hook.
    pub fn cancel(self) {
        (self.hook)()
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle").finish_non_exhaustive()
    }
}

/// Cooperative cancellation signal for an awaiting context.
///
/// Clone-able and thread-safe. A single token may be attached to any number
/// of pending operations. [`CancelToken::cancel`] claims each one that is still
/// pending, runs its cancel hook and wakes its task before returning.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

#[derive(Default)]
struct TokenInner {
    cancelled: AtomicBool,
    attached: Mutex<Vec<Weak<PendingState>>>,
}

impl CancelToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Request cancellation. Calling this more than once has no further effect.
    ///
    /// Once the first call returns, any callback arriving afterwards is discarded.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let attached = std::mem::take(&mut *self.inner.attached.lock());
        for op in attached.iter().filter_map(Weak::upgrade) {
            op.cancel();
        }
    }

    /// Attaches a pending operation. If the token is already cancelled the
    /// operation is cancelled right away.
    pub(crate) fn attach(&self, op: &Arc<PendingState>) {
        {
            let mut attached = self.inner.attached.lock();
            if !self.is_cancelled() {
                attached.retain(|w| w.strong_count() > 0);
                attached.push(Arc::downgrade(op));
                return;
            }
        }
        op.cancel();
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn cancel_is_idempotent() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(token.clone().is_cancelled());
    }

    #[test]
    fn finished_operations_are_pruned() {
        let token = CancelToken::new();
        for _ in 0..8 {
            token.attach(&Arc::new(PendingState::new()));
        }
        let live = Arc::new(PendingState::new());
        token.attach(&live);
        assert_eq!(token.inner.attached.lock().len(), 1);
    }

    #[test]
    fn attaching_to_a_cancelled_token_cancels_at_once() {
        let token = CancelToken::new();
        token.cancel();
        let op = Arc::new(PendingState::new());
        token.attach(&op);
        assert!(!op.try_resolve());
        assert!(token.inner.attached.lock().is_empty());
    }

    #[test]
    fn handle_runs_its_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        CancelHandle::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .cancel();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
