//! Cancellation signal for registrations.
//!
//! A [`CancelSignal`] is a cloneable flag that fires at most once. Callbacks
//! registered with [`CancelSignal::on_cancel`] run when it fires, or
//! immediately if it already has. Registrations created with a signal are
//! unsubscribed when the signal fires.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Callback = Box<dyn FnOnce() + Send>;

/// Handle for a callback attached to a [`CancelSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

#[derive(Default)]
struct State {
    cancelled: bool,
    next_id: u64,
    callbacks: Vec<(CallbackId, Callback)>,
}

/// A fire-once cancellation signal. Clones share state.
#[derive(Clone, Default)]
pub struct CancelSignal {
    state: Arc<Mutex<State>>,
}

impl CancelSignal {
    /// A signal that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal that has already fired.
    #[must_use]
    pub fn cancelled() -> Self {
        let signal = Self::new();
        signal.cancel();
        signal
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fires the signal. Idempotent.
    ///
    /// Callbacks run on the calling thread, in attachment order, after the
    /// internal lock is released.
    pub fn cancel(&self) {
        let callbacks = {
            let mut state = self.lock();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            std::mem::take(&mut state.callbacks)
        };
        tracing::debug!(target: "eggify::cancel", callbacks = callbacks.len(), "cancel signal fired");
        for (_, callback) in callbacks {
            callback();
        }
    }

    /// Whether [`Self::cancel`] has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Attaches a callback.
    ///
    /// If the signal has already fired, `callback` runs synchronously before
    /// this returns and `None` is returned.
    pub fn on_cancel<F>(&self, callback: F) -> Option<CallbackId>
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.lock();
            if !state.cancelled {
                let id = CallbackId(state.next_id);
                state.next_id += 1;
                state.callbacks.push((id, Box::new(callback)));
                return Some(id);
            }
        }
        callback();
        None
    }

    /// Detaches a callback that has not run yet. Returns true if it was found.
    pub fn remove_callback(&self, id: CallbackId) -> bool {
        let mut state = self.lock();
        let before = state.callbacks.len();
        state.callbacks.retain(|(cid, _)| *cid != id);
        state.callbacks.len() != before
    }

    /// Number of callbacks waiting for the signal.
    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.lock().callbacks.len()
    }
}

impl PartialEq for CancelSignal {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for CancelSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("CancelSignal")
            .field("cancelled", &state.cancelled)
            .field("pending_callbacks", &state.callbacks.len())
            .finish()
    }
}
