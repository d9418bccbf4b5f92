//! Error sinks for handler failures.
//!
//! Handler errors and panics never escape a dispatch pass. They are turned into
//! [`DispatchError`]s and handed to the registry's [`ErrorSink`]. The default
//! sink logs them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::DispatchError;

/// Receives handler failures captured during dispatch.
pub trait ErrorSink: Send + Sync {
    /// Called once per failed or panicking handler, on the dispatching thread.
    fn report(&self, error: DispatchError);
}

impl<F> ErrorSink for F
where
    F: Fn(DispatchError) + Send + Sync,
{
    fn report(&self, error: DispatchError) {
        self(error);
    }
}

/// Logs failures at `warn` level through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, error: DispatchError) {
        tracing::warn!(
            target: "eggify::dispatch",
            subscription = %error.subscription_id(),
            panicked = error.is_panic(),
            "cheat code handler failed: {error}"
        );
    }
}

/// Keeps failures in memory for later inspection.
#[derive(Debug, Default, Clone)]
pub struct CollectSink {
    errors: Arc<Mutex<Vec<DispatchError>>>,
}

impl CollectSink {
    /// An empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DispatchError>> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes and returns everything collected so far.
    pub fn take(&self) -> Vec<DispatchError> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of failures collected and not yet taken.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if nothing is waiting to be taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl ErrorSink for CollectSink {
    fn report(&self, error: DispatchError) {
        self.lock().push(error);
    }
}
