//! Event dispatch.
//!
//! A [`Dispatcher`] is what an input source holds while attached. Each call to
//! [`Dispatcher::dispatch`] runs one matching pass over a snapshot of the live
//! registrations. Handlers run with no registry lock held, inside an isolation
//! boundary that turns returned errors and panics into
//! [`DispatchError`]s for the registry's error sink.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Weak;

use chrono::Utc;

use crate::error::DispatchError;
use crate::event::KeyEvent;

use super::matcher::Transition;
use super::subscription::Registration;
use super::Core;

/// Delivers input events to a registry.
///
/// Holds only a weak reference: once the registry is dropped, dispatching is a
/// no-op.
#[derive(Clone)]
pub struct Dispatcher {
    core: Weak<Core>,
}

impl Dispatcher {
    pub(crate) fn new(core: Weak<Core>) -> Self {
        Self { core }
    }

    /// Runs one matching pass for `event`.
    ///
    /// Returns the number of registrations whose pattern completed on this
    /// event. Never panics because of a handler.
    pub fn dispatch(&self, event: &KeyEvent) -> usize {
        match self.core.upgrade() {
            Some(core) => core.dispatch(event),
            None => 0,
        }
    }

    /// Returns true while the registry is alive.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.core.strong_count() > 0
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl Core {
    pub(crate) fn dispatch(&self, event: &KeyEvent) -> usize {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return 0;
        }

        let now = event.timestamp.unwrap_or_else(Utc::now);
        let code = event.canonical_code();
        let mut completed = 0;

        for reg in &snapshot {
            // Removed by an earlier handler in this pass.
            if !reg.is_active() || !reg.accepts(event) {
                continue;
            }

            let (transition, cursor) = {
                let mut progress = reg.progress();
                let transition = progress.step(&reg.pattern, &code, now, reg.max_key_delay());
                (transition, progress.cursor())
            };
            tracing::trace!(
                target: "eggify::matcher",
                subscription = %reg.id,
                code = %code,
                ?transition,
                cursor,
                "key matched against pattern"
            );

            if transition == Transition::Completed {
                completed += 1;
                tracing::debug!(
                    target: "eggify::dispatch",
                    subscription = %reg.id,
                    pattern = %reg.pattern,
                    "sequence completed"
                );
                self.invoke(reg, event);
            }
        }

        completed
    }

    fn invoke(&self, reg: &Registration, event: &KeyEvent) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (reg.handler)(event)));
        let error = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => DispatchError::HandlerFailed {
                subscription_id: reg.id,
                pattern: reg.pattern.clone(),
                message: e.to_string(),
            },
            Err(payload) => DispatchError::HandlerPanicked {
                subscription_id: reg.id,
                pattern: reg.pattern.clone(),
                message: panic_message(payload.as_ref()),
            },
        };

        // A panicking sink must not escape the dispatch pass either.
        if panic::catch_unwind(AssertUnwindSafe(|| self.sink.report(error))).is_err() {
            tracing::error!(target: "eggify::dispatch", subscription = %reg.id, "error sink panicked");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
