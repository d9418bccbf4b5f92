//! Registrations and the handles returned to callers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cancel::{CallbackId, CancelSignal};
use crate::event::KeyEvent;
use crate::options::MatchOptions;
use crate::pattern::Pattern;

use super::matcher::Progress;
use super::Core;

/// Error type handlers may return.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a handler invocation.
pub type HandlerResult = Result<(), HandlerError>;

pub(crate) type BoxedHandler = Box<dyn Fn(&KeyEvent) -> HandlerResult + Send + Sync>;

/// Unique identifier for a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new random subscription id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One subscribed pattern with its handler, options and progress.
pub(crate) struct Registration {
    pub(crate) id: SubscriptionId,
    pub(crate) pattern: Pattern,
    pub(crate) handler: BoxedHandler,
    ignore_editable: bool,
    allow_repeat: bool,
    max_key_delay: Option<TimeDelta>,
    progress: Mutex<Progress>,
    active: AtomicBool,
    cancel: Mutex<Option<(CancelSignal, CallbackId)>>,
}

impl Registration {
    pub(crate) fn new(pattern: Pattern, handler: BoxedHandler, options: &MatchOptions) -> Self {
        Self {
            id: SubscriptionId::new(),
            pattern,
            handler,
            ignore_editable: options.ignore_editable,
            allow_repeat: options.allow_repeat,
            max_key_delay: options.max_key_delay(),
            progress: Mutex::new(Progress::new()),
            active: AtomicBool::new(true),
            cancel: Mutex::new(None),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Marks the registration dead and detaches its cancellation callback.
    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
        self.release_cancel();
    }

    /// Remembers the callback registered on `signal` so removal can detach it.
    pub(crate) fn watch(&self, signal: CancelSignal, callback: CallbackId) {
        *self.cancel_slot() = Some((signal, callback));
        // Removed while the callback was being attached.
        if !self.is_active() {
            self.release_cancel();
        }
    }

    fn cancel_slot(&self) -> MutexGuard<'_, Option<(CancelSignal, CallbackId)>> {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release_cancel(&self) {
        let watched = self.cancel_slot().take();
        if let Some((signal, callback)) = watched {
            signal.remove_callback(callback);
        }
    }

    /// Whether this registration takes part in matching `event` at all.
    pub(crate) fn accepts(&self, event: &KeyEvent) -> bool {
        if event.repeat && !self.allow_repeat {
            return false;
        }
        !(self.ignore_editable && event.targets_editable())
    }

    pub(crate) fn progress(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) const fn max_key_delay(&self) -> Option<TimeDelta> {
        self.max_key_delay
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("ignore_editable", &self.ignore_editable)
            .field("allow_repeat", &self.allow_repeat)
            .field("max_key_delay", &self.max_key_delay)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

/// Handle returned by [`Registry::register`](super::Registry::register).
///
/// Dropping the handle does not unsubscribe; the registration stays live until
/// [`Subscription::unsubscribe`] is called or its cancellation signal fires.
pub struct Subscription {
    registration: Arc<Registration>,
    core: Weak<Core>,
}

impl Subscription {
    pub(crate) fn new(registration: Arc<Registration>, core: Weak<Core>) -> Self {
        Self { registration, core }
    }

    /// Identifier of the underlying registration.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.registration.id
    }

    /// The normalized pattern this subscription matches.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.registration.pattern
    }

    /// False once unsubscribed, cancelled, or the registry has shut down.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registration.is_active()
    }

    /// Removes the registration. Idempotent.
    pub fn unsubscribe(&self) {
        if let Some(core) = self.core.upgrade() {
            core.remove(self.registration.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.registration.id)
            .field("pattern", &self.registration.pattern)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTarget;

    fn registration(options: &MatchOptions) -> Registration {
        Registration::new(Pattern::normalize("KeyA KeyB"), Box::new(|_| Ok(())), options)
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        assert_ne!(SubscriptionId::new(), SubscriptionId::new());
    }

    #[test]
    fn test_default_options_filter_repeat_and_editable() {
        let reg = registration(&MatchOptions::default());
        assert!(reg.accepts(&KeyEvent::code("KeyA")));
        assert!(!reg.accepts(&KeyEvent::code("KeyA").repeated()));
        assert!(!reg.accepts(&KeyEvent::code("KeyA").on(EventTarget::element("textarea"))));
        assert!(!reg.accepts(&KeyEvent::code("KeyA").on(EventTarget::editable())));
        assert!(reg.accepts(&KeyEvent::code("KeyA").on(EventTarget::element("canvas"))));
    }

    #[test]
    fn test_permissive_options_accept_everything() {
        let reg = registration(
            &MatchOptions::default()
                .with_allow_repeat(true)
                .with_ignore_editable(false),
        );
        assert!(reg.accepts(&KeyEvent::code("KeyA").repeated()));
        assert!(reg.accepts(&KeyEvent::code("KeyA").on(EventTarget::element("input"))));
    }

    #[test]
    fn test_deactivate_detaches_cancel_callback() {
        let reg = registration(&MatchOptions::default());
        let signal = CancelSignal::new();
        let callback = signal.on_cancel(|| {}).unwrap();
        reg.watch(signal.clone(), callback);
        assert_eq!(signal.pending_callbacks(), 1);

        reg.deactivate();
        assert_eq!(signal.pending_callbacks(), 0);
        reg.deactivate();
    }

    #[test]
    fn test_watch_after_removal_detaches_immediately() {
        let reg = registration(&MatchOptions::default());
        reg.deactivate();
        let signal = CancelSignal::new();
        let callback = signal.on_cancel(|| {}).unwrap();
        reg.watch(signal.clone(), callback);
        assert_eq!(signal.pending_callbacks(), 0);
    }

    #[test]
    fn test_options_are_captured_at_construction() {
        let reg = registration(&MatchOptions::default().with_max_key_delay_ms(250));
        assert_eq!(reg.max_key_delay(), Some(TimeDelta::milliseconds(250)));
        assert!(reg.is_active());
        reg.deactivate();
        assert!(!reg.is_active());
    }
}
