//! Registration store and input-subscription lifecycle.
//!
//! A [`Registry`] owns the set of live registrations and the single shared
//! [`InputSource`]. The source is attached when the first registration is
//! added and detached when the last one is removed, so it is attached exactly
//! while the store is non-empty.

/// Event dispatch and handler isolation.
pub mod dispatcher;
/// Per-registration state machine.
pub mod matcher;
/// Registrations and subscription handles.
pub mod subscription;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::event::KeyEvent;
use crate::options::MatchOptions;
use crate::pattern::{Pattern, PatternSpec};
use crate::sink::{ErrorSink, LogSink};
use crate::source::InputSource;

pub use dispatcher::Dispatcher;
pub use matcher::{Progress, Transition};
pub use subscription::{HandlerError, HandlerResult, Subscription, SubscriptionId};

use subscription::Registration;

#[derive(Debug, Default)]
struct Store {
    registrations: Vec<Arc<Registration>>,
    listening: bool,
}

pub(crate) struct Core {
    this: Weak<Core>,
    store: Mutex<Store>,
    source: Arc<dyn InputSource>,
    sink: Arc<dyn ErrorSink>,
}

impl Core {
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Vec<Arc<Registration>> {
        self.lock().registrations.clone()
    }

    fn insert(&self, reg: Arc<Registration>) {
        let mut store = self.lock();
        tracing::debug!(
            target: "eggify::registry",
            subscription = %reg.id,
            pattern = %reg.pattern,
            "registered"
        );
        store.registrations.push(reg);
        if !store.listening {
            self.source.attach(Dispatcher::new(self.this.clone()));
            store.listening = true;
            tracing::debug!(target: "eggify::registry", "input source attached");
        }
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut store = self.lock();
        let Some(pos) = store.registrations.iter().position(|r| r.id == id) else {
            return false;
        };
        let reg = store.registrations.remove(pos);
        reg.deactivate();
        tracing::debug!(target: "eggify::registry", subscription = %id, "unsubscribed");
        self.detach_if_idle(&mut store);
        true
    }

    fn clear(&self) -> usize {
        let mut store = self.lock();
        let removed = store.registrations.len();
        for reg in store.registrations.drain(..) {
            reg.deactivate();
        }
        self.detach_if_idle(&mut store);
        removed
    }

    fn detach_if_idle(&self, store: &mut Store) {
        if store.listening && store.registrations.is_empty() {
            self.source.detach();
            store.listening = false;
            tracing::debug!(target: "eggify::registry", "input source detached");
        }
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        let store = self.store.get_mut().unwrap_or_else(PoisonError::into_inner);
        for reg in store.registrations.drain(..) {
            reg.deactivate();
        }
        if store.listening {
            self.source.detach();
            store.listening = false;
        }
    }
}

/// The registration store for one input source.
///
/// Cloning is cheap and shares the same store.
#[derive(Clone)]
pub struct Registry {
    core: Arc<Core>,
}

impl Registry {
    /// A registry over `source`, logging handler failures through `tracing`.
    pub fn new<S>(source: S) -> Self
    where
        S: InputSource + 'static,
    {
        Self::with_sink(source, LogSink)
    }

    /// A registry over `source`, routing handler failures to `sink`.
    pub fn with_sink<S, E>(source: S, sink: E) -> Self
    where
        S: InputSource + 'static,
        E: ErrorSink + 'static,
    {
        let source: Arc<dyn InputSource> = Arc::new(source);
        let sink: Arc<dyn ErrorSink> = Arc::new(sink);
        let core = Arc::new_cyclic(|this| Core {
            this: this.clone(),
            store: Mutex::new(Store::default()),
            source,
            sink,
        });
        Self { core }
    }

    /// Registers `handler` to run each time `pattern` is typed.
    ///
    /// Attaches the input source if this is the first live registration. If
    /// `options.cancellation` has already fired, the returned subscription is
    /// already inactive.
    pub fn register<P, F>(&self, pattern: P, handler: F, options: MatchOptions) -> Subscription
    where
        P: Into<PatternSpec>,
        F: Fn(&KeyEvent) -> HandlerResult + Send + Sync + 'static,
    {
        let pattern = Pattern::normalize(pattern);
        let reg = Arc::new(Registration::new(pattern, Box::new(handler), &options));
        self.core.insert(Arc::clone(&reg));

        if let Some(signal) = options.cancellation {
            let id = reg.id;
            let core = Arc::downgrade(&self.core);
            let callback = signal.on_cancel(move || {
                if let Some(core) = core.upgrade() {
                    core.remove(id);
                }
            });
            if let Some(callback) = callback {
                reg.watch(signal, callback);
            }
        }

        Subscription::new(reg, Arc::downgrade(&self.core))
    }

    /// [`Self::register`] with default options.
    pub fn on_cheat_code<P, F>(&self, pattern: P, handler: F) -> Subscription
    where
        P: Into<PatternSpec>,
        F: Fn(&KeyEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(pattern, handler, MatchOptions::default())
    }

    /// Removes every registration and detaches the input source.
    ///
    /// Returns the number of registrations removed. The registry stays usable;
    /// a later registration attaches the source again.
    pub fn shutdown(&self) -> usize {
        let removed = self.core.clear();
        tracing::debug!(target: "eggify::registry", removed, "registry shut down");
        removed
    }

    /// Whether the input source is currently attached.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.core.lock().listening
    }

    /// Number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.core.lock().registrations.len()
    }

    /// True when no registration is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.core.lock();
        f.debug_struct("Registry")
            .field("registrations", &store.registrations)
            .field("listening", &store.listening)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::cancel::CancelSignal;
    use crate::source::ManualSource;

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&KeyEvent) -> HandlerResult + Send + Sync + 'static) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        (hits, move |_: &KeyEvent| {
            h.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_listening_tracks_non_empty_store() {
        let source = ManualSource::new();
        let registry = Registry::new(source.clone());
        assert!(!registry.is_listening());
        assert!(!source.is_attached());

        let (_, h1) = counter();
        let (_, h2) = counter();
        let a = registry.on_cheat_code("KeyA KeyB", h1);
        let b = registry.on_cheat_code("KeyC KeyD", h2);
        assert!(registry.is_listening());
        assert_eq!(registry.len(), 2);
        assert_eq!(source.attach_count(), 1);

        a.unsubscribe();
        assert!(registry.is_listening());
        b.unsubscribe();
        assert!(!registry.is_listening());
        assert!(!source.is_attached());
        assert_eq!(source.detach_count(), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let source = ManualSource::new();
        let registry = Registry::new(source.clone());
        let (_, h) = counter();
        let sub = registry.on_cheat_code("KeyA KeyB", h);
        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());
        assert!(registry.is_empty());
        assert_eq!(source.detach_count(), 1);
    }

    #[test]
    fn test_already_cancelled_signal_unsubscribes_synchronously() {
        let source = ManualSource::new();
        let registry = Registry::new(source.clone());
        let (hits, h) = counter();
        let sub = registry.register(
            "KeyA KeyB",
            h,
            MatchOptions::default().with_cancellation(CancelSignal::cancelled()),
        );
        assert!(!sub.is_active());
        assert!(registry.is_empty());
        assert!(!registry.is_listening());

        source.deliver(&KeyEvent::code("KeyA"));
        source.deliver(&KeyEvent::code("KeyB"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_signal_removes_registration() {
        let source = ManualSource::new();
        let registry = Registry::new(source.clone());
        let signal = CancelSignal::new();
        let (_, h) = counter();
        let sub = registry.register(
            "KeyA KeyB",
            h,
            MatchOptions::default().with_cancellation(signal.clone()),
        );
        assert_eq!(signal.pending_callbacks(), 1);
        signal.cancel();
        assert!(!sub.is_active());
        assert!(!registry.is_listening());
        sub.unsubscribe();
    }

    #[test]
    fn test_unsubscribe_detaches_cancel_callback() {
        let registry = Registry::new(ManualSource::new());
        let signal = CancelSignal::new();
        let (_, h) = counter();
        let sub = registry.register(
            "KeyA KeyB",
            h,
            MatchOptions::default().with_cancellation(signal.clone()),
        );
        sub.unsubscribe();
        assert_eq!(signal.pending_callbacks(), 0);
    }

    #[test]
    fn test_shutdown_detaches_cancel_callbacks() {
        let registry = Registry::new(ManualSource::new());
        let signal = CancelSignal::new();
        for _ in 0..5 {
            let (_, h) = counter();
            let _sub = registry.register(
                "KeyA KeyB",
                h,
                MatchOptions::default().with_cancellation(signal.clone()),
            );
            assert_eq!(signal.pending_callbacks(), 1);
            assert_eq!(registry.shutdown(), 1);
            assert_eq!(signal.pending_callbacks(), 0);
        }
        assert!(!signal.is_cancelled());
    }

    #[test]
    fn test_dropping_registry_detaches_cancel_callbacks() {
        let signal = CancelSignal::new();
        let registry = Registry::new(ManualSource::new());
        let (_, h) = counter();
        let sub = registry.register(
            "KeyA KeyB",
            h,
            MatchOptions::default().with_cancellation(signal.clone()),
        );
        drop(registry);
        assert_eq!(signal.pending_callbacks(), 0);
        assert!(!sub.is_active());
    }

    #[test]
    fn test_shutdown_clears_and_detaches() {
        let source = ManualSource::new();
        let registry = Registry::new(source.clone());
        let (_, h1) = counter();
        let (_, h2) = counter();
        let a = registry.on_cheat_code("KeyA KeyB", h1);
        let _b = registry.on_cheat_code("up down", h2);
        assert_eq!(registry.shutdown(), 2);
        assert!(!a.is_active());
        assert!(!registry.is_listening());
        assert!(!source.is_attached());
        assert_eq!(registry.shutdown(), 0);
        assert_eq!(source.detach_count(), 1);
    }

    #[test]
    fn test_dropping_registry_detaches() {
        let source = ManualSource::new();
        let registry = Registry::new(source.clone());
        let (_, h) = counter();
        let sub = registry.on_cheat_code("KeyA KeyB", h);
        drop(registry);
        assert!(!source.is_attached());
        assert!(!sub.is_active());
        sub.unsubscribe();
    }

    #[test]
    fn test_subscription_exposes_normalized_pattern() {
        let registry = Registry::new(ManualSource::new());
        let (_, h) = counter();
        let sub = registry.on_cheat_code("up b", h);
        assert_eq!(sub.pattern().to_string(), "ArrowUp KeyB");
        assert!(format!("{registry:?}").contains("listening: true"));
    }
}
