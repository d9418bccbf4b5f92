//! Input sources.
//!
//! An [`InputSource`] is the shared keyboard subscription behind a
//! [`Registry`](crate::Registry). The registry attaches it when the first
//! registration is added and detaches it when the last one goes away; while
//! attached, the source feeds key events to the [`Dispatcher`] it was given.

/// Threaded, channel-fed source.
pub mod queue;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::event::KeyEvent;
use crate::registry::Dispatcher;

pub use queue::{KeySender, QueueSource, QueueSourceConfig};

/// The underlying keyboard subscription.
///
/// `attach` and `detach` are called with the registry's store lock held and
/// must not call back into the registry synchronously.
pub trait InputSource: Send + Sync {
    /// Start delivering events to `dispatcher`.
    fn attach(&self, dispatcher: Dispatcher);

    /// Stop delivering events and drop the dispatcher.
    fn detach(&self);
}

#[derive(Default)]
struct ManualInner {
    slot: Mutex<Option<Dispatcher>>,
    attaches: AtomicU64,
    detaches: AtomicU64,
}

/// A source driven by the host's own event loop.
///
/// The host calls [`ManualSource::deliver`] for each key press; events
/// delivered while detached are discarded. Clones share state, so keep one
/// clone and hand another to [`Registry::new`](crate::Registry::new).
#[derive(Clone, Default)]
pub struct ManualSource {
    inner: Arc<ManualInner>,
}

impl ManualSource {
    /// A detached source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Dispatcher>> {
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delivers one event. Returns false if the source is detached.
    pub fn deliver(&self, event: &KeyEvent) -> bool {
        // Clone out so handlers can unsubscribe (and detach us) mid-dispatch.
        let dispatcher = self.slot().clone();
        match dispatcher {
            Some(dispatcher) => {
                dispatcher.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Delivers events in order. Returns how many were delivered.
    pub fn deliver_all<'a, I>(&self, events: I) -> usize
    where
        I: IntoIterator<Item = &'a KeyEvent>,
    {
        events.into_iter().filter(|event| self.deliver(event)).count()
    }

    /// Whether a registry is currently listening.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.slot().is_some()
    }

    /// Number of times the source has been attached.
    #[must_use]
    pub fn attach_count(&self) -> u64 {
        self.inner.attaches.load(Ordering::Relaxed)
    }

    /// Number of times the source has been detached.
    #[must_use]
    pub fn detach_count(&self) -> u64 {
        self.inner.detaches.load(Ordering::Relaxed)
    }
}

impl InputSource for ManualSource {
    fn attach(&self, dispatcher: Dispatcher) {
        *self.slot() = Some(dispatcher);
        self.inner.attaches.fetch_add(1, Ordering::Relaxed);
    }

    fn detach(&self) {
        if self.slot().take().is_some() {
            self.inner.detaches.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl fmt::Debug for ManualSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualSource")
            .field("attached", &self.is_attached())
            .field("attaches", &self.attach_count())
            .field("detaches", &self.detach_count())
            .finish()
    }
}
