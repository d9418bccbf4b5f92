//! Channel-fed input source.
//!
//! Key events are pushed from any thread through a [`KeySender`] into a
//! bounded crossbeam channel. A dedicated worker thread drains the channel and
//! dispatches each event in send order. Sending never blocks: events that do
//! not fit in the queue, or that arrive while the source is detached, are
//! dropped and counted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::error::SourceError;
use crate::event::KeyEvent;
use crate::registry::Dispatcher;

use super::InputSource;

/// Settings for [`QueueSource::spawn`].
#[derive(Debug, Clone)]
pub struct QueueSourceConfig {
    /// Max queued events before new ones are dropped.
    pub capacity: usize,
    /// Name of the worker thread.
    pub thread_name: String,
}

impl Default for QueueSourceConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            thread_name: "eggify-input".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    slot: Mutex<Option<Dispatcher>>,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl Shared {
    fn slot(&self) -> MutexGuard<'_, Option<Dispatcher>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Input source backed by a worker thread.
///
/// The worker exits once every [`KeySender`] has been dropped.
#[derive(Debug)]
pub struct QueueSource {
    shared: Arc<Shared>,
    worker: JoinHandle<()>,
}

/// Sending half of a [`QueueSource`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct KeySender {
    tx: Sender<KeyEvent>,
    shared: Arc<Shared>,
}

impl QueueSource {
    /// Spawns the worker thread and returns the source with its sender.
    pub fn spawn(cfg: QueueSourceConfig) -> Result<(Self, KeySender), SourceError> {
        let (tx, rx) = bounded::<KeyEvent>(cfg.capacity.max(1));
        let shared = Arc::new(Shared::default());

        let thread_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(cfg.thread_name)
            .spawn(move || worker_loop(&thread_shared, &rx))
            .map_err(|e| SourceError::Spawn {
                message: e.to_string(),
            })?;

        let sender = KeySender {
            tx,
            shared: Arc::clone(&shared),
        };
        Ok((Self { shared, worker }, sender))
    }

    /// Returns true until the worker thread has exited.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.worker.is_finished()
    }

    /// Whether a registry is currently listening.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.shared.slot().is_some()
    }
}

impl InputSource for QueueSource {
    fn attach(&self, dispatcher: Dispatcher) {
        *self.shared.slot() = Some(dispatcher);
    }

    fn detach(&self) {
        self.shared.slot().take();
    }
}

impl KeySender {
    /// Queues an event without blocking. Returns false if it was dropped.
    pub fn send(&self, event: KeyEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                self.shared.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Whether the source is currently attached to a registry.
    ///
    /// Events sent while this is false are dropped by the worker.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.shared.slot().is_some()
    }

    /// Events handed to a dispatcher so far.
    #[must_use]
    pub fn delivered_events(&self) -> u64 {
        self.shared.delivered.load(Ordering::Relaxed)
    }

    /// Events dropped because the queue was full or the source was detached.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

fn worker_loop(shared: &Shared, rx: &Receiver<KeyEvent>) {
    tracing::debug!(target: "eggify::source", "input worker started");
    for event in rx {
        // Clone out so a handler that detaches the source does not deadlock.
        let dispatcher = shared.slot().clone();
        match dispatcher {
            Some(dispatcher) => {
                dispatcher.dispatch(&event);
                shared.delivered.fetch_add(1, Ordering::Relaxed);
            }
            None => {
                shared.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
    tracing::debug!(target: "eggify::source", "input worker stopped");
}
