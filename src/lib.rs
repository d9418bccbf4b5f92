//! # eggify - cheat codes for keyboard event streams
//!
//! eggify watches a stream of key presses for ordered sequences such as the
//! Konami code and runs a callback each time one is typed.
//!
//! ## Core Concepts
//!
//! - **Pattern**: an ordered list of canonical key codes (`ArrowUp`, `KeyB`,
//!   `Digit3`), normalized from a token list, a word string or a character string
//! - **Registry**: the store of live registrations; attaches its input source
//!   only while at least one registration exists
//! - **Subscription**: handle for one registration, with `unsubscribe()`
//! - **InputSource**: the shared keyboard subscription that feeds events in
//!
//! Matching tolerates modifier presses, ignores auto-repeat and key presses in
//! text fields by default, and can reset progress after a period of inactivity.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! use eggify::{KeyEvent, ManualSource, MatchOptions, Registry};
//!
//! let source = ManualSource::new();
//! let registry = Registry::new(source.clone());
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&hits);
//! let konami = registry.register(
//!     "up up down down left right left right b a",
//!     move |_event| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     },
//!     MatchOptions::default().with_max_key_delay_ms(2_000),
//! );
//!
//! for code in [
//!     "ArrowUp", "ArrowUp", "ArrowDown", "ArrowDown", "ArrowLeft",
//!     "ArrowRight", "ArrowLeft", "ArrowRight", "KeyB", "KeyA",
//! ] {
//!     source.deliver(&KeyEvent::code(code));
//! }
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//!
//! konami.unsubscribe();
//! assert!(!registry.is_listening());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cancel;
pub mod error;
pub mod event;
pub mod global;
pub mod key;
pub mod options;
pub mod pattern;
pub mod registry;
pub mod sink;
pub mod source;

// Re-export primary types at crate root for convenience
pub use cancel::{CallbackId, CancelSignal};
pub use error::{ConfigError, DispatchError, EggifyError, EggifyResult, SourceError};
pub use event::{EventTarget, KeyEvent};
pub use key::KeyCode;
pub use options::MatchOptions;
pub use pattern::{to_code, LexMode, Pattern, PatternSpec};
pub use registry::{
    Dispatcher, HandlerError, HandlerResult, Progress, Registry, Subscription, SubscriptionId,
    Transition,
};
pub use sink::{CollectSink, ErrorSink, LogSink};
pub use source::{InputSource, KeySender, ManualSource, QueueSource, QueueSourceConfig};
