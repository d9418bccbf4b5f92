//! Error types for eggify.
//!
//! Public registration and dispatch operations never fail. The types here
//! describe the failures that do exist: handler failures routed to an
//! [`ErrorSink`](crate::sink::ErrorSink), and the opt-in configuration,
//! input-source and global-install surfaces.

use thiserror::Error;

use crate::pattern::Pattern;
use crate::registry::SubscriptionId;

/// A handler failure captured by the dispatcher's isolation boundary.
///
/// These are never returned to callers; they are delivered to the registry's
/// error sink.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The handler returned `Err`.
    #[error("handler for {subscription_id} ({pattern}) failed: {message}")]
    HandlerFailed {
        /// Registration whose handler ran.
        subscription_id: SubscriptionId,
        /// The pattern that completed.
        pattern: Pattern,
        /// The returned error, rendered with `Display`.
        message: String,
    },

    /// The handler panicked.
    #[error("handler for {subscription_id} ({pattern}) panicked: {message}")]
    HandlerPanicked {
        /// Registration whose handler ran.
        subscription_id: SubscriptionId,
        /// The pattern that completed.
        pattern: Pattern,
        /// The panic payload if it was a string.
        message: String,
    },
}

impl DispatchError {
    /// The registration whose handler failed.
    #[must_use]
    pub const fn subscription_id(&self) -> SubscriptionId {
        match self {
            Self::HandlerFailed { subscription_id, .. }
            | Self::HandlerPanicked { subscription_id, .. } => *subscription_id,
        }
    }

    /// Returns true if the handler panicked rather than returning an error.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::HandlerPanicked { .. })
    }
}

/// Errors loading [`MatchOptions`](crate::options::MatchOptions) from
/// serialized configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The input was not valid options JSON.
    #[error("Failed to parse match options: {message}")]
    Parse {
        /// Parser diagnostic.
        message: String,
    },
}

/// Errors constructing an input source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The OS refused to start the worker thread.
    #[error("Failed to spawn input worker: {message}")]
    Spawn {
        /// OS error text.
        message: String,
    },
}

/// Top-level error type for eggify.
#[derive(Debug, Error)]
pub enum EggifyError {
    /// Handler failure.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Options could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input source could not be built.
    #[error("Input source error: {0}")]
    Source(#[from] SourceError),

    /// [`crate::global::install`] was called a second time.
    #[error("A global registry is already installed")]
    AlreadyInstalled,
}

impl EggifyError {
    /// Returns true if this is a handler failure.
    #[must_use]
    pub const fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is an input source error.
    #[must_use]
    pub const fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }
}

/// Result type alias for fallible eggify operations.
pub type EggifyResult<T> = Result<T, EggifyError>;
