//! Per-registration match options.
//!
//! | Option | Default | Effect |
//! |---|---|---|
//! | `ignore_editable` | `true` | skip events whose target is an input, textarea or editable element |
//! | `max_key_delay_ms` | unset | reset progress when consecutive matching keys are further apart |
//! | `allow_repeat` | `false` | let auto-repeat events take part in matching |
//! | `cancellation` | none | unsubscribe when the signal fires |
//!
//! Options can be built in code or loaded from JSON; missing fields always take
//! their defaults and are never an error at registration time.

use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::cancel::CancelSignal;
use crate::error::ConfigError;

/// Options fixed for the lifetime of one registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Skip events targeting text-entry or editable elements.
    #[serde(alias = "ignoreEditable")]
    pub ignore_editable: bool,
    /// Maximum gap between consecutive matching keys, in milliseconds.
    #[serde(alias = "maxKeyDelayMs", skip_serializing_if = "Option::is_none")]
    pub max_key_delay_ms: Option<u64>,
    /// Let auto-repeat events advance or reset progress.
    #[serde(alias = "allowRepeat")]
    pub allow_repeat: bool,
    /// Signal that removes the registration when fired.
    #[serde(skip)]
    pub cancellation: Option<CancelSignal>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            ignore_editable: true,
            max_key_delay_ms: None,
            allow_repeat: false,
            cancellation: None,
        }
    }
}

impl MatchOptions {
    /// Sets [`Self::ignore_editable`].
    #[must_use]
    pub fn with_ignore_editable(mut self, ignore: bool) -> Self {
        self.ignore_editable = ignore;
        self
    }

    /// Resets progress when consecutive matching keys are more than `ms` apart.
    #[must_use]
    pub fn with_max_key_delay_ms(mut self, ms: u64) -> Self {
        self.max_key_delay_ms = Some(ms);
        self
    }

    /// Like [`Self::with_max_key_delay_ms`], truncating to whole milliseconds.
    #[must_use]
    pub fn with_max_key_delay(self, delay: Duration) -> Self {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.with_max_key_delay_ms(ms)
    }

    /// Sets [`Self::allow_repeat`].
    #[must_use]
    pub fn with_allow_repeat(mut self, allow: bool) -> Self {
        self.allow_repeat = allow;
        self
    }

    /// Unsubscribes the registration when `signal` fires.
    #[must_use]
    pub fn with_cancellation(mut self, signal: CancelSignal) -> Self {
        self.cancellation = Some(signal);
        self
    }

    /// The inactivity limit as a time delta.
    ///
    /// Limits too large to represent are treated as no limit.
    #[must_use]
    pub fn max_key_delay(&self) -> Option<TimeDelta> {
        self.max_key_delay_ms
            .and_then(|ms| i64::try_from(ms).ok())
            .and_then(TimeDelta::try_milliseconds)
    }

    /// Parses options from JSON. Missing fields take their defaults and
    /// unknown fields are ignored.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Serializes the options, without the cancellation signal.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}
