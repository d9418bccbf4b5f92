//! Keyboard input events consumed by the dispatcher.
//!
//! The shape mirrors a DOM `keydown` event reduced to what sequence matching
//! needs: the physical code, the produced key value (fallback only), the
//! repeat flag, a timestamp and a description of the focused element.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::key::KeyCode;

/// Description of the element that had focus when the key was pressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTarget {
    /// Element tag name, e.g. `"input"` or `"DIV"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    /// Whether the element has editable content.
    #[serde(default)]
    pub content_editable: bool,
}

impl EventTarget {
    /// A target with the given tag name.
    #[must_use]
    pub fn element(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: Some(tag_name.into()),
            content_editable: false,
        }
    }

    /// A contenteditable target.
    #[must_use]
    pub fn editable() -> Self {
        Self {
            tag_name: None,
            content_editable: true,
        }
    }

    /// Returns true for `input` and `textarea` elements.
    #[must_use]
    pub fn is_text_entry(&self) -> bool {
        self.tag_name.as_deref().is_some_and(|tag| {
            tag.eq_ignore_ascii_case("input") || tag.eq_ignore_ascii_case("textarea")
        })
    }

    /// Returns true if key presses on this target are text entry.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.is_text_entry() || self.content_editable
    }
}

/// A single key-press notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Physical key code (`KeyboardEvent.code`). Preferred for matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Produced key value (`KeyboardEvent.key`). Used only when `code` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Auto-repeat from a held key.
    #[serde(default)]
    pub repeat: bool,
    /// When the key was pressed. Dispatch stamps the current time if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Element that had focus, if known. Unknown targets are not editable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<EventTarget>,
}

impl KeyEvent {
    /// An event for the given physical code.
    #[must_use]
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// An event carrying only a key value, as older input backends report.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Sets the timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Marks the event as an auto-repeat.
    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Sets the focused element.
    #[must_use]
    pub fn on(mut self, target: EventTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Returns true if the focused element is a text-entry or editable element.
    #[must_use]
    pub fn targets_editable(&self) -> bool {
        self.target.as_ref().is_some_and(EventTarget::is_editable)
    }

    /// The canonical code used for matching.
    ///
    /// Prefers `code`; when absent or empty, guesses from `key` (space bar
    /// becomes `Space`, a single ASCII letter becomes `Key<upper>`, anything
    /// else is used as-is). `Numpad0`..`Numpad9` resolve to `Digit*`.
    #[must_use]
    pub fn canonical_code(&self) -> KeyCode {
        let raw = match self.code.as_deref() {
            Some(code) if !code.is_empty() => KeyCode::new(code),
            _ => self.guess_code(),
        };
        raw.match_form()
    }

    fn guess_code(&self) -> KeyCode {
        let Some(key) = self.key.as_deref().filter(|k| !k.is_empty()) else {
            return KeyCode::new(KeyCode::UNIDENTIFIED);
        };
        if key == " " {
            return KeyCode::new("Space");
        }
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                KeyCode::new(format!("Key{}", c.to_ascii_uppercase()))
            }
            _ => KeyCode::new(key),
        }
    }
}
