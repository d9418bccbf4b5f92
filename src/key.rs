//! Canonical key identifiers.
//!
//! A [`KeyCode`] names one physical key independent of shift or case state,
//! using the same vocabulary as DOM `KeyboardEvent.code` (`KeyA`, `Digit3`,
//! `ArrowUp`, `ShiftLeft`, ...). Tokens outside the vocabulary are kept
//! verbatim so that unrecognized keys still compare by exact string.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Modifier prefixes. Presses of these keys never move a sequence forward or back.
const MODIFIER_PREFIXES: [&str; 3] = ["Shift", "Control", "Alt"];

/// A canonical key identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(String);

impl KeyCode {
    /// Code reported when an event carries neither a code nor a key value.
    pub const UNIDENTIFIED: &'static str = "Unidentified";

    /// Wraps a code string without canonicalizing it.
    ///
    /// Use [`crate::pattern::to_code`] to canonicalize user-supplied tokens.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for `Shift*`, `Control*` and `Alt*` codes.
    #[must_use]
    pub fn is_modifier(&self) -> bool {
        MODIFIER_PREFIXES.iter().any(|p| self.0.starts_with(p))
    }

    /// The event code as seen by the matcher.
    ///
    /// `Numpad0`..`Numpad9` become the matching `Digit*` code; every other code
    /// is returned unchanged. Pattern codes are never passed through this.
    #[must_use]
    pub fn match_form(&self) -> KeyCode {
        match numpad_digit(&self.0) {
            Some(d) => Self(format!("Digit{d}")),
            None => self.clone(),
        }
    }

    /// Whether this event code satisfies `expected`, a pattern code.
    ///
    /// Only the event side is aliased: a `Numpad3` press satisfies `Digit3`,
    /// but a pattern code of `Numpad3` is never satisfied.
    #[must_use]
    pub fn satisfies(&self, expected: &KeyCode) -> bool {
        match numpad_digit(&self.0) {
            Some(d) => expected
                .0
                .strip_prefix("Digit")
                .is_some_and(|rest| rest.len() == 1 && rest.starts_with(d)),
            None => self.0 == expected.0,
        }
    }

    /// Consumes the code and returns the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

fn numpad_digit(code: &str) -> Option<char> {
    let rest = code.strip_prefix("Numpad")?;
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(d), None) if d.is_ascii_digit() => Some(d),
        _ => None,
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for KeyCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl AsRef<str> for KeyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for KeyCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for KeyCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for KeyCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
