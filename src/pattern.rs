//! Pattern specifications and normalization.
//!
//! A pattern can be given three ways:
//!
//! - an explicit token list (`["up", "up", "KeyB"]`), the unambiguous form;
//! - a word string (`"up up down down KeyB KeyA"`), split on whitespace;
//! - a character string (`"eggify"`), one token per character.
//!
//! Every token is then canonicalized by [`to_code`]. Plain `&str`/`String`
//! conversions pick words or characters by the presence of whitespace; use
//! [`PatternSpec::words`] or [`PatternSpec::chars`] to choose explicitly.

/// Per-token canonicalization rules.
pub mod canonical;
/// Convenience-string lexer.
pub mod lexer;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::key::KeyCode;

pub use canonical::{resolve, to_code, Rule, PRECEDENCE};
pub use lexer::{LexMode, Lexer};

/// A pattern as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum PatternSpec {
    /// Explicit token list; order preserved.
    Tokens(Vec<String>),
    /// Whitespace-separated words.
    Words(String),
    /// One token per character.
    Chars(String),
}

impl PatternSpec {
    /// Word-mode string.
    #[must_use]
    pub fn words(input: impl Into<String>) -> Self {
        Self::Words(input.into())
    }

    /// Character-mode string.
    #[must_use]
    pub fn chars(input: impl Into<String>) -> Self {
        Self::Chars(input.into())
    }

    /// Explicit token list.
    #[must_use]
    pub fn tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Tokens(tokens.into_iter().map(Into::into).collect())
    }

    /// String mode chosen by [`LexMode::infer`].
    #[must_use]
    pub fn infer(input: impl Into<String>) -> Self {
        let input = input.into();
        match LexMode::infer(&input) {
            LexMode::Words => Self::Words(input),
            LexMode::Chars => Self::Chars(input),
        }
    }

    /// Canonicalizes every token.
    #[must_use]
    pub fn normalize(&self) -> Pattern {
        let codes = match self {
            Self::Tokens(tokens) => tokens.iter().map(|t| to_code(t)).collect(),
            Self::Words(input) => Lexer::new(input, LexMode::Words).map(to_code).collect(),
            Self::Chars(input) => Lexer::new(input, LexMode::Chars).map(to_code).collect(),
        };
        Pattern(codes)
    }
}

impl From<&str> for PatternSpec {
    fn from(input: &str) -> Self {
        Self::infer(input)
    }
}

impl From<String> for PatternSpec {
    fn from(input: String) -> Self {
        Self::infer(input)
    }
}

impl From<Vec<String>> for PatternSpec {
    fn from(tokens: Vec<String>) -> Self {
        Self::Tokens(tokens)
    }
}

impl From<Vec<&str>> for PatternSpec {
    fn from(tokens: Vec<&str>) -> Self {
        Self::tokens(tokens)
    }
}

impl From<&[&str]> for PatternSpec {
    fn from(tokens: &[&str]) -> Self {
        Self::tokens(tokens.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for PatternSpec {
    fn from(tokens: [&str; N]) -> Self {
        Self::tokens(tokens)
    }
}

impl From<&Pattern> for PatternSpec {
    fn from(pattern: &Pattern) -> Self {
        Self::tokens(pattern.iter().map(KeyCode::as_str))
    }
}

impl From<Pattern> for PatternSpec {
    fn from(pattern: Pattern) -> Self {
        Self::Tokens(pattern.0.into_iter().map(KeyCode::into_string).collect())
    }
}

/// A normalized pattern: an ordered sequence of canonical key codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern(Vec<KeyCode>);

impl Pattern {
    /// Normalizes any accepted pattern specification.
    #[must_use]
    pub fn normalize(spec: impl Into<PatternSpec>) -> Self {
        spec.into().normalize()
    }

    /// Number of key codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a pattern that can never complete.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The code at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&KeyCode> {
        self.0.get(index)
    }

    /// The first code, if any.
    #[must_use]
    pub fn first(&self) -> Option<&KeyCode> {
        self.0.first()
    }

    /// Iterates the codes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, KeyCode> {
        self.0.iter()
    }

    /// The codes as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[KeyCode] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Pattern {
    type Item = &'a KeyCode;
    type IntoIter = std::slice::Iter<'a, KeyCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{code}")?;
        }
        Ok(())
    }
}
