//! Convenience-string lexer.
//!
//! Splits a pattern string into raw tokens in one of two modes. Tokens are
//! borrowed slices of the input; canonicalization happens afterwards.

use serde::{Deserialize, Serialize};

/// How a convenience string is split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LexMode {
    /// Whitespace-separated words: `"up up down down KeyB KeyA"`.
    Words,
    /// Every character is its own token: `"eggify"`.
    Chars,
}

impl LexMode {
    /// `Words` if the input contains any whitespace, otherwise `Chars`.
    #[must_use]
    pub fn infer(input: &str) -> Self {
        if input.chars().any(char::is_whitespace) {
            Self::Words
        } else {
            Self::Chars
        }
    }
}

/// Iterator over the raw tokens of a convenience string.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    rest: &'a str,
    mode: LexMode,
}

impl<'a> Lexer<'a> {
    /// A lexer over `input`.
    #[must_use]
    pub fn new(input: &'a str, mode: LexMode) -> Self {
        Self { rest: input, mode }
    }

    /// The mode this lexer splits in.
    #[must_use]
    pub const fn mode(&self) -> LexMode {
        self.mode
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        match self.mode {
            LexMode::Chars => {
                let c = self.rest.chars().next()?;
                let (token, rest) = self.rest.split_at(c.len_utf8());
                self.rest = rest;
                Some(token)
            }
            LexMode::Words => {
                let trimmed = self.rest.trim_start();
                if trimmed.is_empty() {
                    self.rest = trimmed;
                    return None;
                }
                let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
                let (token, rest) = trimmed.split_at(end);
                self.rest = rest;
                Some(token)
            }
        }
    }
}
