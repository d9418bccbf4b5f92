//! Per-token canonicalization.
//!
//! A token is resolved by the first [`Rule`] in [`PRECEDENCE`] that accepts it.
//! The order matters: the canonical grammar is checked before the alias table
//! so that a token like `KeyA` is never shadowed by an alias, and the alias
//! table is checked before the single-character fallbacks.

use std::sync::OnceLock;

use regex::Regex;

use crate::key::KeyCode;

/// Case-insensitive (ASCII only) canonical code grammar.
const CANONICAL_GRAMMAR: &str = r"(?i-u)^(?:arrow(?P<arrow>up|down|left|right)|key(?P<key>[a-z])|digit(?P<digit>[0-9])|numpad(?P<numpad>[0-9])|(?P<named>escape|enter|space|tab|shiftleft|shiftright|controlleft|controlright|altleft|altright))$";

const NAMED_KEYS: [&str; 10] = [
    "Escape",
    "Enter",
    "Space",
    "Tab",
    "ShiftLeft",
    "ShiftRight",
    "ControlLeft",
    "ControlRight",
    "AltLeft",
    "AltRight",
];

const ARROWS: [&str; 4] = ["ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight"];

/// Alias table, looked up by exact token first and then lower-cased.
const ALIASES: [(&str, &str); 12] = [
    ("up", "ArrowUp"),
    ("down", "ArrowDown"),
    ("left", "ArrowLeft"),
    ("right", "ArrowRight"),
    ("↑", "ArrowUp"),
    ("↓", "ArrowDown"),
    ("←", "ArrowLeft"),
    ("→", "ArrowRight"),
    ("a", "KeyA"),
    ("b", "KeyB"),
    ("A", "KeyA"),
    ("B", "KeyB"),
];

/// One canonicalization rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Token already is a canonical code in some casing (`keya`, `ARROWUP`).
    CanonicalGrammar,
    /// Token is in the alias table (`up`, `↑`, `b`).
    Alias,
    /// Token is one ASCII letter; becomes `Key<upper>`.
    SingleLetter,
    /// Token is one ASCII digit; becomes `Digit<d>`.
    SingleDigit,
    /// Anything else is kept verbatim.
    Passthrough,
}

/// Rules in the order they are tried.
pub const PRECEDENCE: [Rule; 5] = [
    Rule::CanonicalGrammar,
    Rule::Alias,
    Rule::SingleLetter,
    Rule::SingleDigit,
    Rule::Passthrough,
];

fn grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(CANONICAL_GRAMMAR).expect("canonical key grammar is a valid regex")
    })
}

fn single_char(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn lookup_alias(token: &str) -> Option<&'static str> {
    let find = |t: &str| ALIASES.iter().find(|(alias, _)| *alias == t).map(|(_, code)| *code);
    find(token).or_else(|| find(&token.to_lowercase()))
}

fn canonicalize_grammar(token: &str) -> Option<KeyCode> {
    let caps = grammar().captures(token)?;
    if let Some(dir) = caps.name("arrow") {
        let dir = dir.as_str();
        return ARROWS
            .iter()
            .find(|a| a[5..].eq_ignore_ascii_case(dir))
            .map(|a| KeyCode::new(*a));
    }
    if let Some(letter) = caps.name("key") {
        return Some(KeyCode::new(format!("Key{}", letter.as_str().to_ascii_uppercase())));
    }
    if let Some(digit) = caps.name("digit") {
        return Some(KeyCode::new(format!("Digit{}", digit.as_str())));
    }
    if let Some(digit) = caps.name("numpad") {
        return Some(KeyCode::new(format!("Numpad{}", digit.as_str())));
    }
    let named = caps.name("named")?.as_str();
    NAMED_KEYS
        .iter()
        .find(|n| n.eq_ignore_ascii_case(named))
        .map(|n| KeyCode::new(*n))
}

impl Rule {
    /// Applies this rule alone; `None` if the rule does not accept the token.
    #[must_use]
    pub fn apply(self, token: &str) -> Option<KeyCode> {
        match self {
            Self::CanonicalGrammar => canonicalize_grammar(token),
            Self::Alias => lookup_alias(token).map(KeyCode::new),
            Self::SingleLetter => single_char(token)
                .filter(char::is_ascii_alphabetic)
                .map(|c| KeyCode::new(format!("Key{}", c.to_ascii_uppercase()))),
            Self::SingleDigit => single_char(token)
                .filter(char::is_ascii_digit)
                .map(|c| KeyCode::new(format!("Digit{c}"))),
            Self::Passthrough => Some(KeyCode::new(token)),
        }
    }
}

/// Resolves a token, returning the rule that accepted it.
#[must_use]
pub fn resolve(token: &str) -> (Rule, KeyCode) {
    PRECEDENCE
        .iter()
        .find_map(|rule| rule.apply(token).map(|code| (*rule, code)))
        .unwrap_or_else(|| (Rule::Passthrough, KeyCode::new(token)))
}

/// Canonicalizes one pattern token. Never fails; unknown tokens pass through.
#[must_use]
pub fn to_code(token: &str) -> KeyCode {
    resolve(token).1
}
