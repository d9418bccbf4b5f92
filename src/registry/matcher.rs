//! Per-registration sequence matching.
//!
//! [`Progress`] is the state machine for one registration: a cursor into the
//! pattern plus the timestamp of the last key that moved it. Each call to
//! [`Progress::step`] applies exactly one transition.

use chrono::{DateTime, TimeDelta, Utc};

use crate::key::KeyCode;
use crate::pattern::Pattern;

/// Outcome of feeding one key to a [`Progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Modifier key; progress untouched.
    Ignored,
    /// Key matched the expected position; sequence not yet complete.
    Advanced,
    /// Mismatch that equals the first key; progress is now 1.
    Restarted,
    /// Mismatch; progress is now 0.
    Reset,
    /// Last key of the pattern matched; progress is back to 0.
    Completed,
}

/// Match progress for one pattern.
///
/// `cursor` is in `0..pattern.len()` between steps, and `last_match` is `None`
/// whenever `cursor` is 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    cursor: usize,
    last_match: Option<DateTime<Utc>>,
}

impl Progress {
    /// Progress at the start of the pattern.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys matched in the current attempt.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Time of the most recent key that moved the cursor forward.
    #[must_use]
    pub const fn last_match(&self) -> Option<DateTime<Utc>> {
        self.last_match
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.last_match = None;
    }

    /// Feeds one key.
    ///
    /// `code` is the event's code; see [`KeyCode::satisfies`] for how it is
    /// compared against pattern codes. When `max_delay` is set and more than
    /// that has passed since the last matching key, progress is cleared before
    /// `code` is considered. A gap of exactly `max_delay` keeps progress.
    /// Restart after a mismatch only looks back one key: the cursor becomes 1
    /// if `code` satisfies the first pattern key, otherwise 0.
    pub fn step(
        &mut self,
        pattern: &Pattern,
        code: &KeyCode,
        now: DateTime<Utc>,
        max_delay: Option<TimeDelta>,
    ) -> Transition {
        if let (Some(limit), Some(last)) = (max_delay, self.last_match) {
            if now - last > limit {
                self.reset();
            }
        }

        if pattern.get(self.cursor).is_some_and(|expected| code.satisfies(expected)) {
            self.cursor += 1;
            self.last_match = Some(now);
            if self.cursor == pattern.len() {
                self.reset();
                return Transition::Completed;
            }
            return Transition::Advanced;
        }

        if code.is_modifier() {
            return Transition::Ignored;
        }

        if pattern.first().is_some_and(|first| code.satisfies(first)) {
            self.cursor = 1;
            self.last_match = Some(now);
            Transition::Restarted
        } else {
            self.reset();
            Transition::Reset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(ms)
    }

    fn feed(progress: &mut Progress, pattern: &Pattern, keys: &[&str]) -> Vec<Transition> {
        keys.iter()
            .map(|k| progress.step(pattern, &KeyCode::new(*k), t(0), None))
            .collect()
    }

    #[test]
    fn test_exact_sequence_completes_once() {
        let pattern = Pattern::normalize("KeyA KeyB KeyC");
        let mut p = Progress::new();
        let out = feed(&mut p, &pattern, &["KeyA", "KeyB", "KeyC"]);
        assert_eq!(out, vec![Transition::Advanced, Transition::Advanced, Transition::Completed]);
        assert_eq!(p, Progress::new());
    }

    #[test]
    fn test_completion_rearms() {
        let pattern = Pattern::normalize("KeyA KeyB");
        let mut p = Progress::new();
        let out = feed(&mut p, &pattern, &["KeyA", "KeyB", "KeyA", "KeyB"]);
        assert_eq!(out.iter().filter(|t| **t == Transition::Completed).count(), 2);
    }

    #[test]
    fn test_mismatch_resets() {
        let pattern = Pattern::normalize("KeyA KeyB KeyC");
        let mut p = Progress::new();
        feed(&mut p, &pattern, &["KeyA", "KeyB"]);
        assert_eq!(p.cursor(), 2);
        let out = feed(&mut p, &pattern, &["KeyZ"]);
        assert_eq!(out, vec![Transition::Reset]);
        assert_eq!(p.cursor(), 0);
        assert!(p.last_match().is_none());
    }

    #[test]
    fn test_mismatch_on_first_key_restarts_at_one() {
        let pattern = Pattern::normalize("KeyA KeyB KeyC");
        let mut p = Progress::new();
        feed(&mut p, &pattern, &["KeyA", "KeyB"]);
        let out = feed(&mut p, &pattern, &["KeyA"]);
        assert_eq!(out, vec![Transition::Restarted]);
        assert_eq!(p.cursor(), 1);
        assert!(p.last_match().is_some());
        assert_eq!(feed(&mut p, &pattern, &["KeyB", "KeyC"]).last(), Some(&Transition::Completed));
    }

    #[test]
    fn test_restart_only_looks_back_one_key() {
        // "A A B" fed "A A A B": the third A restarts at 1, not 2, so B resets.
        let pattern = Pattern::normalize("KeyA KeyA KeyB");
        let mut p = Progress::new();
        let out = feed(&mut p, &pattern, &["KeyA", "KeyA", "KeyA", "KeyB"]);
        assert_eq!(
            out,
            vec![Transition::Advanced, Transition::Advanced, Transition::Restarted, Transition::Reset]
        );
    }

    #[test]
    fn test_modifiers_are_transparent() {
        let pattern = Pattern::normalize("KeyA KeyB");
        let mut p = Progress::new();
        let out = feed(
            &mut p,
            &pattern,
            &["ShiftLeft", "KeyA", "ControlRight", "AltLeft", "ShiftRight", "KeyB"],
        );
        assert_eq!(
            out,
            vec![
                Transition::Ignored,
                Transition::Advanced,
                Transition::Ignored,
                Transition::Ignored,
                Transition::Ignored,
                Transition::Completed
            ]
        );
    }

    #[test]
    fn test_modifier_in_pattern_matches_before_being_ignored() {
        let pattern = Pattern::normalize("ShiftLeft KeyA");
        let mut p = Progress::new();
        let out = feed(&mut p, &pattern, &["ShiftLeft", "KeyA"]);
        assert_eq!(out, vec![Transition::Advanced, Transition::Completed]);
    }

    #[test]
    fn test_inactivity_reset() {
        let pattern = Pattern::normalize("KeyA KeyB");
        let limit = Some(TimeDelta::milliseconds(500));
        let mut p = Progress::new();
        assert_eq!(p.step(&pattern, &KeyCode::new("KeyA"), t(0), limit), Transition::Advanced);
        // 501ms later: progress is cleared first, so B is a plain mismatch.
        assert_eq!(p.step(&pattern, &KeyCode::new("KeyB"), t(501), limit), Transition::Reset);

        assert_eq!(p.step(&pattern, &KeyCode::new("KeyA"), t(1000), limit), Transition::Advanced);
        assert_eq!(p.step(&pattern, &KeyCode::new("KeyB"), t(1500), limit), Transition::Completed);
    }

    #[test]
    fn test_inactivity_reset_then_first_key_advances() {
        let pattern = Pattern::normalize("KeyA KeyB");
        let limit = Some(TimeDelta::milliseconds(100));
        let mut p = Progress::new();
        p.step(&pattern, &KeyCode::new("KeyA"), t(0), limit);
        assert_eq!(p.step(&pattern, &KeyCode::new("KeyA"), t(200), limit), Transition::Advanced);
        assert_eq!(p.last_match(), Some(t(200)));
    }

    #[test]
    fn test_inactivity_reset_clears_timestamp_even_for_modifiers() {
        let pattern = Pattern::normalize("KeyA KeyB");
        let limit = Some(TimeDelta::milliseconds(100));
        let mut p = Progress::new();
        p.step(&pattern, &KeyCode::new("KeyA"), t(0), limit);
        assert_eq!(p.step(&pattern, &KeyCode::new("ShiftLeft"), t(200), limit), Transition::Ignored);
        assert_eq!(p, Progress::new());
    }

    #[test]
    fn test_no_limit_never_times_out() {
        let pattern = Pattern::normalize("KeyA KeyB");
        let mut p = Progress::new();
        p.step(&pattern, &KeyCode::new("KeyA"), t(0), None);
        assert_eq!(
            p.step(&pattern, &KeyCode::new("KeyB"), t(86_400_000), None),
            Transition::Completed
        );
    }

    #[test]
    fn test_numpad_events_satisfy_digit_patterns() {
        let digits = Pattern::normalize("1 2");
        let mut p = Progress::new();
        assert_eq!(
            feed(&mut p, &digits, &["Numpad1", "Numpad2"]).last(),
            Some(&Transition::Completed)
        );
    }

    #[test]
    fn test_numpad_pattern_never_completes() {
        let numpad = Pattern::normalize("Numpad1 Numpad2");
        assert_eq!(numpad.to_string(), "Numpad1 Numpad2");
        let mut p = Progress::new();
        let out = feed(&mut p, &numpad, &["Numpad1", "Numpad2", "Digit1", "Digit2"]);
        assert!(out.iter().all(|t| *t == Transition::Reset));
    }

    #[test]
    fn test_gap_equal_to_limit_keeps_progress() {
        let pattern = Pattern::normalize("KeyA KeyB KeyC");
        let limit = Some(TimeDelta::milliseconds(500));
        let mut p = Progress::new();
        assert_eq!(p.step(&pattern, &KeyCode::new("KeyA"), t(0), limit), Transition::Advanced);
        assert_eq!(p.step(&pattern, &KeyCode::new("KeyB"), t(500), limit), Transition::Advanced);
        assert_eq!(p.last_match(), Some(t(500)));
        assert_eq!(p.step(&pattern, &KeyCode::new("KeyC"), t(1000), limit), Transition::Completed);
    }

    #[test]
    fn test_empty_pattern_never_completes() {
        let pattern = Pattern::default();
        let mut p = Progress::new();
        let out = feed(&mut p, &pattern, &["KeyA", "ShiftLeft", ""]);
        assert_eq!(out, vec![Transition::Reset, Transition::Ignored, Transition::Reset]);
    }

    #[test]
    fn test_single_key_pattern() {
        let pattern = Pattern::normalize(["Escape"]);
        let mut p = Progress::new();
        let out = feed(&mut p, &pattern, &["Escape", "KeyQ", "Escape"]);
        assert_eq!(out, vec![Transition::Completed, Transition::Reset, Transition::Completed]);
    }
}
