//! Sequence matcher: the Idle / Pending state machine.
//!
//! The matcher never reads a clock. Every call receives the event time, so
//! timeouts are checked lazily on the next key press and tests can drive it
//! with synthetic instants.

use std::time::{Duration, Instant};

use super::key::KeyToken;
use super::registry::{Lookup, Registry};

/// Default window for completing a chord, measured from its first key.
pub const DEFAULT_PENDING_TIMEOUT: Duration = Duration::from_millis(1000);

/// Matcher state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MatchState {
    #[default]
    Idle,
    Pending {
        tokens: Vec<KeyToken>,
        started_at: Instant,
    },
}

/// What a single key did to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Key matched nothing from Idle
    Ignored,
    /// Key started or extended a chord
    Pending,
    /// `esc` dropped a pending chord
    Cancelled,
    /// Key completed no valid continuation; chord dropped, key discarded
    Aborted,
    /// Sequence completed; index into the registry
    Fired(usize),
}

/// A step plus whether an expired prefix was discarded first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub step: Step,
    pub expired: bool,
}

impl Transition {
    const fn fresh(step: Step) -> Self {
        Self {
            step,
            expired: false,
        }
    }
}

/// Tracks the pending chord and advances it one key at a time.
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    state: MatchState,
    timeout: Duration,
}

impl SequenceMatcher {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: MatchState::Idle,
            timeout,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &MatchState {
        &self.state
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Tokens matched so far, empty when idle.
    #[must_use]
    pub fn pending(&self) -> &[KeyToken] {
        match &self.state {
            MatchState::Idle => &[],
            MatchState::Pending { tokens, .. } => tokens.as_slice(),
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, MatchState::Pending { .. })
    }

    /// Time of the first key of the pending chord.
    #[must_use]
    pub const fn started_at(&self) -> Option<Instant> {
        match &self.state {
            MatchState::Idle => None,
            MatchState::Pending { started_at, .. } => Some(*started_at),
        }
    }

    /// True if a pending chord has outlived the timeout at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.started_at()
            .is_some_and(|started_at| self.has_expired(started_at, now))
    }

    /// Drops any pending chord. Returns true if there was one.
    pub fn reset(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.state = MatchState::Idle;
        was_pending
    }

    fn has_expired(&self, started_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(started_at) > self.timeout
    }

    /// Feeds one key into the state machine.
    ///
    /// The new state is committed before returning, so the caller can run a
    /// fired handler without the matcher depending on its outcome.
    pub fn advance(&mut self, registry: &Registry, token: &KeyToken, now: Instant) -> Transition {
        match std::mem::take(&mut self.state) {
            MatchState::Idle => Transition::fresh(self.start(registry, token, now)),
            MatchState::Pending { .. } if token.is_cancel() => Transition::fresh(Step::Cancelled),
            MatchState::Pending { started_at, .. } if self.has_expired(started_at, now) => {
                // The stale prefix is discarded, the key starts over from Idle
                Transition {
                    step: self.start(registry, token, now),
                    expired: true,
                }
            }
            MatchState::Pending {
                mut tokens,
                started_at,
            } => {
                tokens.push(*token);
                let step = match registry.lookup(&tokens) {
                    Lookup::FullMatch(index) => Step::Fired(index),
                    Lookup::PartialMatch => {
                        self.state = MatchState::Pending { tokens, started_at };
                        Step::Pending
                    }
                    Lookup::NoMatch => Step::Aborted,
                };
                Transition::fresh(step)
            }
        }
    }

    fn start(&mut self, registry: &Registry, token: &KeyToken, now: Instant) -> Step {
        let tokens = vec![*token];
        match registry.lookup(&tokens) {
            Lookup::FullMatch(index) => Step::Fired(index),
            Lookup::PartialMatch => {
                self.state = MatchState::Pending {
                    tokens,
                    started_at: now,
                };
                Step::Pending
            }
            Lookup::NoMatch => Step::Ignored,
        }
    }
}

impl Default for SequenceMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_PENDING_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::key::parse_sequence;
    use crate::shortcuts::registry::{Category, ShortcutDefinition};

    fn registry(keys: &[&str]) -> Registry {
        let defs = keys
            .iter()
            .map(|k| ShortcutDefinition::parse(k, *k, Category::Actions, || Ok(())).unwrap())
            .collect();
        Registry::from_definitions(defs).unwrap()
    }

    fn key(s: &str) -> KeyToken {
        s.parse().unwrap()
    }

    #[test]
    fn test_idle_transitions() {
        let reg = registry(&["g c", "?"]);
        let mut matcher = SequenceMatcher::default();
        let t0 = Instant::now();

        assert_eq!(matcher.advance(&reg, &key("x"), t0).step, Step::Ignored);
        assert_eq!(*matcher.state(), MatchState::Idle);

        assert_eq!(matcher.advance(&reg, &key("?"), t0).step, Step::Fired(1));
        assert_eq!(*matcher.state(), MatchState::Idle);

        assert_eq!(matcher.advance(&reg, &key("g"), t0).step, Step::Pending);
        assert_eq!(
            *matcher.state(),
            MatchState::Pending {
                tokens: vec![key("g")],
                started_at: t0
            }
        );
    }

    #[test]
    fn test_chord_completes() {
        let reg = registry(&["g c"]);
        let mut matcher = SequenceMatcher::default();
        let t0 = Instant::now();

        matcher.advance(&reg, &key("g"), t0);
        let step = matcher.advance(&reg, &key("c"), t0 + Duration::from_millis(200)).step;
        assert_eq!(step, Step::Fired(0));
        assert!(!matcher.is_pending());
    }

    #[test]
    fn test_started_at_not_refreshed() {
        let reg = registry(&["a b c"]);
        let mut matcher = SequenceMatcher::new(Duration::from_millis(100));
        let t0 = Instant::now();

        matcher.advance(&reg, &key("a"), t0);
        matcher.advance(&reg, &key("b"), t0 + Duration::from_millis(90));
        assert_eq!(matcher.started_at(), Some(t0));
        assert_eq!(matcher.pending(), parse_sequence("a b").unwrap().as_slice());

        // 120ms after the first key: whole chord must fit in one window
        let transition = matcher.advance(&reg, &key("c"), t0 + Duration::from_millis(120));
        assert!(transition.expired);
        assert_eq!(transition.step, Step::Ignored);
        assert!(!matcher.is_pending());
    }

    #[test]
    fn test_timeout_boundary() {
        let reg = registry(&["g c"]);
        let timeout = Duration::from_millis(1000);
        let t0 = Instant::now();

        let mut matcher = SequenceMatcher::new(timeout);
        matcher.advance(&reg, &key("g"), t0);
        let late = matcher.advance(&reg, &key("c"), t0 + timeout + Duration::from_millis(1));
        assert!(late.expired);
        assert_eq!(late.step, Step::Ignored);

        let mut matcher = SequenceMatcher::new(timeout);
        matcher.advance(&reg, &key("g"), t0);
        let on_time = matcher.advance(&reg, &key("c"), t0 + timeout - Duration::from_millis(1));
        assert_eq!(on_time.step, Step::Fired(0));

        let mut matcher = SequenceMatcher::new(timeout);
        matcher.advance(&reg, &key("g"), t0);
        assert!(!matcher.is_expired(t0 + timeout));
        assert!(matcher.is_expired(t0 + timeout + Duration::from_millis(1)));
    }

    #[test]
    fn test_expired_prefix_reprocessed_from_idle() {
        let reg = registry(&["g c", "g g"]);
        let mut matcher = SequenceMatcher::new(Duration::from_millis(100));
        let t0 = Instant::now();

        matcher.advance(&reg, &key("g"), t0);
        let t1 = t0 + Duration::from_millis(500);
        let transition = matcher.advance(&reg, &key("g"), t1);

        // Not "g g": the old g expired and the new g starts a fresh chord
        assert!(transition.expired);
        assert_eq!(transition.step, Step::Pending);
        assert_eq!(matcher.started_at(), Some(t1));
        assert_eq!(matcher.pending(), &[key("g")]);
    }

    #[test]
    fn test_abort_discards_terminating_key() {
        let reg = registry(&["g c", "x"]);
        let mut matcher = SequenceMatcher::default();
        let t0 = Instant::now();

        matcher.advance(&reg, &key("g"), t0);
        // "x" is bound on its own but is not reprocessed after an aborted chord
        assert_eq!(matcher.advance(&reg, &key("x"), t0).step, Step::Aborted);
        assert!(!matcher.is_pending());
    }

    #[test]
    fn test_escape_cancels_even_when_prefix() {
        let reg = registry(&["esc esc", "g c"]);
        let mut matcher = SequenceMatcher::default();
        let t0 = Instant::now();

        matcher.advance(&reg, &key("g"), t0);
        assert_eq!(matcher.advance(&reg, &key("esc"), t0).step, Step::Cancelled);
        assert!(!matcher.is_pending());

        // From Idle, esc is an ordinary lookup and may start a chord
        assert_eq!(matcher.advance(&reg, &key("esc"), t0).step, Step::Pending);
        assert_eq!(matcher.advance(&reg, &key("esc"), t0).step, Step::Cancelled);
    }

    #[test]
    fn test_reset_reports_pending() {
        let reg = registry(&["g c"]);
        let mut matcher = SequenceMatcher::default();
        assert!(!matcher.reset());
        matcher.advance(&reg, &key("g"), Instant::now());
        assert!(matcher.reset());
        assert!(matcher.pending().is_empty());
    }
}
