//! Dispatcher: the owned, explicitly started shortcut listener.
//!
//! Events flow through the suppression policy, then the sequence matcher.
//! Every change to the pending chord or the enabled flag is pushed to
//! subscribers before the triggering call returns. When a sequence fires, the
//! matcher has already returned to Idle and subscribers have been told, so a
//! failing or panicking handler cannot leave a chord stuck in Pending.

use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::key::{format_sequence, KeyPress, KeyToken};
use super::matcher::{SequenceMatcher, Step, DEFAULT_PENDING_TIMEOUT};
use super::observer::{StateSnapshot, SubscriptionId, Subscribers};
use super::registry::{Category, Registry, RegistryError, ShortcutDefinition};
use super::suppression::{SuppressReason, SuppressionPolicy};
use super::timer::ExpiryTimer;

/// Slack added to the display deadline so the tick never clears a chord that
/// a key press at the same instant could still complete.
const EXPIRY_GRACE: Duration = Duration::from_millis(1);

/// Tunables for a [`Dispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherSettings {
    /// Window for completing a chord, from its first key
    pub pending_timeout: Duration,
    /// Clear a stale pending chord on a tick even without a further key
    pub display_expiry: bool,
    pub suppression: SuppressionPolicy,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            pending_timeout: DEFAULT_PENDING_TIMEOUT,
            display_expiry: true,
            suppression: SuppressionPolicy::default(),
        }
    }
}

/// What happened to one key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The dispatcher has not been started
    NotListening,
    /// Shortcuts are disabled
    Disabled,
    Suppressed(SuppressReason),
    /// Unbound key, nothing happened
    Ignored,
    /// A chord is waiting for more keys
    Pending,
    /// `esc` dropped the pending chord
    Cancelled,
    /// The key did not continue the pending chord
    Aborted,
    /// The handler at this registry index ran
    Fired { index: usize },
}

/// Per-session matching state, alive between `start` and `stop`.
#[derive(Debug)]
struct DispatcherState {
    matcher: SequenceMatcher,
    expiry: ExpiryTimer,
}

impl DispatcherState {
    fn new(timeout: Duration) -> Self {
        Self {
            matcher: SequenceMatcher::new(timeout),
            expiry: ExpiryTimer::new(),
        }
    }

    /// Drops the pending chord and its deadline. Returns true if one existed.
    fn clear(&mut self) -> bool {
        self.expiry.cancel();
        self.matcher.reset()
    }
}

/// Keyboard shortcut dispatcher.
#[derive(Debug)]
pub struct Dispatcher {
    settings: DispatcherSettings,
    registry: Registry,
    state: Option<DispatcherState>,
    enabled: bool,
    subscribers: Subscribers,
}

impl Dispatcher {
    /// Creates a stopped dispatcher with an empty registry.
    #[must_use]
    pub fn new(settings: DispatcherSettings) -> Self {
        Self {
            settings,
            registry: Registry::new(),
            state: None,
            enabled: true,
            subscribers: Subscribers::default(),
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }

    /// Begins listening. Starting twice is a no-op.
    pub fn start(&mut self) {
        if self.state.is_none() {
            info!(shortcuts = self.registry.len(), "shortcut dispatcher started");
            self.state = Some(DispatcherState::new(self.settings.pending_timeout));
        }
    }

    /// Stops listening and discards all matching state.
    pub fn stop(&mut self) {
        if let Some(mut state) = self.state.take() {
            info!("shortcut dispatcher stopped");
            if state.clear() {
                self.notify();
            }
        }
    }

    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.state.is_some()
    }

    /// Replaces the active shortcut set. On error the previous set stays
    /// active. On success any pending chord is dropped.
    pub fn register(&mut self, definitions: Vec<ShortcutDefinition>) -> Result<(), RegistryError> {
        self.registry.replace(definitions)?;
        info!(shortcuts = self.registry.len(), "shortcuts registered");
        if self.state.as_mut().is_some_and(DispatcherState::clear) {
            debug!("pending chord dropped by registry replacement");
            self.notify();
        }
        Ok(())
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turns shortcut handling on or off. Disabling drops any pending chord.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            if let Some(state) = self.state.as_mut() {
                state.clear();
            }
        }
        debug!(enabled, "shortcut dispatcher toggled");
        self.notify();
    }

    /// Processes one key press.
    ///
    /// A handler error is returned as-is; the dispatcher is already Idle by
    /// the time it surfaces.
    pub fn handle_event(&mut self, event: &KeyPress) -> Result<Outcome> {
        let Self {
            settings,
            registry,
            state,
            enabled,
            subscribers,
        } = self;

        let Some(state) = state.as_mut() else {
            return Ok(Outcome::NotListening);
        };
        if !*enabled {
            return Ok(Outcome::Disabled);
        }
        if let Some(reason) = settings.suppression.reason(event, registry) {
            debug!(key = %event.token, %reason, "key suppressed");
            return Ok(Outcome::Suppressed(reason));
        }

        let before = state.matcher.pending().len();
        let transition = state.matcher.advance(registry, &event.token, event.timestamp);
        if transition.expired {
            debug!(key = %event.token, "pending chord expired before this key");
        }

        // A timeout too large to represent as an Instant never expires.
        let deadline = state
            .matcher
            .started_at()
            .filter(|_| settings.display_expiry)
            .and_then(|started_at| started_at.checked_add(settings.pending_timeout))
            .and_then(|deadline| deadline.checked_add(EXPIRY_GRACE));
        match deadline {
            Some(deadline) => {
                state.expiry.arm(deadline);
            }
            None => {
                state.expiry.cancel();
            }
        }

        // Pending only ever grows by one key or collapses to empty, so a
        // length change or an expired restart covers every visible change.
        if before != state.matcher.pending().len() || transition.expired {
            subscribers.notify(&StateSnapshot {
                pending: state.matcher.pending().to_vec(),
                enabled: *enabled,
            });
        }

        let outcome = match transition.step {
            Step::Ignored => Outcome::Ignored,
            Step::Pending => {
                debug!(pending = %format_sequence(state.matcher.pending()), "chord pending");
                Outcome::Pending
            }
            Step::Cancelled => {
                debug!("chord cancelled");
                Outcome::Cancelled
            }
            Step::Aborted => {
                debug!(key = %event.token, "chord aborted");
                Outcome::Aborted
            }
            Step::Fired(index) => {
                if let Some(definition) = registry.get_mut(index) {
                    debug!(
                        keys = %definition.display_keys(),
                        description = definition.description(),
                        "shortcut fired"
                    );
                    definition.invoke()?;
                }
                Outcome::Fired { index }
            }
        };
        Ok(outcome)
    }

    /// Clears a pending chord whose window has passed. Call from the host
    /// loop; returns true if the visible state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if state.expiry.fire_due(now).is_none() || !state.matcher.is_expired(now) {
            return false;
        }
        state.matcher.reset();
        debug!("pending chord expired");
        self.notify();
        true
    }

    /// Next instant at which [`Dispatcher::tick`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.state.as_ref().and_then(|s| s.expiry.deadline())
    }

    /// Tokens matched so far toward a chord, empty when idle.
    #[must_use]
    pub fn pending(&self) -> &[KeyToken] {
        self.state
            .as_ref()
            .map(|s| s.matcher.pending())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            pending: self.pending().to_vec(),
            enabled: self.enabled,
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn definitions(&self) -> &[ShortcutDefinition] {
        self.registry.definitions()
    }

    #[must_use]
    pub fn by_category(&self) -> Vec<(Category, Vec<&ShortcutDefinition>)> {
        self.registry.by_category()
    }

    /// Registers a callback run synchronously whenever `pending` or
    /// `enabled` changes.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StateSnapshot) + 'static,
    {
        self.subscribers.subscribe(Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        self.subscribers.notify(&snapshot);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatcherSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::key::Target;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn counter_def(keys: &str, hits: &Rc<Cell<u32>>) -> ShortcutDefinition {
        let hits = Rc::clone(hits);
        ShortcutDefinition::parse(keys, keys, Category::Actions, move || {
            hits.set(hits.get() + 1);
            Ok(())
        })
        .unwrap()
    }

    fn press(key: &str, at: Instant) -> KeyPress {
        KeyPress::new(key.parse().unwrap(), Target::Document, at)
    }

    fn started(defs: Vec<ShortcutDefinition>) -> Dispatcher {
        let mut dispatcher = Dispatcher::default();
        dispatcher.register(defs).unwrap();
        dispatcher.start();
        dispatcher
    }

    #[test]
    fn test_not_listening_until_started() {
        let hits = Rc::new(Cell::new(0));
        let mut dispatcher = Dispatcher::default();
        dispatcher.register(vec![counter_def("?", &hits)]).unwrap();

        let t0 = Instant::now();
        assert_eq!(dispatcher.handle_event(&press("?", t0)).unwrap(), Outcome::NotListening);
        dispatcher.start();
        assert_eq!(
            dispatcher.handle_event(&press("?", t0)).unwrap(),
            Outcome::Fired { index: 0 }
        );
        dispatcher.stop();
        assert!(!dispatcher.is_listening());
        assert_eq!(dispatcher.handle_event(&press("?", t0)).unwrap(), Outcome::NotListening);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_disable_clears_pending_and_timer() {
        let hits = Rc::new(Cell::new(0));
        let mut dispatcher = started(vec![counter_def("g c", &hits)]);
        let t0 = Instant::now();

        dispatcher.handle_event(&press("g", t0)).unwrap();
        assert_eq!(dispatcher.pending().len(), 1);
        assert!(dispatcher.next_deadline().is_some());

        dispatcher.set_enabled(false);
        assert!(dispatcher.pending().is_empty());
        assert!(dispatcher.next_deadline().is_none());
        assert_eq!(dispatcher.handle_event(&press("c", t0)).unwrap(), Outcome::Disabled);

        dispatcher.set_enabled(true);
        assert_eq!(dispatcher.handle_event(&press("c", t0)).unwrap(), Outcome::Ignored);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_handler_error_leaves_idle() {
        let failing = ShortcutDefinition::parse("g c", "Fails", Category::Actions, || {
            anyhow::bail!("handler failed")
        })
        .unwrap();
        let mut dispatcher = started(vec![failing]);
        let t0 = Instant::now();

        dispatcher.handle_event(&press("g", t0)).unwrap();
        let err = dispatcher.handle_event(&press("c", t0)).unwrap_err();
        assert_eq!(err.to_string(), "handler failed");
        assert!(dispatcher.pending().is_empty());
        assert!(dispatcher.next_deadline().is_none());

        // The chord still works afterwards
        assert_eq!(dispatcher.handle_event(&press("g", t0)).unwrap(), Outcome::Pending);
    }

    #[test]
    fn test_subscribers_see_changes_synchronously() {
        let hits = Rc::new(Cell::new(0));
        let mut dispatcher = started(vec![counter_def("g c", &hits), counter_def("?", &hits)]);
        let seen: Rc<RefCell<Vec<StateSnapshot>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        dispatcher.subscribe(move |s| sink.borrow_mut().push(s.clone()));
        let t0 = Instant::now();

        dispatcher.handle_event(&press("g", t0)).unwrap();
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].pending, vec!["g".parse::<KeyToken>().unwrap()]);

        dispatcher.handle_event(&press("c", t0)).unwrap();
        assert_eq!(seen.borrow().len(), 2);
        assert!(seen.borrow()[1].pending.is_empty());

        // Idle to idle: nothing visible changed
        dispatcher.handle_event(&press("?", t0)).unwrap();
        assert_eq!(seen.borrow().len(), 2);

        dispatcher.set_enabled(false);
        assert_eq!(seen.borrow().len(), 3);
        assert!(!seen.borrow()[2].enabled);
    }

    #[test]
    fn test_tick_clears_expired_display_state() {
        let hits = Rc::new(Cell::new(0));
        let mut dispatcher = started(vec![counter_def("g c", &hits)]);
        let t0 = Instant::now();
        let timeout = dispatcher.settings().pending_timeout;

        dispatcher.handle_event(&press("g", t0)).unwrap();
        let deadline = dispatcher.next_deadline().unwrap();
        assert!(deadline > t0 + timeout);

        assert!(!dispatcher.tick(t0 + timeout));
        assert_eq!(dispatcher.pending().len(), 1);
        assert!(dispatcher.tick(deadline));
        assert!(dispatcher.pending().is_empty());
        assert!(dispatcher.next_deadline().is_none());
    }

    #[test]
    fn test_no_timer_without_display_expiry() {
        let hits = Rc::new(Cell::new(0));
        let mut dispatcher = Dispatcher::new(DispatcherSettings {
            display_expiry: false,
            ..DispatcherSettings::default()
        });
        dispatcher.register(vec![counter_def("g c", &hits)]).unwrap();
        dispatcher.start();

        dispatcher.handle_event(&press("g", Instant::now())).unwrap();
        assert!(dispatcher.next_deadline().is_none());
        assert_eq!(dispatcher.pending().len(), 1);
    }

    #[test]
    fn test_unrepresentable_timeout_never_expires() {
        let hits = Rc::new(Cell::new(0));
        let mut dispatcher = Dispatcher::new(DispatcherSettings {
            pending_timeout: Duration::MAX,
            ..DispatcherSettings::default()
        });
        dispatcher.register(vec![counter_def("g c", &hits)]).unwrap();
        dispatcher.start();
        let t0 = Instant::now();

        assert_eq!(dispatcher.handle_event(&press("g", t0)).unwrap(), Outcome::Pending);
        assert!(dispatcher.next_deadline().is_none());
        assert_eq!(
            dispatcher
                .handle_event(&press("c", t0 + Duration::from_secs(3600)))
                .unwrap(),
            Outcome::Fired { index: 0 }
        );
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_stop_discards_pending() {
        let hits = Rc::new(Cell::new(0));
        let mut dispatcher = started(vec![counter_def("g c", &hits)]);
        let t0 = Instant::now();
        dispatcher.handle_event(&press("g", t0)).unwrap();

        dispatcher.stop();
        assert!(dispatcher.pending().is_empty());
        dispatcher.start();
        assert_eq!(dispatcher.handle_event(&press("c", t0)).unwrap(), Outcome::Ignored);
    }
}
