//! Keyboard shortcut dispatching with multi-key chord support.
//!
//! - [`key`]: normalized key tokens and key-press events
//! - [`registry`]: shortcut definitions and prefix-aware lookup
//! - [`matcher`]: the Idle / Pending sequence state machine
//! - [`suppression`]: per-event drop rules (text fields, unbound modifiers)
//! - [`observer`]: state snapshots pushed to subscribers
//! - [`timer`]: cancellable deadline for clearing a stale chord from display
//! - [`dispatcher`]: the owned listener tying the pieces together
//! - [`action`]: application actions bound by the keymap
//!
//! # Example
//!
//! ```
//! use keychord::shortcuts::{Category, Dispatcher, KeyPress, Outcome, ShortcutDefinition, Target};
//! use std::time::Instant;
//!
//! let mut dispatcher = Dispatcher::default();
//! dispatcher
//!     .register(vec![ShortcutDefinition::parse(
//!         "g c",
//!         "Go to checklist",
//!         Category::Navigation,
//!         || Ok(()),
//!     )
//!     .unwrap()])
//!     .unwrap();
//! dispatcher.start();
//!
//! let now = Instant::now();
//! let g = KeyPress::new("g".parse().unwrap(), Target::Document, now);
//! let c = KeyPress::new("c".parse().unwrap(), Target::Document, now);
//! assert_eq!(dispatcher.handle_event(&g).unwrap(), Outcome::Pending);
//! assert_eq!(dispatcher.handle_event(&c).unwrap(), Outcome::Fired { index: 0 });
//! ```

pub mod action;
pub mod dispatcher;
pub mod key;
pub mod matcher;
pub mod observer;
pub mod registry;
pub mod suppression;
pub mod timer;

pub use action::Action;
pub use dispatcher::{Dispatcher, DispatcherSettings, Outcome};
pub use key::{format_sequence, parse_sequence, KeyParseError, KeyPress, KeyToken, Target};
pub use matcher::{MatchState, SequenceMatcher, Step, Transition, DEFAULT_PENDING_TIMEOUT};
pub use observer::{StateSnapshot, SubscriptionId};
pub use registry::{
    Category, Handler, Lookup, Registry, RegistryError, Shadowed, ShortcutDefinition,
};
pub use suppression::{SuppressReason, SuppressionPolicy};
pub use timer::{ExpiryTimer, TimerHandle};
