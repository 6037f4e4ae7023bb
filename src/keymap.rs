//! Keymap loading: the embedded default keymap and user keymap files.
//!
//! A keymap file is TOML with a `[meta]` table and a list of `[[bindings]]`.
//! Each binding names an [`Action`] by id and lists one or more key
//! sequences for it. Resolving a keymap turns every sequence into a
//! [`ShortcutDefinition`] whose handler queues the action.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

use crate::shortcuts::{
    format_sequence, parse_sequence, Action, Category, KeyParseError, KeyToken, Registry,
    RegistryError, Shadowed, ShortcutDefinition,
};

/// Embedded default keymap
const DEFAULT_KEYMAP: &str = include_str!("data/keymap.toml");

/// Errors from loading or resolving a keymap.
#[derive(Error, Debug)]
pub enum KeymapError {
    #[error("failed to read keymap {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse keymap: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("binding '{action}' has invalid keys '{keys}': {source}")]
    Key {
        action: String,
        keys: String,
        #[source]
        source: KeyParseError,
    },
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A binding as written in the keymap file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingEntry {
    /// Key sequences, each space-separated ("g c")
    pub keys: Vec<String>,
    /// Action id
    pub action: String,
    pub description: String,
    pub category: Category,
}

/// Metadata about the keymap file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapMeta {
    pub version: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct KeymapFile {
    meta: KeymapMeta,
    #[serde(default)]
    bindings: Vec<BindingEntry>,
}

/// One key sequence resolved to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBinding {
    pub sequence: Vec<KeyToken>,
    pub action: Action,
    pub description: String,
    pub category: Category,
}

impl ResolvedBinding {
    #[must_use]
    pub fn display_keys(&self) -> String {
        format_sequence(&self.sequence)
    }
}

/// A parsed keymap with every sequence normalized.
#[derive(Debug, Clone)]
pub struct Keymap {
    meta: KeymapMeta,
    bindings: Vec<ResolvedBinding>,
}

impl Keymap {
    /// Loads the embedded default keymap.
    pub fn load_default() -> Result<Self, KeymapError> {
        Self::parse(DEFAULT_KEYMAP)
    }

    /// Loads a keymap file from disk.
    pub fn load_from(path: &Path) -> Result<Self, KeymapError> {
        let content = fs::read_to_string(path).map_err(|source| KeymapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Loads `path` if given, the default keymap otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, KeymapError> {
        path.map_or_else(Self::load_default, Self::load_from)
    }

    /// Parses keymap TOML, resolving keys and action ids.
    pub fn parse(content: &str) -> Result<Self, KeymapError> {
        let file: KeymapFile = toml::from_str(content)?;

        let mut bindings = Vec::new();
        for entry in file.bindings {
            let action = Action::from_id(&entry.action)
                .ok_or_else(|| KeymapError::UnknownAction(entry.action.clone()))?;
            for keys in &entry.keys {
                let sequence = parse_sequence(keys).map_err(|source| KeymapError::Key {
                    action: entry.action.clone(),
                    keys: keys.clone(),
                    source,
                })?;
                bindings.push(ResolvedBinding {
                    sequence,
                    action,
                    description: entry.description.clone(),
                    category: entry.category,
                });
            }
        }

        Ok(Self {
            meta: file.meta,
            bindings,
        })
    }

    #[must_use]
    pub const fn meta(&self) -> &KeymapMeta {
        &self.meta
    }

    #[must_use]
    pub fn bindings(&self) -> &[ResolvedBinding] {
        &self.bindings
    }

    /// First sequence bound to `action`.
    #[must_use]
    pub fn sequence_for(&self, action: Action) -> Option<&[KeyToken]> {
        self.bindings
            .iter()
            .find(|b| b.action == action)
            .map(|b| b.sequence.as_slice())
    }

    /// Builds shortcut definitions, one per sequence, with handlers made by
    /// `make_handler`.
    pub fn definitions<F, H>(&self, mut make_handler: F) -> Vec<ShortcutDefinition>
    where
        F: FnMut(Action) -> H,
        H: FnMut() -> Result<()> + 'static,
    {
        self.bindings
            .iter()
            .map(|b| {
                ShortcutDefinition::new(
                    b.sequence.clone(),
                    b.description.clone(),
                    b.category,
                    make_handler(b.action),
                )
            })
            .collect()
    }

    /// Definitions whose handlers push their action onto `queue`.
    #[must_use]
    pub fn queued_definitions(&self, queue: &ActionQueue) -> Vec<ShortcutDefinition> {
        self.definitions(|action| queue.handler(action))
    }

    /// Checks the keymap would register cleanly and reports chords made
    /// unreachable by a shorter sequence.
    pub fn validate(&self) -> Result<Vec<(String, String)>, KeymapError> {
        let definitions = self.definitions(|_| || -> Result<()> { Ok(()) });
        let registry = Registry::from_definitions(definitions)?;
        Ok(registry
            .shadowed()
            .into_iter()
            .map(|Shadowed { chord, by }| {
                (
                    self.bindings[chord].display_keys(),
                    self.bindings[by].display_keys(),
                )
            })
            .collect())
    }
}

/// FIFO of actions fired by shortcut handlers, drained by the host app.
#[derive(Debug, Clone, Default)]
pub struct ActionQueue(Rc<RefCell<VecDeque<Action>>>);

impl ActionQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, action: Action) {
        self.0.borrow_mut().push_back(action);
    }

    /// Takes every queued action in firing order.
    #[must_use]
    pub fn drain(&self) -> Vec<Action> {
        self.0.borrow_mut().drain(..).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// A handler that queues `action` each time it runs.
    pub fn handler(&self, action: Action) -> impl FnMut() -> Result<()> + 'static {
        let queue = self.clone();
        move || {
            queue.push(action);
            Ok(())
        }
    }
}
