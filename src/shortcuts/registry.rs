//! Shortcut definitions and the registry that holds the active set.
//!
//! The registry keeps definitions in insertion order for display and two
//! indices for matching: exact sequences and every strict prefix of a
//! registered sequence. Replacing the set is all-or-nothing.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use super::key::{format_sequence, parse_sequence, KeyParseError, KeyToken};

/// Action run when a sequence fully matches.
pub type Handler = Box<dyn FnMut() -> Result<()>>;

/// Grouping tag used by the help display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Navigation,
    Actions,
    Views,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 3] = [Self::Navigation, Self::Actions, Self::Views];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::Actions => "actions",
            Self::Views => "views",
        }
    }

    /// Heading used by the help overlay.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Navigation => "NAVIGATION",
            Self::Actions => "ACTIONS",
            Self::Views => "VIEWS",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "navigation" => Ok(Self::Navigation),
            "actions" => Ok(Self::Actions),
            "views" => Ok(Self::Views),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// A single shortcut: key sequence, label, category and handler.
pub struct ShortcutDefinition {
    sequence: Vec<KeyToken>,
    description: String,
    category: Category,
    handler: Handler,
}

impl ShortcutDefinition {
    /// Creates a definition from already-normalized tokens.
    pub fn new<F>(
        sequence: Vec<KeyToken>,
        description: impl Into<String>,
        category: Category,
        handler: F,
    ) -> Self
    where
        F: FnMut() -> Result<()> + 'static,
    {
        Self {
            sequence,
            description: description.into(),
            category,
            handler: Box::new(handler),
        }
    }

    /// Creates a definition from a textual sequence such as `"g c"`.
    pub fn parse<F>(
        keys: &str,
        description: impl Into<String>,
        category: Category,
        handler: F,
    ) -> Result<Self, KeyParseError>
    where
        F: FnMut() -> Result<()> + 'static,
    {
        Ok(Self::new(parse_sequence(keys)?, description, category, handler))
    }

    #[must_use]
    pub fn sequence(&self) -> &[KeyToken] {
        &self.sequence
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// True for sequences of two or more keys.
    #[must_use]
    pub fn is_chord(&self) -> bool {
        self.sequence.len() > 1
    }

    /// Human-readable keys, e.g. `g then c`.
    #[must_use]
    pub fn display_keys(&self) -> String {
        format_sequence(&self.sequence)
    }

    /// True if this sequence begins with `prefix`.
    #[must_use]
    pub fn starts_with(&self, prefix: &[KeyToken]) -> bool {
        self.sequence.starts_with(prefix)
    }

    pub(crate) fn invoke(&mut self) -> Result<()> {
        (self.handler)()
    }
}

impl fmt::Debug for ShortcutDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutDefinition")
            .field("sequence", &self.display_keys())
            .field("description", &self.description)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// Rejections from [`Registry::replace`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate shortcut sequence '{sequence}' bound to both '{first}' and '{second}'")]
    DuplicateSequence {
        sequence: String,
        first: String,
        second: String,
    },
    #[error("shortcut '{description}' has an empty key sequence")]
    EmptySequence { description: String },
}

/// Result of matching a token prefix against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Nothing registered starts with these tokens
    NoMatch,
    /// Some sequence continues past these tokens, none equals them
    PartialMatch,
    /// Index of the definition whose sequence equals these tokens
    FullMatch(usize),
}

/// A chord that can never fire because a shorter registered sequence wins first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shadowed {
    /// Index of the unreachable chord
    pub chord: usize,
    /// Index of the shorter sequence that fires instead
    pub by: usize,
}

/// Ordered set of active shortcut definitions.
#[derive(Debug, Default)]
pub struct Registry {
    definitions: Vec<ShortcutDefinition>,
    exact: HashMap<Vec<KeyToken>, usize>,
    prefixes: HashSet<Vec<KeyToken>>,
    modified_tokens: HashSet<KeyToken>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry, rejecting empty or duplicate sequences.
    pub fn from_definitions(
        definitions: Vec<ShortcutDefinition>,
    ) -> Result<Self, RegistryError> {
        let mut exact: HashMap<Vec<KeyToken>, usize> = HashMap::new();
        let mut prefixes = HashSet::new();
        let mut modified_tokens = HashSet::new();

        for (index, def) in definitions.iter().enumerate() {
            if def.sequence.is_empty() {
                return Err(RegistryError::EmptySequence {
                    description: def.description.clone(),
                });
            }
            if let Some(&existing) = exact.get(def.sequence.as_slice()) {
                return Err(RegistryError::DuplicateSequence {
                    sequence: def.display_keys(),
                    first: definitions[existing].description.clone(),
                    second: def.description.clone(),
                });
            }
            exact.insert(def.sequence.clone(), index);
            for len in 1..def.sequence.len() {
                prefixes.insert(def.sequence[..len].to_vec());
            }
            modified_tokens.extend(def.sequence.iter().filter(|t| t.has_modifiers()).copied());
        }

        let registry = Self {
            definitions,
            exact,
            prefixes,
            modified_tokens,
        };

        for shadow in registry.shadowed() {
            warn!(
                chord = %registry.definitions[shadow.chord].display_keys(),
                by = %registry.definitions[shadow.by].display_keys(),
                "chord is unreachable: a shorter sequence fires first"
            );
        }

        Ok(registry)
    }

    /// Replaces the active set atomically. On error `self` is untouched.
    pub fn replace(&mut self, definitions: Vec<ShortcutDefinition>) -> Result<(), RegistryError> {
        *self = Self::from_definitions(definitions)?;
        Ok(())
    }

    /// Matches a token sequence. An exact match wins over a longer chord
    /// sharing the same prefix.
    #[must_use]
    pub fn lookup(&self, tokens: &[KeyToken]) -> Lookup {
        if let Some(&index) = self.exact.get(tokens) {
            Lookup::FullMatch(index)
        } else if self.prefixes.contains(tokens) {
            Lookup::PartialMatch
        } else {
            Lookup::NoMatch
        }
    }

    /// True if some registered sequence contains exactly this token.
    #[must_use]
    pub fn requires_modifiers(&self, token: &KeyToken) -> bool {
        self.modified_tokens.contains(token)
    }

    /// Definitions in registration order.
    #[must_use]
    pub fn definitions(&self) -> &[ShortcutDefinition] {
        &self.definitions
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ShortcutDefinition> {
        self.definitions.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut ShortcutDefinition> {
        self.definitions.get_mut(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions grouped by category, keeping registration order within
    /// each group. Empty groups are omitted.
    #[must_use]
    pub fn by_category(&self) -> Vec<(Category, Vec<&ShortcutDefinition>)> {
        Category::ALL
            .iter()
            .map(|&category| {
                let defs: Vec<&ShortcutDefinition> = self
                    .definitions
                    .iter()
                    .filter(|d| d.category == category)
                    .collect();
                (category, defs)
            })
            .filter(|(_, defs)| !defs.is_empty())
            .collect()
    }

    /// Chords made unreachable by a registered proper prefix.
    #[must_use]
    pub fn shadowed(&self) -> Vec<Shadowed> {
        let mut shadowed = Vec::new();
        for (chord, def) in self.definitions.iter().enumerate() {
            if let Some(by) = (1..def.sequence.len())
                .find_map(|len| self.exact.get(&def.sequence[..len]).copied())
            {
                shadowed.push(Shadowed { chord, by });
            }
        }
        shadowed
    }
}
