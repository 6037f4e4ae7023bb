//! Key tokens and key-press events.
//!
//! A [`KeyToken`] is the normalized identity of a single key press: a crossterm
//! key code plus the modifiers that matter for matching. Shift is folded into
//! printable characters, so `?` and `G` never carry a shift flag, and
//! `shift+tab` collapses into `backtab`. Other named keys keep shift, so
//! `shift+up` and `up` are different tokens.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;

/// Modifiers that survive normalization.
const MATCHED_MODIFIERS: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT)
    .union(KeyModifiers::SUPER)
    .union(KeyModifiers::META);

/// Errors produced while parsing a key token or sequence from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("key sequence is empty")]
    Empty,
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),
}

/// A normalized single key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyToken {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyToken {
    /// Creates a normalized token.
    #[must_use]
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let shifted = modifiers.contains(KeyModifiers::SHIFT);
        let (code, modifiers) = match code {
            KeyCode::Tab if shifted => (KeyCode::BackTab, modifiers.difference(KeyModifiers::SHIFT)),
            KeyCode::BackTab => (code, modifiers.difference(KeyModifiers::SHIFT)),
            KeyCode::Char(c) if shifted => (
                KeyCode::Char(c.to_ascii_uppercase()),
                modifiers.difference(KeyModifiers::SHIFT),
            ),
            other => (other, modifiers),
        };
        Self {
            code,
            modifiers: modifiers & MATCHED_MODIFIERS,
        }
    }

    /// Token for a plain character with no modifiers.
    #[must_use]
    pub fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    /// The universal cancel key.
    #[must_use]
    pub const fn esc() -> Self {
        Self {
            code: KeyCode::Esc,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Builds a token from a crossterm event.
    #[must_use]
    pub fn from_event(event: &KeyEvent) -> Self {
        Self::new(event.code, event.modifiers)
    }

    #[must_use]
    pub const fn code(&self) -> KeyCode {
        self.code
    }

    #[must_use]
    pub const fn modifiers(&self) -> KeyModifiers {
        self.modifiers
    }

    /// True when the token carries any modifier, including shift on a named key.
    #[must_use]
    pub fn has_modifiers(&self) -> bool {
        !self.modifiers.is_empty()
    }

    /// True for a bare `esc`, which always cancels a pending chord.
    #[must_use]
    pub fn is_cancel(&self) -> bool {
        *self == Self::esc()
    }
}

fn code_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Esc => "esc",
        KeyCode::Enter => "enter",
        KeyCode::Tab => "tab",
        KeyCode::BackTab => "backtab",
        KeyCode::Backspace => "backspace",
        KeyCode::Delete => "delete",
        KeyCode::Insert => "insert",
        KeyCode::Up => "up",
        KeyCode::Down => "down",
        KeyCode::Left => "left",
        KeyCode::Right => "right",
        KeyCode::Home => "home",
        KeyCode::End => "end",
        KeyCode::PageUp => "pageup",
        KeyCode::PageDown => "pagedown",
        KeyCode::Char(' ') => "space",
        KeyCode::Char(c) => return Some(c.to_string()),
        KeyCode::F(n) => return Some(format!("f{n}")),
        _ => return None,
    };
    Some(name.to_string())
}

fn parse_code(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    let code = match name.to_ascii_lowercase().as_str() {
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        "plus" => KeyCode::Char('+'),
        other => {
            let n = other.strip_prefix('f')?.parse::<u8>().ok()?;
            if (1..=24).contains(&n) {
                KeyCode::F(n)
            } else {
                return None;
            }
        }
    };
    Some(code)
}

impl FromStr for KeyToken {
    type Err = KeyParseError;

    /// Parses `g`, `?`, `esc`, `ctrl+s`, `shift+tab` and friends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyParseError::Empty);
        }
        // A lone "+" is the plus key, not a separator.
        if s == "+" {
            return Ok(Self::char('+'));
        }

        let mut parts: Vec<&str> = s.split('+').collect();
        let key = parts.pop().unwrap_or_default();
        if key.is_empty() {
            return Err(KeyParseError::UnknownKey(s.to_string()));
        }

        let mut modifiers = KeyModifiers::NONE;
        for part in parts {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" | "opt" | "option" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                "super" | "cmd" | "win" => KeyModifiers::SUPER,
                "meta" => KeyModifiers::META,
                _ => return Err(KeyParseError::UnknownModifier(part.to_string())),
            };
        }

        let code = parse_code(key).ok_or_else(|| KeyParseError::UnknownKey(key.to_string()))?;
        Ok(Self::new(code, modifiers))
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SUPER) {
            f.write_str("super+")?;
        }
        if self.modifiers.contains(KeyModifiers::META) {
            f.write_str("meta+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            f.write_str("shift+")?;
        }
        if self.code == KeyCode::Char('+') && self.has_modifiers() {
            return f.write_str("plus");
        }
        match code_name(self.code) {
            Some(name) => f.write_str(&name),
            None => write!(f, "{:?}", self.code),
        }
    }
}

impl Serialize for KeyToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a whitespace-separated key sequence such as `"g c"`.
pub fn parse_sequence(s: &str) -> Result<Vec<KeyToken>, KeyParseError> {
    let tokens = s
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<Vec<KeyToken>, _>>()?;
    if tokens.is_empty() {
        return Err(KeyParseError::Empty);
    }
    Ok(tokens)
}

/// Formats a sequence for humans: `g then c`.
#[must_use]
pub fn format_sequence(tokens: &[KeyToken]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" then ")
}

/// What has focus when a key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// No editable control has focus
    #[default]
    Document,
    /// Single-line text input
    TextInput,
    /// Multi-line text area
    TextArea,
    /// Free-form editable region
    ContentEditable,
}

impl Target {
    /// True for controls where keystrokes are ordinary typing.
    #[must_use]
    pub const fn is_text_editable(self) -> bool {
        matches!(self, Self::TextInput | Self::TextArea | Self::ContentEditable)
    }
}

/// A normalized key-press event delivered to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub token: KeyToken,
    pub target: Target,
    pub timestamp: Instant,
}

impl KeyPress {
    #[must_use]
    pub const fn new(token: KeyToken, target: Target, timestamp: Instant) -> Self {
        Self {
            token,
            target,
            timestamp,
        }
    }

    /// Converts a crossterm event. Release events are dropped.
    #[must_use]
    pub fn from_crossterm(event: &KeyEvent, target: Target, timestamp: Instant) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        Some(Self::new(KeyToken::from_event(event), target, timestamp))
    }
}
