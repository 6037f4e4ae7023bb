//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{APP_DIR_NAME, CONFIG_DIR_ENV};
use crate::shortcuts::{DispatcherSettings, SuppressionPolicy, DEFAULT_PENDING_TIMEOUT};

/// Accepted range for the chord timeout, in milliseconds.
const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 50..=10_000;

/// Accepted range for the UI tick rate, in milliseconds.
const TICK_RATE_RANGE_MS: std::ops::RangeInclusive<u64> = 10..=1_000;

/// Theme display mode preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Colors tuned for dark terminal backgrounds
    #[default]
    Dark,
    /// Colors tuned for light terminal backgrounds
    Light,
}

/// Shortcut matching settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Time allowed to complete a chord, measured from its first key
    #[serde(default = "default_pending_timeout_ms")]
    pub pending_timeout_ms: u64,
    /// Clear the pending-chord indicator once the timeout passes, even
    /// without another key press
    #[serde(default = "default_true")]
    pub display_expiry: bool,
}

fn default_pending_timeout_ms() -> u64 {
    DEFAULT_PENDING_TIMEOUT.as_millis() as u64
}

const fn default_true() -> bool {
    true
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            pending_timeout_ms: default_pending_timeout_ms(),
            display_expiry: true,
        }
    }
}

/// Keymap source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeymapConfig {
    /// User keymap file replacing the built-in one
    pub path: Option<PathBuf>,
}

/// UI preferences configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Display help on startup
    #[serde(default)]
    pub show_help_on_startup: bool,
    /// Theme mode preference (Dark, Light)
    #[serde(default)]
    pub theme_mode: ThemeMode,
    /// Redraw interval when no input arrives
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

const fn default_tick_rate_ms() -> u64 {
    100
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_help_on_startup: false,
            theme_mode: ThemeMode::default(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/keychord/config.toml`
/// - macOS: `~/Library/Application Support/keychord/config.toml`
/// - Windows: `%APPDATA%\keychord\config.toml`
///
/// `KEYCHORD_CONFIG_DIR` overrides the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub suppression: SuppressionPolicy,
    #[serde(default)]
    pub keymap: KeymapConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Gets the path of the log file written by the binary.
    pub fn log_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("keychord.log"))
    }

    /// Loads configuration from the default config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from `path`, falling back to defaults if the file
    /// is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the default config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `path` using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, path).context(format!(
            "Failed to rename temp config file to: {}",
            path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - `pending_timeout_ms` is within 50..=10000
    /// - `tick_rate_ms` is within 10..=1000
    /// - keymap `path` exists (if set)
    pub fn validate(&self) -> Result<()> {
        if !TIMEOUT_RANGE_MS.contains(&self.dispatcher.pending_timeout_ms) {
            anyhow::bail!(
                "pending_timeout_ms must be between {} and {} (got {})",
                TIMEOUT_RANGE_MS.start(),
                TIMEOUT_RANGE_MS.end(),
                self.dispatcher.pending_timeout_ms
            );
        }

        if !TICK_RATE_RANGE_MS.contains(&self.ui.tick_rate_ms) {
            anyhow::bail!(
                "tick_rate_ms must be between {} and {} (got {})",
                TICK_RATE_RANGE_MS.start(),
                TICK_RATE_RANGE_MS.end(),
                self.ui.tick_rate_ms
            );
        }

        if let Some(path) = &self.keymap.path {
            if !path.exists() {
                anyhow::bail!("Keymap file not found: {}", path.display());
            }
        }

        Ok(())
    }

    /// Dispatcher settings derived from this configuration.
    #[must_use]
    pub fn dispatcher_settings(&self) -> DispatcherSettings {
        DispatcherSettings {
            pending_timeout: Duration::from_millis(self.dispatcher.pending_timeout_ms),
            display_expiry: self.dispatcher.display_expiry,
            suppression: self.suppression,
        }
    }

    /// UI redraw interval.
    #[must_use]
    pub const fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms)
    }
}
