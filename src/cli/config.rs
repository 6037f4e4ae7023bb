//! Configuration management CLI commands.

use crate::cli::common::{CliError, CliResult};
use crate::config::{Config, ThemeMode};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Print the configuration file path
    Path,
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Time allowed to finish a chord, in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Clear the pending chord indicator when the timeout passes
    #[arg(long, value_name = "BOOL")]
    display_expiry: Option<bool>,

    /// Theme mode (light or dark)
    #[arg(long, value_name = "MODE")]
    theme: Option<String>,

    /// Keymap file replacing the built-in keymap
    #[arg(long, value_name = "FILE")]
    keymap: Option<PathBuf>,
}

/// JSON-serializable configuration for output
#[derive(Serialize, Debug)]
struct ConfigOutput<'a> {
    path: String,
    #[serde(flatten)]
    config: &'a Config,
}

impl ConfigArgs {
    /// Execute config subcommand against the file at `config_path`
    pub fn execute(&self, config_path: &Path) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(config_path),
            ConfigCommand::Path => {
                println!("{}", config_path.display());
                Ok(())
            }
            ConfigCommand::Set(args) => args.execute(config_path),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self, config_path: &Path) -> CliResult<()> {
        let config = Config::load_from(config_path)
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        if self.json {
            let output = ConfigOutput {
                path: config_path.display().to_string(),
                config: &config,
            };
            let json = serde_json::to_string_pretty(&output).map_err(|e| {
                CliError::io(format!("Failed to serialize configuration to JSON: {e}"))
            })?;
            println!("{json}");
        } else {
            output_human_readable(&config, config_path);
        }

        Ok(())
    }
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self, config_path: &Path) -> CliResult<()> {
        if self.timeout_ms.is_none()
            && self.display_expiry.is_none()
            && self.theme.is_none()
            && self.keymap.is_none()
        {
            return Err(CliError::validation(
                "At least one configuration option must be specified: --timeout-ms, --display-expiry, --theme, or --keymap",
            ));
        }

        let mut config = Config::load_from(config_path)
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        if let Some(ms) = self.timeout_ms {
            config.dispatcher.pending_timeout_ms = ms;
        }

        if let Some(display_expiry) = self.display_expiry {
            config.dispatcher.display_expiry = display_expiry;
        }

        if let Some(theme_str) = &self.theme {
            config.ui.theme_mode = match theme_str.to_lowercase().as_str() {
                "light" => ThemeMode::Light,
                "dark" => ThemeMode::Dark,
                _ => {
                    return Err(CliError::validation(
                        "Invalid theme mode. Must be 'light' or 'dark'",
                    ))
                }
            };
        }

        if let Some(path) = &self.keymap {
            crate::keymap::Keymap::load_from(path)
                .and_then(|keymap| keymap.validate())
                .map_err(|e| CliError::validation(format!("Invalid keymap: {e}")))?;
            config.keymap.path = Some(path.clone());
        }

        config.validate().map_err(|e| CliError::validation(format!("{e:#}")))?;
        config
            .save_to(config_path)
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");

        Ok(())
    }
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config, config_path: &Path) {
    println!("Keychord Configuration");
    println!("======================");
    println!("File: {}", config_path.display());
    println!();

    println!("Dispatcher:");
    println!("  Chord Timeout: {} ms", config.dispatcher.pending_timeout_ms);
    println!("  Display Expiry: {}", config.dispatcher.display_expiry);
    println!();

    println!("Suppression:");
    println!("  Text Fields: {}", config.suppression.text_fields);
    println!("  Modifiers: {}", config.suppression.modifiers);
    println!();

    println!("Keymap:");
    if let Some(path) = &config.keymap.path {
        println!("  File: {}", path.display());
    } else {
        println!("  File: (built-in)");
    }
    println!();

    println!("UI:");
    println!(
        "  Theme Mode: {}",
        format!("{:?}", config.ui.theme_mode).to_lowercase()
    );
    println!("  Help On Startup: {}", config.ui.show_help_on_startup);
    println!("  Tick Rate: {} ms", config.ui.tick_rate_ms);
    println!();
}
