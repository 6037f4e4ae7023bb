//! Keychord - keyboard shortcut dispatcher with multi-key chords
//!
//! Without a subcommand this runs the terminal application. The `keys` and
//! `config` subcommands work headless.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use keychord::cli::{ConfigArgs, KeysArgs};
use keychord::config::Config;
use keychord::constants::{APP_BINARY_NAME, APP_NAME, LOG_FILTER_ENV};
use keychord::keymap::Keymap;
use keychord::tui::{self, AppState, TerminalGuard};

/// Keychord - keyboard shortcut dispatcher with multi-key chords
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the active shortcuts or check a keymap file
    Keys(KeysArgs),
    /// Show or change configuration
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_file_path()?,
    };

    let Some(command) = cli.command else {
        return run_app(&config_path);
    };

    init_stderr_logging();
    let result = match &command {
        Command::Keys(args) => args.execute(&config_path),
        Command::Config(args) => args.execute(&config_path),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code.code());
    }

    Ok(())
}

/// Runs the terminal application.
fn run_app(config_path: &Path) -> Result<()> {
    // The TUI owns the screen, so logs go to a file
    if let Err(e) = init_file_logging() {
        eprintln!("Warning: logging disabled: {e:#}");
    }

    let config = Config::load_from(config_path)
        .with_context(|| format!("Failed to load config file: {}", config_path.display()))?;
    let keymap = Keymap::load(config.keymap.path.as_deref()).with_context(|| {
        format!("Failed to load keymap (check it with '{APP_BINARY_NAME} keys check <FILE>')")
    })?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        keymap = %keymap.meta().name,
        "{APP_NAME} starting"
    );

    let mut state = AppState::new(config, keymap)?;
    let mut guard = TerminalGuard::acquire()?;
    let result = tui::run_tui(&mut state, &mut guard);

    // Restore the terminal before any error is printed
    drop(guard);
    result
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| default.into())
}

fn init_file_logging() -> Result<()> {
    let path = Config::log_file_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(env_filter("warn"))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
