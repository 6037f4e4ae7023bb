//! Keymap listing and validation commands.

use crate::cli::common::{CliError, CliResult};
use crate::config::Config;
use crate::keymap::{Keymap, KeymapError, ResolvedBinding};
use crate::shortcuts::Category;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// List or check keyboard shortcuts
#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct KeysArgs {
    #[command(subcommand)]
    command: Option<KeysCommand>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Only list one category (navigation, actions, views)
    #[arg(long, value_name = "CATEGORY")]
    category: Option<Category>,
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Validate a keymap file
    Check(KeysCheckArgs),
}

/// Validate a keymap file
#[derive(Args, Debug)]
pub struct KeysCheckArgs {
    /// Keymap TOML file
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

#[derive(Serialize, Debug)]
struct KeymapOutput<'a> {
    name: &'a str,
    version: &'a str,
    categories: Vec<CategoryOutput<'a>>,
}

#[derive(Serialize, Debug)]
struct CategoryOutput<'a> {
    category: Category,
    shortcuts: Vec<ShortcutOutput<'a>>,
}

#[derive(Serialize, Debug)]
struct ShortcutOutput<'a> {
    keys: String,
    #[serde(flatten)]
    binding: &'a ResolvedBinding,
}

impl KeysArgs {
    /// Execute keys command against the config at `config_path`
    pub fn execute(&self, config_path: &Path) -> CliResult<()> {
        if let Some(KeysCommand::Check(args)) = &self.command {
            return args.execute();
        }

        let config = Config::load_from(config_path)
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;
        let keymap = Keymap::load(config.keymap.path.as_deref()).map_err(keymap_error)?;

        let groups = group_bindings(&keymap, self.category);
        if self.json {
            let output = KeymapOutput {
                name: &keymap.meta().name,
                version: &keymap.meta().version,
                categories: groups
                    .into_iter()
                    .map(|(category, bindings)| CategoryOutput {
                        category,
                        shortcuts: bindings
                            .into_iter()
                            .map(|binding| ShortcutOutput {
                                keys: binding.display_keys(),
                                binding,
                            })
                            .collect(),
                    })
                    .collect(),
            };
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
            println!("{json}");
        } else {
            println!("Keymap: {} (v{})", keymap.meta().name, keymap.meta().version);
            for (category, bindings) in groups {
                println!();
                println!("{}", category.title());
                for binding in bindings {
                    println!("  {:<18}{}", binding.display_keys(), binding.description);
                }
            }
        }

        Ok(())
    }
}

impl KeysCheckArgs {
    /// Parse, normalize and register the file without running anything
    pub fn execute(&self) -> CliResult<()> {
        let keymap = Keymap::load_from(&self.file).map_err(keymap_error)?;
        let shadowed = keymap.validate().map_err(keymap_error)?;

        for (chord, by) in &shadowed {
            println!("warning: '{chord}' can never fire, '{by}' matches first");
        }
        println!(
            "✓ {}: {} bindings OK",
            self.file.display(),
            keymap.bindings().len()
        );
        Ok(())
    }
}

fn keymap_error(e: KeymapError) -> CliError {
    match e {
        KeymapError::Io { .. } => CliError::io(e.to_string()),
        _ => CliError::validation(format!("Invalid keymap: {e}")),
    }
}

/// Bindings per category in display order, skipping empty groups.
fn group_bindings(
    keymap: &Keymap,
    only: Option<Category>,
) -> Vec<(Category, Vec<&ResolvedBinding>)> {
    Category::ALL
        .into_iter()
        .filter(|category| only.map_or(true, |c| c == *category))
        .map(|category| {
            let bindings = keymap
                .bindings()
                .iter()
                .filter(|b| b.category == category)
                .collect::<Vec<_>>();
            (category, bindings)
        })
        .filter(|(_, bindings)| !bindings.is_empty())
        .collect()
}
