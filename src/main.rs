//! lazyssh-settings - inspect and edit lazyssh UI preferences
//!
//! Reads the same `~/.lazyssh/settings.json` the TUI uses at startup.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lazyssh_settings::{Settings, SettingsStore, SortMode};

#[derive(Parser)]
#[command(name = "lazyssh-settings")]
#[command(about = "Inspect and edit lazyssh UI preferences", long_about = None)]
struct Cli {
    /// Settings file to use instead of ~/.lazyssh/settings.json
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current sort mode
    Get,

    /// Save a sort mode
    Set {
        /// One of: alias_asc, alias_desc, last_seen_desc, last_seen_asc
        mode: SortMode,
    },

    /// Flip the sort direction
    Reverse,

    /// Switch between alias and last-seen ordering
    ToggleField,

    /// Advance to the next sort mode
    Cycle,

    /// List all sort modes
    List,

    /// Print the settings file location
    Path,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = match cli.file {
        Some(path) => Settings::Ready(SettingsStore::at_path(path)),
        None => Settings::open(),
    };

    match cli.command {
        Commands::Get => {
            println!("{}", current_mode(&settings));
        }
        Commands::Set { mode } => {
            settings
                .save_sort_mode(mode)
                .with_context(|| format!("failed to save sort mode {mode}"))?;
            println!("{mode}");
        }
        Commands::Reverse => update(&settings, SortMode::reverse)?,
        Commands::ToggleField => update(&settings, SortMode::toggle_field)?,
        Commands::Cycle => update(&settings, SortMode::next)?,
        Commands::List => {
            let current = current_mode(&settings);
            for mode in SortMode::ALL {
                let marker = if mode == current { "*" } else { " " };
                println!("{marker} {:<15} {}", mode.as_str(), mode.label());
            }
        }
        Commands::Path => match settings.store() {
            Some(store) => println!("{}", store.path().display()),
            None => anyhow::bail!("settings are unavailable: no home directory"),
        },
    }

    Ok(())
}

/// Loaded mode, or the fallback with a note on stderr.
fn current_mode(settings: &Settings) -> SortMode {
    match settings.load_sort_mode() {
        Ok(mode) => mode,
        Err(failure) => {
            eprintln!("warning: {:#}", anyhow::Error::new(failure.source));
            failure.fallback
        }
    }
}

fn update(settings: &Settings, f: impl FnOnce(SortMode) -> SortMode) -> Result<()> {
    let mode = f(current_mode(settings));
    settings
        .save_sort_mode(mode)
        .with_context(|| format!("failed to save sort mode {mode}"))?;
    println!("{mode}");
    Ok(())
}
