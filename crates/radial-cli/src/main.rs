//! # Radial CLI
//!
//! Command-line interface for the Radial app launcher.
//!
//! ## Commands
//!
//! - `radial index` - Index installed apps and persist the menu
//! - `radial query <text>` - Search installed apps
//! - `radial menu ...` - Show and edit the curated menu
//! - `radial launch <position>` - Launch a menu entry
//! - `radial interactive` - Start interactive TUI mode
//! - `radial status` - Show index status and statistics
//!
//! ## Example Usage
//!
//! ```bash
//! # Seed the menu on first run
//! radial index
//!
//! # Search as you would in the launcher
//! radial query cal
//!
//! # Put the best match for "term" in the menu, then launch the first entry
//! radial menu add term
//! radial launch 1
//! ```

mod app;
mod commands;
mod tui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Radial - a curated app launcher with search as you type
#[derive(Parser)]
#[command(name = "radial")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "RADIAL_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index installed apps and save the menu
    Index,

    /// Search installed apps
    Query {
        /// Search text
        text: String,

        /// Maximum number of results to show (defaults to search.max_results)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Show or edit the curated menu
    Menu {
        #[command(subcommand)]
        action: Option<MenuAction>,
    },

    /// Launch the menu entry at a position (1-based)
    Launch { position: usize },

    /// Start interactive TUI mode
    #[command(alias = "i")]
    Interactive,

    /// Show index status and statistics
    Status,

    /// Delete the saved menu
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum MenuAction {
    /// List menu entries in order
    List,

    /// Add an app by identifier (`package/class`) or by best search match
    Add {
        app: String,

        /// Insert at this position (1-based) instead of appending
        #[arg(short, long)]
        at: Option<usize>,
    },

    /// Remove the entry at a position (1-based)
    Remove { position: usize },

    /// Move an entry from one position to another (1-based)
    Move { from: usize, to: usize },

    /// Replace the menu with the default apps
    Reset,
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => radial_core::Config::load_from(path)?,
        None => radial_core::Config::load()?,
    };

    // Setup logging
    let log_level = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => config.general.log_level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    // The TUI owns the terminal, so its logs would only corrupt the screen
    let interactive = matches!(cli.command, Commands::Interactive);
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new(if interactive { "error" } else { log_level.as_str() })
            }),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Index => commands::index::run(config),
        Commands::Query {
            text,
            limit,
            output,
        } => commands::query::run(config, &text, limit, output),
        Commands::Menu { action } => {
            commands::menu::run(config, action.unwrap_or(MenuAction::List))
        }
        Commands::Launch { position } => commands::launch::run(config, position),
        Commands::Interactive => tui::run(config),
        Commands::Status => commands::status::run(config),
        Commands::Clear { yes } => commands::clear::run(config, yes),
    }
}
