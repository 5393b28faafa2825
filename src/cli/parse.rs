//! CLI parse: clap types for sectionseo. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sectionseo - batch SEO field generation for catalog section trees
#[derive(Parser)]
#[command(name = "sectionseo")]
#[command(about = "Generate SEO headings, titles and descriptions for catalog sections")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, short = 'q', default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one generation batch with the configured settings
    Generate {
        /// Catalog id (overrides config)
        #[arg(long)]
        iblock: Option<i64>,
        /// Scope root section id, 0 for the whole catalog (overrides config)
        #[arg(long)]
        section: Option<u64>,
        /// Maximum number of sections to select, 0 for no limit (overrides config)
        #[arg(long)]
        limit: Option<usize>,
        /// Regenerate sections that were already generated
        #[arg(long)]
        force: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the section tree of a catalog
    Sections {
        /// Catalog id
        #[arg(long)]
        iblock: i64,
        /// Include inactive sections
        #[arg(long)]
        all: bool,
    },
    /// Load sections from a JSON array file
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Show the history snapshots of a run
    History {
        /// Run id (default: latest run)
        #[arg(long)]
        run: Option<u64>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Restore section fields from a run's snapshots
    Rollback {
        /// Run id
        #[arg(long)]
        run: u64,
        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// List generation runs
    Runs {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a starter config/config.toml into the workspace
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration as TOML
    Show,
}
