//! CLI command-name contract for logs.

use crate::cli::parse::{Commands, ConfigCommands};

/// Command name string for log records (e.g. "generate", "config.init").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Generate { .. } => "generate".to_string(),
        Commands::Sections { .. } => "sections".to_string(),
        Commands::Import { .. } => "import".to_string(),
        Commands::History { .. } => "history".to_string(),
        Commands::Rollback { .. } => "rollback".to_string(),
        Commands::Runs { .. } => "runs".to_string(),
        Commands::Config { command } => format!("config.{}", config_command_name(command)),
    }
}

pub fn config_command_name(command: &ConfigCommands) -> &'static str {
    match command {
        ConfigCommands::Init { .. } => "init",
        ConfigCommands::Show => "show",
    }
}
