//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; the route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands};
pub use presentation::{
    format_history_table, format_rollback_report, format_run_report, format_runs_table,
    format_section_tree,
};
pub use route::RunContext;
