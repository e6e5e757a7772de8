//! CLI command handling module
//!
//! Handles all CLI subcommands, logging setup and report output.

mod commands;
mod logging;
mod output;

pub use commands::{
    ConfigSubcommand, affected_apps, app_files, collect_modified_files, handle_config_command,
    list_root_apps,
};
pub use logging::init_logging;
pub use output::write_report;
