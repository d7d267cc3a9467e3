//! Command-line front end: a printing [`Surface`](crate::ui::Surface) and the subcommands.

mod commands;
mod output;

pub use commands::{find_revision, run_changes, run_compare, run_config, run_log, CompareOptions};
pub use output::{write_compare, write_nodes, write_revisions, TerminalSurface};
