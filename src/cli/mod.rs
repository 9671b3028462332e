//! CLI module for q2doc
//!
//! Provides command-line interface for:
//! - parse: Query strings to criteria/options JSON
//! - coerce: Inspect the type inferred for raw values

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{coerce_values, load_config, parse_queries, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_queries, read_queries_from, write_error, write_response_to};
