//! CLI command implementations
//!
//! Commands are thin wrappers: load configuration, hand each query string
//! to the engine, print one JSON line per result.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::info;

use crate::observability::{init_tracing, Event};
use crate::query::{coerce, parse, Configuration};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_queries, write_response_to};

/// Default log filter when neither `Q2DOC_LOG` nor `RUST_LOG` is set
const DEFAULT_LOG_FILTER: &str = "warn";

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    init_tracing(DEFAULT_LOG_FILTER);
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    match cmd {
        Command::Parse {
            config,
            ignore,
            max_limit,
            queries,
        } => {
            let config = load_config(config.as_deref(), &ignore, max_limit)?;
            if queries.is_empty() {
                parse_queries(&config, read_queries(), &mut stdout)
            } else {
                parse_queries(&config, queries.into_iter().map(Ok), &mut stdout)
            }
        }
        Command::Coerce { values } => coerce_values(&values, &mut stdout),
    }
}

/// Build the configuration from an optional JSON file plus flag overrides.
///
/// `--ignore` keys are added to the file's ignore list; `--max-limit`
/// replaces the file's value. Validation runs once on the merged result.
pub fn load_config(
    path: Option<&Path>,
    ignore: &[String],
    max_limit: Option<i64>,
) -> CliResult<Configuration> {
    let mut doc = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|e| {
                CliError::config_error(format!(
                    "Failed to read config {}: {}",
                    path.display(),
                    e
                ))
            })?;
            match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(doc)) => doc,
                Ok(_) => return Err(CliError::config_error("Config must be a JSON object")),
                Err(e) => {
                    return Err(CliError::config_error(format!("Invalid config JSON: {}", e)))
                }
            }
        }
        None => Map::new(),
    };

    if !ignore.is_empty() {
        let entry = doc
            .entry("ignore")
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry {
            Value::Array(keys) => keys.extend(ignore.iter().cloned().map(Value::String)),
            _ => return Err(CliError::config_error("Config 'ignore' must be an array")),
        }
    }

    if let Some(max_limit) = max_limit {
        doc.insert("maxLimit".to_string(), Value::from(max_limit));
    }

    let config = Configuration::from_json_value(Value::Object(doc))?;

    if let Some(path) = path {
        info!(
            event = Event::ConfigLoaded.as_str(),
            path = %path.display(),
            max_limit = ?config.max_limit(),
            ignored = config.ignored().count(),
            "configuration loaded"
        );
    }

    Ok(config)
}

/// Parse each query and write one response line per query
pub fn parse_queries<I, W>(config: &Configuration, queries: I, out: &mut W) -> CliResult<()>
where
    I: IntoIterator<Item = CliResult<String>>,
    W: Write,
{
    for query in queries {
        let parsed = parse(&query?, config);
        write_response_to(out, parsed.to_json())?;
    }
    Ok(())
}

/// Write the inferred type and value of each raw value
pub fn coerce_values<W: Write>(values: &[String], out: &mut W) -> CliResult<()> {
    let results: Vec<Value> = values
        .iter()
        .map(|raw| {
            let value = coerce(raw);
            json!({
                "input": raw,
                "type": value.kind().as_str(),
                "value": value.to_json(),
            })
        })
        .collect();

    write_response_to(out, Value::Array(results))
}
