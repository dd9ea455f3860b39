//! CLI command implementations
//!
//! Each command loads the config, opens the store, runs one operation and
//! writes exactly one response object to stdout. A failed operation still
//! produces its error response before the process exits non-zero.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::database::{Database, DatabaseConfig, DatabaseResult};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::query::{Query, QueryError, QueryOptions};
use crate::storage::StorageError;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{error_response, ok_response, write_json};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_command(cli, stdin.lock(), &mut stdout.lock())
}

/// Runs one parsed command against the given input and output streams
pub fn run_command<R: BufRead, W: Write>(cli: Cli, input: R, output: &mut W) -> CliResult<()> {
    let config = load_config(&cli.config)?;

    let severity = if cli.verbose {
        Severity::Trace
    } else {
        config
            .severity()
            .map_err(|e| CliError::config_error(e.message()))?
    };
    Logger::set_min_severity(severity);

    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("config", &cli.config.display().to_string()),
            ("path", &config.path.display().to_string()),
        ],
    );

    let outcome = Database::<Value>::open(&config).and_then(|db| execute(&db, cli.command, input));
    respond(output, outcome)
}

/// Load and validate the configuration file
pub fn load_config(path: &Path) -> CliResult<DatabaseConfig> {
    DatabaseConfig::load(path).map_err(|e| CliError::config_error(e.message()))
}

/// Runs one command against an open store and returns the response data
pub fn execute<R: BufRead>(db: &Database<Value>, command: Command, input: R) -> DatabaseResult<Value> {
    match command {
        Command::Insert => insert(db, input),
        Command::Find {
            query,
            sort,
            projection,
        } => {
            let query = Query::parse(&query)?;
            let options = parse_options(sort.as_deref(), projection.as_deref())?;
            Ok(Value::Array(db.find(&query, options.as_ref())?))
        }
        Command::Count { query } => Ok(json!(db.count(&Query::parse(&query)?)?)),
        Command::Delete { query } => Ok(json!({ "deleted": db.delete(&Query::parse(&query)?)? })),
        Command::Dump => Ok(json!(db.scan()?)),
    }
}

/// Inserts one record per non-blank input line.
///
/// Stops at the first failure; records inserted before it stay inserted.
fn insert<R: BufRead>(db: &Database<Value>, input: R) -> DatabaseResult<Value> {
    let mut positions = Vec::new();

    for (index, line) in input.lines().enumerate() {
        let line = line.map_err(|e| StorageError::io_error("Failed to read input", e))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: Value = serde_json::from_str(&line).map_err(|e| {
            StorageError::invalid_record(format!(
                "Input line {} is not valid JSON: {}",
                index + 1,
                e
            ))
        })?;

        let position = db.insert(&record)?;
        positions.push(json!({
            "line": position.line,
            "byte_offset": position.offset,
        }));
    }

    Ok(json!({
        "inserted": positions.len(),
        "positions": positions,
    }))
}

/// Combines `--sort` and `--projection` into query options
fn parse_options(sort: Option<&str>, projection: Option<&str>) -> DatabaseResult<Option<QueryOptions>> {
    if sort.is_none() && projection.is_none() {
        return Ok(None);
    }

    let mut spec = Map::new();
    if let Some(sort) = sort {
        spec.insert("sort".to_string(), parse_json_arg("--sort", sort)?);
    }
    if let Some(projection) = projection {
        spec.insert("projection".to_string(), parse_json_arg("--projection", projection)?);
    }

    Ok(Some(QueryOptions::from_value(&Value::Object(spec))?))
}

fn parse_json_arg(name: &str, text: &str) -> Result<Value, QueryError> {
    serde_json::from_str(text)
        .map_err(|e| QueryError::unsupported_query(format!("{} is not valid JSON: {}", name, e)))
}

/// Writes the response for an outcome; failures exit non-zero after reporting
fn respond<W: Write>(output: &mut W, outcome: DatabaseResult<Value>) -> CliResult<()> {
    match outcome {
        Ok(data) => write_json(output, &ok_response(data)),
        Err(err) => {
            write_json(output, &error_response(err.code(), &err.message()))?;
            Err(CliError::command_failed(&err))
        }
    }
}
