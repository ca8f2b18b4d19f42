//! CLI command implementations
//!
//! Commands read from any `BufRead` and write to any `Write` so they can be
//! driven from tests; `run` wires them to stdin and stdout.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry, MetricsSnapshot};
use crate::schema::{
    read_schema_file, RecordSchema, SchemaLoader, ValidatedRecord, ValidationOutcome,
};

use super::args::{Cli, Command};
use super::config::{Config, OutputKeys};
use super::errors::{CliError, CliResult};
use super::io::{read_record, read_records, write_error, write_json, write_rejected, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}

/// Run the appropriate command based on CLI args
pub fn run_command(cli: Cli) -> CliResult<()> {
    let config = Config::load_or_default(cli.config.as_deref())?;
    Logger::set_min_severity(config.min_severity()?);
    log_event_with_fields(Event::ConfigLoaded, &[("schema_dir", config.schema_dir.as_str())]);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Validate {
            schema,
            input,
            canonical,
        } => {
            let keys = output_keys(&config, canonical);
            match input {
                Some(path) => {
                    let mut reader = BufReader::new(File::open(&path)?);
                    validate(&schema, keys, &mut reader, &mut out)
                }
                None => validate(&schema, keys, &mut stdin.lock(), &mut out),
            }
        }
        Command::Batch { schema, canonical } => {
            let keys = output_keys(&config, canonical);
            batch(&schema, keys, stdin.lock(), &mut out).map(|_| ())
        }
        Command::Schemas { dir } => {
            let dir = dir.unwrap_or_else(|| config.schema_path());
            schemas(&dir, &mut out)
        }
    }
}

fn output_keys(config: &Config, canonical: bool) -> OutputKeys {
    if canonical {
        OutputKeys::Canonical
    } else {
        config.output_keys
    }
}

/// Validate a single record.
///
/// Writes one response line. A rejected record yields
/// `FC_CLI_RECORD_REJECTED` after the response is written.
pub fn validate<R: BufRead, W: Write>(
    schema_path: &Path,
    keys: OutputKeys,
    input: &mut R,
    out: &mut W,
) -> CliResult<()> {
    let schema = load_schema(schema_path)?;
    let record = read_record(input)?;

    let outcome = schema.validate(&record);
    report(&schema, &outcome);

    match outcome {
        ValidationOutcome::Success(record) => write_response(out, render(&record, keys)),
        ValidationOutcome::Failure(failures) => {
            write_rejected(out, &failures)?;
            Err(CliError::rejected(1))
        }
    }
}

/// Validate one record per input line.
///
/// Every line gets a response line; malformed JSON lines get an error line.
/// A final summary line carries the counters.
pub fn batch<R: BufRead, W: Write>(
    schema_path: &Path,
    keys: OutputKeys,
    input: R,
    out: &mut W,
) -> CliResult<MetricsSnapshot> {
    let schema = load_schema(schema_path)?;
    let metrics = MetricsRegistry::new();
    let mut malformed = 0u64;

    for record in read_records(input) {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                malformed += 1;
                write_error(out, e.code_str(), e.message())?;
                continue;
            }
        };

        let outcome = schema.validate(&record);
        metrics.record_outcome(&outcome);
        report(&schema, &outcome);

        match outcome {
            ValidationOutcome::Success(record) => write_response(out, render(&record, keys))?,
            ValidationOutcome::Failure(failures) => write_rejected(out, &failures)?,
        }
    }

    let snapshot = metrics.snapshot();
    write_json(
        out,
        &json!({
            "status": "summary",
            "metrics": snapshot,
            "malformed": malformed
        }),
    )?;

    let total = snapshot.records_total().to_string();
    let rejected = snapshot.records_rejected.to_string();
    log_event_with_fields(
        Event::BatchComplete,
        &[("records", total.as_str()), ("rejected", rejected.as_str())],
    );

    let failed = snapshot.records_rejected + malformed;
    if failed > 0 {
        return Err(CliError::rejected(failed));
    }
    Ok(snapshot)
}

/// Load all schemas in `dir` and list them
pub fn schemas<W: Write>(dir: &Path, out: &mut W) -> CliResult<()> {
    let mut loader = SchemaLoader::new(dir);
    loader.load_all().map_err(|e| {
        log_event_with_fields(Event::SchemaRejected, &[("error", e.to_string().as_str())]);
        e
    })?;

    let count = loader.schema_count().to_string();
    log_event_with_fields(Event::SchemasLoaded, &[("count", count.as_str())]);

    let listed: Vec<Value> = loader
        .all_schemas()
        .into_iter()
        .map(|schema| {
            json!({
                "schema_id": schema.schema_id(),
                "schema_version": schema.schema_version(),
                "fields": schema.fields().len()
            })
        })
        .collect();

    write_response(out, Value::Array(listed))
}

fn load_schema(path: &Path) -> CliResult<RecordSchema> {
    let path_str = path.display().to_string();
    match read_schema_file(path) {
        Ok(schema) => {
            log_event_with_fields(
                Event::SchemaLoaded,
                &[
                    ("path", path_str.as_str()),
                    ("schema_id", schema.schema_id()),
                    ("schema_version", schema.schema_version()),
                ],
            );
            Ok(schema)
        }
        Err(e) => {
            log_event_with_fields(
                Event::SchemaRejected,
                &[("path", path_str.as_str()), ("error", e.to_string().as_str())],
            );
            Err(e.into())
        }
    }
}

fn render(record: &ValidatedRecord, keys: OutputKeys) -> Value {
    match keys {
        OutputKeys::Alias => Value::Object(record.to_alias_map()),
        OutputKeys::Canonical => Value::Object(record.to_canonical_map()),
    }
}

fn report(schema: &RecordSchema, outcome: &ValidationOutcome) {
    match outcome {
        ValidationOutcome::Success(_) => {
            Logger::trace(
                Event::RecordAccepted.as_str(),
                &[("schema_id", schema.schema_id())],
            );
        }
        ValidationOutcome::Failure(failures) => {
            let fields = failures
                .iter()
                .map(|f| f.field.as_str())
                .collect::<Vec<_>>()
                .join(",");
            log_event_with_fields(
                Event::RecordRejected,
                &[("schema_id", schema.schema_id()), ("fields", fields.as_str())],
            );
        }
    }
}
