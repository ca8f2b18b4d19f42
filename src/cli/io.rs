//! JSON I/O handling for CLI
//!
//! - Input: one JSON object, or one JSON object per line for batches
//! - Output: one JSON object per line
//! - UTF-8 only

use std::io::{BufRead, Write};

use serde_json::{json, Value};

use crate::schema::FieldFailure;

use super::errors::{CliError, CliResult};

/// Read a single JSON record from the whole input
pub fn read_record<R: BufRead>(reader: &mut R) -> CliResult<Value> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    if content.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    let value: Value = serde_json::from_str(&content)?;
    Ok(value)
}

/// Read one JSON record per line, skipping blank lines
pub fn read_records<R: BufRead>(reader: R) -> impl Iterator<Item = CliResult<Value>> {
    reader
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|line| {
            let line = line.map_err(CliError::from)?;
            serde_json::from_str::<Value>(&line).map_err(CliError::from)
        })
}

/// Write an accepted record
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    write_json(
        out,
        &json!({
            "status": "ok",
            "data": data
        }),
    )
}

/// Write a rejected record with all of its failures
pub fn write_rejected<W: Write>(out: &mut W, failures: &[FieldFailure]) -> CliResult<()> {
    let failures: Vec<Value> = failures.iter().map(FieldFailure::to_json).collect();
    write_json(
        out,
        &json!({
            "status": "rejected",
            "failures": failures
        }),
    )
}

/// Write an error response
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    write_json(
        out,
        &json!({
            "status": "error",
            "code": code,
            "message": message
        }),
    )
}

/// Write a JSON value as one line
pub fn write_json<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}
