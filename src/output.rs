//! Output formatting and persistence for scored tables.
//!
//! Supports pretty-printing, JSON serialization, and CSV read/write.

use anyhow::{Context, Result};
use tracing::debug;

use crate::analyzers::types::{PercentChangeRow, ScoredAggregate};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;

/// Logs rows using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(rows: &[T]) {
    for row in rows {
        debug!("{:#?}", row);
    }
}

/// Prints rows to stdout as pretty-printed JSON.
pub fn print_json<T: Serialize>(rows: &[T]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

/// Serializes rows as CSV with a header line into any writer.
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the scored table to `path`, replacing any existing file.
pub fn write_table(path: &str, rows: &[ScoredAggregate]) -> Result<()> {
    debug!(path, rows = rows.len(), "Writing scored table");
    let file = File::create(path).with_context(|| format!("failed to create '{path}'"))?;
    write_csv(file, rows)
}

/// Reads a scored table previously written by [`write_table`].
pub fn read_table(path: &str) -> Result<Vec<ScoredAggregate>> {
    let file = File::open(path).with_context(|| format!("failed to open '{path}'"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for (line, result) in reader.deserialize().enumerate() {
        let row: ScoredAggregate =
            result.with_context(|| format!("bad row {} in '{path}'", line + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Writes a percent-change table to `path`.
pub fn write_percent_change(path: &str, rows: &[PercentChangeRow]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create '{path}'"))?;
    write_csv(file, rows)
}
