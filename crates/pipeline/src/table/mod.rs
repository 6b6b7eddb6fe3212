//! CSV access for the three tables.
//!
//! Columns are located by header name, so extra passthrough columns and any
//! column order are accepted. Readers are flexible about row width: a short
//! row surfaces as a missing field on that row rather than a table error.

mod reader;
mod writer;


use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ByteRecord, StringRecord};

use reprice_core::{MalformedRecordError, Table};

use crate::error::PassError;

pub use reader::{load_sales_index, ProductRows, SalesLoad};
pub use writer::{temp_path_for, write_decisions_atomic, AtomicTableWriter, OUTPUT_HEADERS};

/// Open a headed CSV table, mapping a missing file to [`PassError::MissingFile`].
fn open_table(table: Table, path: &Path) -> Result<csv::Reader<File>, PassError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PassError::MissingFile {
            table,
            path: path.to_path_buf(),
        },
        _ => PassError::Read {
            table,
            path: path.to_path_buf(),
            source: e.into(),
        },
    })?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

/// Position of a required column in the header row.
fn require_column(
    headers: &StringRecord,
    table: Table,
    path: &Path,
    column: &'static str,
) -> Result<usize, PassError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| PassError::MissingColumn {
            table,
            path: path.to_path_buf(),
            column,
        })
}

/// Non-empty cell text, `None` for a missing or blank cell.
///
/// Cells are decoded one at a time so bytes that are not UTF-8 reject
/// their own row without ending the read. Passthrough columns are never
/// decoded.
fn cell<'r>(
    record: &'r ByteRecord,
    idx: usize,
    table: Table,
    sku: &str,
    field: &'static str,
) -> Result<Option<&'r str>, MalformedRecordError> {
    let Some(bytes) = record.get(idx).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    std::str::from_utf8(bytes).map(Some).map_err(|_| {
        MalformedRecordError::invalid(
            table,
            sku,
            field,
            &String::from_utf8_lossy(bytes),
            record_line(record),
            "not valid UTF-8",
        )
    })
}

/// The row's sku cell. An undecodable sku is reported by its lossy text.
fn sku_cell(
    record: &ByteRecord,
    idx: usize,
    table: Table,
) -> Result<Option<&str>, MalformedRecordError> {
    let lossy = record.get(idx).map(String::from_utf8_lossy).unwrap_or_default();
    cell(record, idx, table, &lossy, "sku")
}

fn record_line(record: &ByteRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}
