use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of one of the tables the pipeline reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    Products,
    Sales,
    Output,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Table::Products => write!(f, "products"),
            Table::Sales => write!(f, "sales"),
            Table::Output => write!(f, "output"),
        }
    }
}

/// A single row carried a missing or unusable field.
///
/// Scoped to one row: the pass that hits it keeps going and reports the
/// failure alongside the rows that did price.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{table} line {line}: sku '{sku}' has invalid {field} ({reason})")]
pub struct MalformedRecordError {
    pub table: Table,
    pub sku: String,
    pub field: &'static str,
    /// Raw cell contents, `None` when the cell was missing entirely.
    pub value: Option<String>,
    /// 1-based line in the source file (the header is line 1).
    pub line: u64,
    pub reason: String,
}

impl MalformedRecordError {
    pub fn missing(table: Table, sku: &str, field: &'static str, line: u64) -> Self {
        Self {
            table,
            sku: sku.to_string(),
            field,
            value: None,
            line,
            reason: "missing value".to_string(),
        }
    }

    pub fn invalid(
        table: Table,
        sku: &str,
        field: &'static str,
        value: &str,
        line: u64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            table,
            sku: sku.to_string(),
            field,
            value: Some(value.to_string()),
            line,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown rounding mode '{0}' (expected half-even or half-up)")]
    UnknownRounding(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
