use std::path::PathBuf;

use reprice_core::Table;

/// Errors that abort a single pass. None of them stop the watch loop.
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    /// An input table does not exist yet; the pass is skipped.
    #[error("{table} table not found at {}", path.display())]
    MissingFile { table: Table, path: PathBuf },

    /// The header row lacks a column the engine needs.
    #[error("{table} table {} is missing required column '{column}'", path.display())]
    MissingColumn {
        table: Table,
        path: PathBuf,
        column: &'static str,
    },

    /// CSV-level read failure (I/O, invalid UTF-8, ...).
    #[error("failed to read {table} table {}: {source}", path.display())]
    Read {
        table: Table,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Hashing an input table failed for a reason other than absence.
    #[error("failed to fingerprint {table} table {}: {source}", path.display())]
    Fingerprint {
        table: Table,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing or publishing the output table failed.
    #[error("failed to write output {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl PassError {
    pub fn is_missing_file(&self) -> bool {
        matches!(self, PassError::MissingFile { .. })
    }

    pub(crate) fn output(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        PassError::OutputWrite {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Errors that can occur while setting up the filesystem watcher.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),
}
