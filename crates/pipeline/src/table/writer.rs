use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use reprice_core::{format_currency, PricingDecision};

use crate::error::PassError;

/// Exact header of the output table.
pub const OUTPUT_HEADERS: [&str; 3] = ["sku", "old_price", "new_price"];

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    sku: &'a str,
    old_price: String,
    new_price: String,
}

impl<'a> From<&'a PricingDecision> for OutputRow<'a> {
    fn from(d: &'a PricingDecision) -> Self {
        Self {
            sku: &d.sku,
            old_price: format_currency(d.old_price),
            new_price: format_currency(d.new_price),
        }
    }
}

/// Sibling dotfile the output is staged in before the rename.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| OsStr::new("output")));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Streams decisions into a temp file and publishes it with a single rename.
///
/// Observers of the final path only ever see the previous table or the
/// complete new one. Dropping the writer without [`commit`](Self::commit)
/// removes the temp file.
pub struct AtomicTableWriter {
    final_path: PathBuf,
    tmp_path: PathBuf,
    writer: Option<csv::Writer<File>>,
    rows: usize,
}

impl AtomicTableWriter {
    pub fn create(path: &Path) -> Result<Self, PassError> {
        let tmp_path = temp_path_for(path);
        let file = File::create(&tmp_path).map_err(|e| PassError::output(path, e))?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(OUTPUT_HEADERS)
            .map_err(|e| PassError::output(path, e))?;
        Ok(Self {
            final_path: path.to_path_buf(),
            tmp_path,
            writer: Some(writer),
            rows: 0,
        })
    }

    pub fn write(&mut self, decision: &PricingDecision) -> Result<(), PassError> {
        let Some(writer) = self.writer.as_mut() else {
            let closed = std::io::Error::other("writer already closed");
            return Err(PassError::output(&self.final_path, closed));
        };
        writer
            .serialize(OutputRow::from(decision))
            .map_err(|e| PassError::output(&self.final_path, e))?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush, sync and rename the temp file over the final path.
    pub fn commit(mut self) -> Result<usize, PassError> {
        let Some(writer) = self.writer.take() else {
            return Ok(self.rows);
        };
        if let Err(e) = publish(writer, &self.tmp_path, &self.final_path) {
            let _ = fs::remove_file(&self.tmp_path);
            return Err(PassError::output(&self.final_path, e));
        }
        debug!(path = %self.final_path.display(), rows = self.rows, "published output table");
        Ok(self.rows)
    }
}

fn publish(writer: csv::Writer<File>, tmp: &Path, dest: &Path) -> Result<(), csv::Error> {
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, dest)?;
    Ok(())
}

impl Drop for AtomicTableWriter {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            if let Err(e) = fs::remove_file(&self.tmp_path) {
                warn!(
                    path = %self.tmp_path.display(),
                    error = %e,
                    "failed to remove staged output"
                );
            }
        }
    }
}

/// Write a complete set of decisions atomically. Returns the row count.
pub fn write_decisions_atomic<'a, I>(path: &Path, decisions: I) -> Result<usize, PassError>
where
    I: IntoIterator<Item = &'a PricingDecision>,
{
    let mut out = AtomicTableWriter::create(path)?;
    for decision in decisions {
        out.write(decision)?;
    }
    out.commit()
}
