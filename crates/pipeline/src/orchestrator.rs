//! One pass = load sales index, stream products through the engine, publish output.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use reprice_core::config::TableConfig;
use reprice_core::{MalformedRecordError, PricingDecision, SalesIndex};
use reprice_rules::PricingEngine;

use crate::error::PassError;
use crate::fingerprint::ChangeDetector;
use crate::table::{load_sales_index, AtomicTableWriter, ProductRows};

/// Result of a [`Pipeline::run_pass_if_changed`] call.
#[derive(Debug)]
pub enum PassOutcome {
    /// Inputs match the last check; nothing was written.
    Unchanged,
    Completed(PassReport),
}

/// Summary of a completed pass.
#[derive(Debug, Clone)]
pub struct PassReport {
    pub output: PathBuf,
    pub rows_written: usize,
    /// Rows from either input table that were left out.
    pub failures: Vec<MalformedRecordError>,
    pub completed_at: DateTime<Utc>,
    pub duration: Duration,
    /// 1 normally, 2 when the output write was retried.
    pub attempts: u32,
}

impl PassReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn log_summary(&self) {
        if self.is_clean() {
            info!(
                output = %self.output.display(),
                rows = self.rows_written,
                elapsed_ms = self.duration.as_millis() as u64,
                "updated prices written"
            );
        } else {
            warn!(
                output = %self.output.display(),
                rows = self.rows_written,
                failed = self.failures.len(),
                elapsed_ms = self.duration.as_millis() as u64,
                "updated prices written with rejected rows"
            );
            for f in &self.failures {
                warn!(
                    table = %f.table,
                    sku = %f.sku,
                    field = f.field,
                    line = f.line,
                    "rejected: {}",
                    f.reason
                );
            }
        }
    }
}

/// Counters across the life of a [`Pipeline`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub checks: u64,
    pub passes_run: u64,
    pub passes_failed: u64,
    pub passes_skipped: u64,
    /// Output writes that failed once and were attempted again.
    pub output_retries: u64,
}

/// One product row after evaluation.
#[derive(Debug)]
pub enum RowOutcome {
    Priced(PricingDecision),
    Rejected(MalformedRecordError),
}

/// Lazy sequence of evaluated product rows.
pub struct PricedRows<'a> {
    rows: ProductRows,
    sales: &'a SalesIndex,
    engine: &'a PricingEngine,
}

impl Iterator for PricedRows<'_> {
    type Item = Result<RowOutcome, PassError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next()? {
            Ok(Ok(row)) => row,
            Ok(Err(e)) => return Some(Ok(RowOutcome::Rejected(e))),
            Err(e) => return Some(Err(e)),
        };
        let sales = self.sales.get_or_default(&row.sku);
        Some(Ok(match self.engine.evaluate_row(&row, &sales) {
            Ok(decision) => RowOutcome::Priced(decision),
            Err(e) => RowOutcome::Rejected(e),
        }))
    }
}

/// Serialized pass runner over a fixed pair of input tables and one output.
pub struct Pipeline {
    tables: TableConfig,
    engine: PricingEngine,
    detector: ChangeDetector,
    stats: PipelineStats,
}

impl Pipeline {
    pub fn new(tables: TableConfig, engine: PricingEngine) -> Self {
        let detector = ChangeDetector::new(&tables.products_file, &tables.sales_file);
        Self {
            tables,
            engine,
            detector,
            stats: PipelineStats::default(),
        }
    }

    pub fn tables(&self) -> &TableConfig {
        &self.tables
    }

    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Run a pass only if either input changed since the last check.
    ///
    /// The first call after construction always runs. A failed pass resets
    /// the detector so the next call retries against the same inputs.
    pub fn run_pass_if_changed(&mut self) -> Result<PassOutcome, PassError> {
        self.stats.checks += 1;
        if !self.detector.check()? {
            self.stats.passes_skipped += 1;
            return Ok(PassOutcome::Unchanged);
        }
        match self.run_pass() {
            Ok(report) => Ok(PassOutcome::Completed(report)),
            Err(e) => {
                self.detector.invalidate();
                Err(e)
            }
        }
    }

    /// Run a pass unconditionally.
    pub fn run_pass(&mut self) -> Result<PassReport, PassError> {
        self.stats.passes_run += 1;
        let result = self.execute();
        if result.is_err() {
            self.stats.passes_failed += 1;
        }
        result
    }

    /// Open the products table and price it row by row against `sales`.
    pub fn decisions<'a>(&'a self, sales: &'a SalesIndex) -> Result<PricedRows<'a>, PassError> {
        Ok(PricedRows {
            rows: ProductRows::open(&self.tables.products_file)?,
            sales,
            engine: &self.engine,
        })
    }

    fn execute(&mut self) -> Result<PassReport, PassError> {
        let started = Instant::now();
        let sales = load_sales_index(&self.tables.sales_file)?;

        let mut attempts = 1;
        let (rows_written, mut failures) = loop {
            match self.stream_output(&sales.index) {
                Ok(summary) => break summary,
                Err(e @ PassError::OutputWrite { .. }) if attempts == 1 => {
                    warn!(error = %e, "output write failed, retrying once");
                    self.stats.output_retries += 1;
                    attempts += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let mut all_failures = sales.failures;
        all_failures.append(&mut failures);

        Ok(PassReport {
            output: self.tables.output_file.clone(),
            rows_written,
            failures: all_failures,
            completed_at: Utc::now(),
            duration: started.elapsed(),
            attempts,
        })
    }

    fn stream_output(
        &self,
        sales: &SalesIndex,
    ) -> Result<(usize, Vec<MalformedRecordError>), PassError> {
        let priced = self.decisions(sales)?;
        let mut out = AtomicTableWriter::create(&self.tables.output_file)?;
        let mut failures = Vec::new();

        for outcome in priced {
            match outcome? {
                RowOutcome::Priced(decision) => out.write(&decision)?,
                RowOutcome::Rejected(e) => {
                    warn!(
                        sku = %e.sku,
                        field = e.field,
                        line = e.line,
                        error = %e,
                        "malformed product row"
                    );
                    failures.push(e);
                }
            }
        }

        let rows = out.commit()?;
        Ok((rows, failures))
    }
}
