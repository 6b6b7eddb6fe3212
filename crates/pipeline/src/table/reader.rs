use std::fs::File;
use std::path::{Path, PathBuf};

use csv::ByteRecord;
use tracing::{debug, warn};

use reprice_core::{MalformedRecordError, ProductRow, SalesIndex, SalesRecord, Table};

use super::{cell, open_table, record_line, require_column, sku_cell};
use crate::error::PassError;

// ── Sales ─────────────────────────────────────────────────────

/// Sales index for one pass plus the rows that could not be indexed.
#[derive(Debug, Default)]
pub struct SalesLoad {
    pub index: SalesIndex,
    pub failures: Vec<MalformedRecordError>,
}

/// Read the whole sales table into a [`SalesIndex`].
///
/// A row with an unusable `quantity_sold` is reported and left out, so its
/// SKU prices as if nothing sold.
pub fn load_sales_index(path: &Path) -> Result<SalesLoad, PassError> {
    let read_err = |source| PassError::Read {
        table: Table::Sales,
        path: path.to_path_buf(),
        source,
    };

    let mut reader = open_table(Table::Sales, path)?;
    let headers = reader.headers().map_err(read_err)?.clone();
    let sku_col = require_column(&headers, Table::Sales, path, "sku")?;
    let qty_col = require_column(&headers, Table::Sales, path, "quantity_sold")?;

    let mut load = SalesLoad::default();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record).map_err(read_err)? {
        match sales_row(&record, sku_col, qty_col) {
            Ok(rec) => {
                if let Some(previous) = load.index.insert(rec) {
                    debug!(
                        sku = %previous.sku,
                        line = record_line(&record),
                        "duplicate sales row replaces earlier one"
                    );
                }
            }
            Err(e) => {
                warn!(
                    sku = %e.sku,
                    field = e.field,
                    line = e.line,
                    error = %e,
                    "malformed sales row"
                );
                load.failures.push(e);
            }
        }
    }

    debug!(path = %path.display(), skus = load.index.len(), "loaded sales index");
    Ok(load)
}

fn sales_row(
    record: &ByteRecord,
    sku_col: usize,
    qty_col: usize,
) -> Result<SalesRecord, MalformedRecordError> {
    let line = record_line(record);
    let sku = sku_cell(record, sku_col, Table::Sales)?
        .ok_or_else(|| MalformedRecordError::missing(Table::Sales, "", "sku", line))?;
    let quantity_sold = cell(record, qty_col, Table::Sales, sku, "quantity_sold")?;
    SalesRecord::parse(sku, quantity_sold, line)
}

// ── Products ──────────────────────────────────────────────────

/// Lazily streams raw rows from the products table, one record at a time.
///
/// The outer `Result` is a table-level failure that ends the pass; the
/// inner one rejects a single row whose cells could not be decoded.
pub struct ProductRows {
    reader: csv::Reader<File>,
    path: PathBuf,
    record: ByteRecord,
    sku_col: usize,
    current_price_col: usize,
    cost_price_col: usize,
    stock_col: usize,
    done: bool,
}

impl ProductRows {
    pub fn open(path: &Path) -> Result<Self, PassError> {
        let mut reader = open_table(Table::Products, path)?;
        let headers = reader
            .headers()
            .map_err(|source| PassError::Read {
                table: Table::Products,
                path: path.to_path_buf(),
                source,
            })?
            .clone();

        Ok(Self {
            sku_col: require_column(&headers, Table::Products, path, "sku")?,
            current_price_col: require_column(&headers, Table::Products, path, "current_price")?,
            cost_price_col: require_column(&headers, Table::Products, path, "cost_price")?,
            stock_col: require_column(&headers, Table::Products, path, "stock")?,
            reader,
            path: path.to_path_buf(),
            record: ByteRecord::new(),
            done: false,
        })
    }

    fn current_row(&self) -> Result<ProductRow, MalformedRecordError> {
        let record = &self.record;
        let sku = sku_cell(record, self.sku_col, Table::Products)?.unwrap_or_default();
        let text = |idx: usize, field: &'static str| {
            cell(record, idx, Table::Products, sku, field).map(|v| v.map(str::to_string))
        };
        Ok(ProductRow {
            line: record_line(record),
            sku: sku.to_string(),
            current_price: text(self.current_price_col, "current_price")?,
            cost_price: text(self.cost_price_col, "cost_price")?,
            stock: text(self.stock_col, "stock")?,
        })
    }
}

impl Iterator for ProductRows {
    type Item = Result<Result<ProductRow, MalformedRecordError>, PassError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_byte_record(&mut self.record) {
            Ok(true) => Some(Ok(self.current_row())),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(source) => {
                self.done = true;
                Some(Err(PassError::Read {
                    table: Table::Products,
                    path: self.path.clone(),
                    source,
                }))
            }
        }
    }
}
