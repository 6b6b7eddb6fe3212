use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use reprice_core::config::TableConfig;
use reprice_core::RoundingMode;
use reprice_pipeline::Pipeline;
use reprice_rules::PricingEngine;

pub const PRODUCTS_HEADER: &str = "sku,current_price,cost_price,stock";
pub const SALES_HEADER: &str = "sku,quantity_sold";

/// A temp workspace holding the three tables.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create tempdir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn products(&self) -> PathBuf {
        self.path("products.csv")
    }

    pub fn sales(&self) -> PathBuf {
        self.path("sales.csv")
    }

    pub fn output(&self) -> PathBuf {
        self.path("updated_prices.csv")
    }

    pub fn write_products(&self, rows: &[&str]) {
        write_table(&self.products(), PRODUCTS_HEADER, rows);
    }

    pub fn write_sales(&self, rows: &[&str]) {
        write_table(&self.sales(), SALES_HEADER, rows);
    }

    pub fn read_output(&self) -> String {
        fs::read_to_string(self.output()).expect("read output table")
    }

    pub fn tables(&self) -> TableConfig {
        TableConfig {
            products_file: self.products(),
            sales_file: self.sales(),
            output_file: self.output(),
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        self.pipeline_with(RoundingMode::HalfEven)
    }

    pub fn pipeline_with(&self, rounding: RoundingMode) -> Pipeline {
        Pipeline::new(
            self.tables(),
            PricingEngine::with_default_rules().with_rounding(rounding),
        )
    }
}

pub fn write_table(path: &Path, header: &str, rows: &[&str]) {
    let mut contents = String::from(header);
    contents.push('\n');
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    fs::write(path, contents).expect("write table");
}

/// Output row for `sku`, e.g. `A1,$10.00,$11.50`.
pub fn output_line<'a>(output: &'a str, sku: &str) -> Option<&'a str> {
    output
        .lines()
        .find(|l| l.split(',').next() == Some(sku))
}
