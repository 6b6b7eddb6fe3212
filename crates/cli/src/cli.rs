use std::path::PathBuf;

use clap::Parser;

use reprice_core::{Config, RoundingMode};

/// Watch a products table and a sales table, and rewrite updated prices
/// whenever either one changes.
#[derive(Parser, Debug)]
#[command(name = "reprice", version, about)]
pub struct CliArgs {
    /// Config profile; keys are read as {PROFILE}_{KEY} before {KEY}.
    #[arg(long, env = "REPRICE_PROFILE")]
    pub profile: Option<String>,

    /// Products table (sku, current_price, cost_price, stock).
    #[arg(long)]
    pub products: Option<PathBuf>,

    /// Sales table (sku, quantity_sold).
    #[arg(long)]
    pub sales: Option<PathBuf>,

    /// Where the updated prices table is published.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Settle delay between a change notification and the check, in milliseconds.
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Rounding for final prices: half-even or half-up.
    #[arg(long)]
    pub rounding: Option<RoundingMode>,

    /// Run a single pass and exit instead of watching.
    #[arg(long)]
    pub once: bool,
}

impl CliArgs {
    /// Flags win over whatever the environment supplied.
    pub fn apply(&self, config: &mut Config) {
        if let Some(p) = &self.products {
            config.tables.products_file = p.clone();
        }
        if let Some(p) = &self.sales {
            config.tables.sales_file = p.clone();
        }
        if let Some(p) = &self.output {
            config.tables.output_file = p.clone();
        }
        if let Some(ms) = self.debounce_ms {
            config.watch.debounce_ms = ms;
        }
        if let Some(mode) = self.rounding {
            config.pricing.rounding = mode;
        }
    }
}
