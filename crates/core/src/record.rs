use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{MalformedRecordError, Table};
use crate::money::max_price;

// ── Products ──────────────────────────────────────────────────

/// One product as the engine sees it. Immutable for the duration of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub sku: String,
    pub current_price: Decimal,
    pub cost_price: Decimal,
    pub stock: u64,
}

/// A products-table row before numeric validation.
///
/// Cells are kept as raw text so a bad value can be reported against its
/// SKU and field instead of failing the whole table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRow {
    pub line: u64,
    pub sku: String,
    pub current_price: Option<String>,
    pub cost_price: Option<String>,
    pub stock: Option<String>,
}

impl ProductRow {
    pub fn parse(&self) -> Result<Product, MalformedRecordError> {
        if self.sku.trim().is_empty() {
            return Err(self.missing("sku"));
        }
        let current_price = self.price_field("current_price", self.current_price.as_deref())?;
        let cost_price = self.price_field("cost_price", self.cost_price.as_deref())?;
        let stock = parse_count(
            Table::Products,
            &self.sku,
            "stock",
            self.stock.as_deref(),
            self.line,
        )?
        .ok_or_else(|| self.missing("stock"))?;
        Ok(Product {
            sku: self.sku.clone(),
            current_price,
            cost_price,
            stock,
        })
    }

    fn missing(&self, field: &'static str) -> MalformedRecordError {
        MalformedRecordError::missing(Table::Products, &self.sku, field, self.line)
    }

    fn invalid(
        &self,
        field: &'static str,
        raw: &str,
        reason: impl Into<String>,
    ) -> MalformedRecordError {
        MalformedRecordError::invalid(Table::Products, &self.sku, field, raw, self.line, reason)
    }

    fn price_field(
        &self,
        field: &'static str,
        raw: Option<&str>,
    ) -> Result<Decimal, MalformedRecordError> {
        let raw = match raw.map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => return Err(self.missing(field)),
        };
        let value =
            Decimal::from_str(raw).map_err(|e| self.invalid(field, raw, e.to_string()))?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(self.invalid(field, raw, "must not be negative"));
        }
        if value > max_price() {
            return Err(self.invalid(field, raw, "out of range"));
        }
        Ok(value)
    }
}

/// Parse a non-negative integer cell. Empty or missing cells yield `Ok(None)`.
fn parse_count(
    table: Table,
    sku: &str,
    field: &'static str,
    raw: Option<&str>,
    line: u64,
) -> Result<Option<u64>, MalformedRecordError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            MalformedRecordError::invalid(table, sku, field, v, line, "not a non-negative integer")
        }),
    }
}

// ── Sales ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesRecord {
    pub sku: String,
    pub quantity_sold: u64,
}

impl SalesRecord {
    pub fn new(sku: impl Into<String>, quantity_sold: u64) -> Self {
        Self {
            sku: sku.into(),
            quantity_sold,
        }
    }

    /// Record for a SKU that has no sales row.
    pub fn none_sold(sku: impl Into<String>) -> Self {
        Self::new(sku, 0)
    }

    /// Build a record from a raw `quantity_sold` cell; an empty cell counts as zero.
    pub fn parse(
        sku: &str,
        quantity_sold: Option<&str>,
        line: u64,
    ) -> Result<Self, MalformedRecordError> {
        let qty = parse_count(Table::Sales, sku, "quantity_sold", quantity_sold, line)?;
        Ok(Self::new(sku, qty.unwrap_or(0)))
    }
}

/// Sales figures keyed by SKU, rebuilt from scratch on every pass.
#[derive(Debug, Clone, Default)]
pub struct SalesIndex {
    records: HashMap<String, SalesRecord>,
}

impl SalesIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; a repeated SKU replaces the earlier row.
    pub fn insert(&mut self, record: SalesRecord) -> Option<SalesRecord> {
        self.records.insert(record.sku.clone(), record)
    }

    pub fn get(&self, sku: &str) -> Option<&SalesRecord> {
        self.records.get(sku)
    }

    /// Look up a SKU, treating an unknown SKU as zero units sold.
    pub fn get_or_default(&self, sku: &str) -> Cow<'_, SalesRecord> {
        match self.records.get(sku) {
            Some(record) => Cow::Borrowed(record),
            None => Cow::Owned(SalesRecord::none_sold(sku)),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<SalesRecord> for SalesIndex {
    fn from_iter<I: IntoIterator<Item = SalesRecord>>(iter: I) -> Self {
        let mut index = SalesIndex::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}

// ── Decisions ─────────────────────────────────────────────────

/// Tag identifying a pricing rule variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    ScarcitySurge,
    DeadStock,
    Overstock,
    MinimumMargin,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::ScarcitySurge => write!(f, "scarcity_surge"),
            RuleKind::DeadStock => write!(f, "dead_stock"),
            RuleKind::Overstock => write!(f, "overstock"),
            RuleKind::MinimumMargin => write!(f, "minimum_margin"),
        }
    }
}

/// Outcome of evaluating one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingDecision {
    pub sku: String,
    /// Price at pass start; never touched by rules.
    pub old_price: Decimal,
    /// Price after tier selection, floor enforcement and rounding.
    pub new_price: Decimal,
    /// Rules that fired, in evaluation order.
    pub applied: Vec<RuleKind>,
}

impl PricingDecision {
    pub fn tier(&self) -> Option<RuleKind> {
        self.applied
            .iter()
            .copied()
            .find(|k| *k != RuleKind::MinimumMargin)
    }

    pub fn is_repriced(&self) -> bool {
        self.old_price != self.new_price
    }
}
