//! The [`PricingRule`] contract shared by tier and floor rules.

use std::fmt;

use rust_decimal::Decimal;

use reprice_core::{Product, RuleKind, SalesRecord};

use crate::floor::MinimumMarginRule;
use crate::tiers::{DeadStockRule, OverstockRule, ScarcitySurgeRule};

/// Which evaluation phase a rule participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RulePhase {
    /// Mutually exclusive stock/demand rule; the first match wins.
    Tier,
    /// Applied unconditionally after tier selection.
    Floor,
}

/// Everything a rule transform may read.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub product: &'a Product,
    pub sales: &'a SalesRecord,
    /// Price produced by an earlier phase, if any.
    pub new_price: Option<Decimal>,
}

impl<'a> RuleInput<'a> {
    pub fn new(product: &'a Product, sales: &'a SalesRecord) -> Self {
        Self {
            product,
            sales,
            new_price: None,
        }
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.new_price = Some(price);
        self
    }

    /// The intermediate price when one exists, otherwise the product's current price.
    pub fn price_so_far(&self) -> Decimal {
        self.new_price.unwrap_or(self.product.current_price)
    }
}

/// A predicate plus a price transform, ordered by priority.
///
/// Rules are pure: the same input always yields the same price and
/// nothing outside the returned value changes.
pub trait PricingRule: Send + Sync + fmt::Debug {
    fn kind(&self) -> RuleKind;

    /// Lower values are evaluated earlier.
    fn priority(&self) -> i32;

    fn phase(&self) -> RulePhase {
        RulePhase::Tier
    }

    fn applies(&self, product: &Product, sales: &SalesRecord) -> bool;

    fn apply(&self, input: &RuleInput<'_>) -> Decimal;
}

/// The standard rule set: scarcity surge (1), dead stock (2), overstock (3),
/// minimum margin floor (4).
pub fn default_rules() -> Vec<Box<dyn PricingRule>> {
    vec![
        Box::new(ScarcitySurgeRule::default()),
        Box::new(DeadStockRule::default()),
        Box::new(OverstockRule::default()),
        Box::new(MinimumMarginRule::default()),
    ]
}
