//! Minimum-margin floor rule.

use rust_decimal::Decimal;

use reprice_core::{ceil_to_cent, Product, RuleKind, SalesRecord};

use crate::rule::{PricingRule, RuleInput, RulePhase};

/// Keeps every price at least 20% above cost. Never lowers a price.
#[derive(Debug, Clone)]
pub struct MinimumMarginRule {
    priority: i32,
}

impl MinimumMarginRule {
    pub fn new(priority: i32) -> Self {
        Self { priority }
    }

    /// Multiplier applied to `cost_price` to get the floor.
    pub fn markup() -> Decimal {
        Decimal::new(120, 2)
    }

    /// Exact floor, `cost_price * 1.20`.
    pub fn floor_for(product: &Product) -> Decimal {
        product.cost_price.saturating_mul(Self::markup())
    }

    /// The floor rounded up to a whole cent, so rounding the final price to
    /// cents can never take it below [`floor_for`](Self::floor_for).
    pub fn floor_price_for(product: &Product) -> Decimal {
        ceil_to_cent(Self::floor_for(product))
    }
}

impl Default for MinimumMarginRule {
    fn default() -> Self {
        Self::new(4)
    }
}

impl PricingRule for MinimumMarginRule {
    fn kind(&self) -> RuleKind {
        RuleKind::MinimumMargin
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Floor
    }

    fn applies(&self, _product: &Product, _sales: &SalesRecord) -> bool {
        true
    }

    fn apply(&self, input: &RuleInput<'_>) -> Decimal {
        input.price_so_far().max(Self::floor_price_for(input.product))
    }
}
