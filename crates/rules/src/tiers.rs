//! Stock/demand tier rules. At most one of these fires per product.

use rust_decimal::Decimal;

use reprice_core::{Product, RuleKind, SalesRecord};

use crate::rule::{PricingRule, RuleInput};

// ── Scarcity surge ─────────────────────────────────────────────────

/// Low stock with strong demand: raise the price 15%.
#[derive(Debug, Clone)]
pub struct ScarcitySurgeRule {
    priority: i32,
}

impl ScarcitySurgeRule {
    pub const MAX_STOCK: u64 = 20;
    pub const MIN_SOLD: u64 = 30;

    pub fn new(priority: i32) -> Self {
        Self { priority }
    }

    fn factor() -> Decimal {
        Decimal::new(115, 2)
    }
}

impl Default for ScarcitySurgeRule {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PricingRule for ScarcitySurgeRule {
    fn kind(&self) -> RuleKind {
        RuleKind::ScarcitySurge
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn applies(&self, product: &Product, sales: &SalesRecord) -> bool {
        product.stock < Self::MAX_STOCK && sales.quantity_sold > Self::MIN_SOLD
    }

    fn apply(&self, input: &RuleInput<'_>) -> Decimal {
        input.price_so_far().saturating_mul(Self::factor())
    }
}

// ── Dead stock ─────────────────────────────────────────────────────

/// Large stock that has not sold at all: cut the price 30%.
#[derive(Debug, Clone)]
pub struct DeadStockRule {
    priority: i32,
}

impl DeadStockRule {
    pub const MIN_STOCK: u64 = 200;

    pub fn new(priority: i32) -> Self {
        Self { priority }
    }

    fn factor() -> Decimal {
        Decimal::new(70, 2)
    }
}

impl Default for DeadStockRule {
    fn default() -> Self {
        Self::new(2)
    }
}

impl PricingRule for DeadStockRule {
    fn kind(&self) -> RuleKind {
        RuleKind::DeadStock
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn applies(&self, product: &Product, sales: &SalesRecord) -> bool {
        product.stock > Self::MIN_STOCK && sales.quantity_sold == 0
    }

    fn apply(&self, input: &RuleInput<'_>) -> Decimal {
        input.price_so_far().saturating_mul(Self::factor())
    }
}

// ── Overstock ──────────────────────────────────────────────────────

/// Excess stock with weak demand: cut the price 10%.
#[derive(Debug, Clone)]
pub struct OverstockRule {
    priority: i32,
}

impl OverstockRule {
    pub const MIN_STOCK: u64 = 100;
    pub const MAX_SOLD: u64 = 20;

    pub fn new(priority: i32) -> Self {
        Self { priority }
    }

    fn factor() -> Decimal {
        Decimal::new(90, 2)
    }
}

impl Default for OverstockRule {
    fn default() -> Self {
        Self::new(3)
    }
}

impl PricingRule for OverstockRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Overstock
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn applies(&self, product: &Product, sales: &SalesRecord) -> bool {
        product.stock > Self::MIN_STOCK && sales.quantity_sold < Self::MAX_SOLD
    }

    fn apply(&self, input: &RuleInput<'_>) -> Decimal {
        input.price_so_far().saturating_mul(Self::factor())
    }
}
