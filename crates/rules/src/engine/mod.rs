//! Two-phase pricing engine.
//!
//! Phase 1 scans the tier rules in ascending priority and applies the first
//! one whose predicate holds; the tiers are mutually exclusive, so later
//! matches are never consulted. Phase 2 runs the floor rule (if installed)
//! against the phase-1 price. The result is rounded to cents.


use tracing::{trace, warn};

use reprice_core::{
    round_price, MalformedRecordError, PricingDecision, Product, ProductRow, RoundingMode,
    RuleKind, SalesRecord,
};

use crate::rule::{default_rules, PricingRule, RuleInput, RulePhase};

#[derive(Debug, Default)]
pub struct PricingEngine {
    /// Tier rules, kept sorted by ascending priority (stable on ties).
    tiers: Vec<Box<dyn PricingRule>>,
    floor: Option<Box<dyn PricingRule>>,
    rounding: RoundingMode,
}

impl PricingEngine {
    /// An engine with no rules: every product keeps its current price.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine loaded with [`default_rules`].
    pub fn with_default_rules() -> Self {
        let mut engine = Self::new();
        for rule in default_rules() {
            engine.add_rule(rule);
        }
        engine
    }

    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    /// Install a rule.
    ///
    /// Tier rules are re-sorted by priority after every insert. A floor rule
    /// takes the single floor slot, replacing any previous one.
    pub fn add_rule(&mut self, rule: Box<dyn PricingRule>) {
        match rule.phase() {
            RulePhase::Tier => {
                self.tiers.push(rule);
                self.tiers.sort_by_key(|r| r.priority());
            }
            RulePhase::Floor => {
                if let Some(previous) = self.floor.replace(rule) {
                    warn!(replaced = %previous.kind(), "floor rule replaced");
                }
            }
        }
    }

    /// Remove every installed rule of the given kind. Returns how many were removed.
    pub fn remove_rule(&mut self, kind: RuleKind) -> usize {
        let before = self.tiers.len();
        self.tiers.retain(|r| r.kind() != kind);
        let mut removed = before - self.tiers.len();
        if self.floor.as_ref().is_some_and(|r| r.kind() == kind) {
            self.floor = None;
            removed += 1;
        }
        removed
    }

    /// All installed rules in evaluation order: tiers by priority, then the floor.
    pub fn rules(&self) -> impl Iterator<Item = &dyn PricingRule> + '_ {
        self.tiers
            .iter()
            .chain(self.floor.iter())
            .map(|r| r.as_ref())
    }

    pub fn tier_rules(&self) -> impl Iterator<Item = &dyn PricingRule> + '_ {
        self.tiers.iter().map(|r| r.as_ref())
    }

    pub fn floor_rule(&self) -> Option<&dyn PricingRule> {
        self.floor.as_deref()
    }

    /// Price one product.
    pub fn evaluate(&self, product: &Product, sales: &SalesRecord) -> PricingDecision {
        let mut applied = Vec::with_capacity(2);
        let input = RuleInput::new(product, sales);

        let tier_price = match self.tiers.iter().find(|r| r.applies(product, sales)) {
            Some(rule) => {
                trace!(sku = %product.sku, rule = %rule.kind(), "tier rule fired");
                applied.push(rule.kind());
                rule.apply(&input)
            }
            None => product.current_price,
        };

        let price = match &self.floor {
            Some(floor) => {
                applied.push(floor.kind());
                floor.apply(&input.with_price(tier_price))
            }
            None => tier_price,
        };

        PricingDecision {
            sku: product.sku.clone(),
            old_price: product.current_price,
            new_price: round_price(price, self.rounding),
            applied,
        }
    }

    /// Validate a raw products-table row, then price it.
    pub fn evaluate_row(
        &self,
        row: &ProductRow,
        sales: &SalesRecord,
    ) -> Result<PricingDecision, MalformedRecordError> {
        let product = row.parse()?;
        Ok(self.evaluate(&product, sales))
    }
}
