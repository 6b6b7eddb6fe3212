//! Pricing rule engine.
//!
//! This crate provides:
//! - The [`PricingRule`] trait and its built-in variants (three stock/demand
//!   tiers plus the minimum-margin floor)
//! - [`PricingEngine`]: two-phase evaluation (first matching tier, then floor)

pub mod engine;
pub mod floor;
pub mod rule;
pub mod tiers;

pub use engine::PricingEngine;
pub use floor::MinimumMarginRule;
pub use rule::{default_rules, PricingRule, RuleInput, RulePhase};
pub use tiers::{DeadStockRule, OverstockRule, ScarcitySurgeRule};
