use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::money::RoundingMode;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match profiled_env_opt(profile, key) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: v }),
        None => Ok(default),
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub tables: TableConfig,
    pub watch: WatchConfig,
    pub pricing: PricingConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `REPRICE_PROFILE`. When set (e.g. `STAGING`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let profile = env_or("REPRICE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Result<Self, ConfigError> {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Ok(Self {
            profile: p.to_string(),
            tables: TableConfig::from_env_profiled(p),
            watch: WatchConfig::from_env_profiled(p)?,
            pricing: PricingConfig::from_env_profiled(p)?,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  products:    {}", self.tables.products_file.display());
        tracing::info!("  sales:       {}", self.tables.sales_file.display());
        tracing::info!("  output:      {}", self.tables.output_file.display());
        tracing::info!("  watch:       debounce={}ms", self.watch.debounce_ms);
        tracing::info!("  pricing:     rounding={}", self.pricing.rounding);
    }
}

// ── Tables ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub products_file: PathBuf,
    pub sales_file: PathBuf,
    pub output_file: PathBuf,
}

impl TableConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            products_file: PathBuf::from(profiled_env_or(p, "PRODUCTS_FILE", "products.csv")),
            sales_file: PathBuf::from(profiled_env_or(p, "SALES_FILE", "sales.csv")),
            output_file: PathBuf::from(profiled_env_or(p, "OUTPUT_FILE", "updated_prices.csv")),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            products_file: PathBuf::from("products.csv"),
            sales_file: PathBuf::from("sales.csv"),
            output_file: PathBuf::from("updated_prices.csv"),
        }
    }
}

// ── Watch ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Settle delay between a change notification and the fingerprint check.
    pub debounce_ms: u64,
}

impl WatchConfig {
    fn from_env_profiled(p: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            debounce_ms: profiled_env_u64(p, "WATCH_DEBOUNCE_MS", 250)?,
        })
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 250 }
    }
}

// ── Pricing ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingConfig {
    pub rounding: RoundingMode,
}

impl PricingConfig {
    fn from_env_profiled(p: &str) -> Result<Self, ConfigError> {
        let rounding = match profiled_env_opt(p, "PRICE_ROUNDING") {
            Some(v) => v.parse()?,
            None => RoundingMode::default(),
        };
        Ok(Self { rounding })
    }
}
