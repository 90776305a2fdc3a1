//! Configuration Module - TOML-based Engine Configuration
//!
//! Loads and validates engine parameters from `ledger.toml` with
//! sensible defaults for every field, so an empty file (or
//! `EngineConfig::default()`) yields a working engine. Initial
//! liquidity, starting balances, lock timeouts, and the invariant
//! tolerance are all externalized here - nothing is hardcoded in the
//! domain layer.

pub mod loader;

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
  /// Engine identity and logging.
  #[serde(default)]
  pub engine: IdentityConfig,
  /// Market creation defaults.
  #[serde(default)]
  pub market: MarketConfig,
  /// Account creation defaults.
  #[serde(default)]
  pub account: AccountConfig,
  /// Lock acquisition bounds.
  #[serde(default)]
  pub concurrency: ConcurrencyConfig,
  /// Pricing invariant parameters.
  #[serde(default)]
  pub pricing: PricingConfig,
}

/// Engine identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
  /// Human-readable engine name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Defaults applied when creating markets.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
  /// Initial size of each pool. Both pools start equal, so new
  /// markets open at 50/50 pricing.
  #[serde(default = "default_initial_liquidity")]
  pub initial_liquidity: Decimal,
}

/// Defaults applied when registering users.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
  /// Play-money balance granted on registration.
  #[serde(default = "default_starting_balance")]
  pub starting_balance: Decimal,
}

/// Lock acquisition configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConcurrencyConfig {
  /// Maximum wait for a per-market or per-user lock before the
  /// operation fails with `Busy`.
  #[serde(default = "default_lock_timeout_ms")]
  pub lock_timeout_ms: u64,
}

impl ConcurrencyConfig {
  pub fn lock_timeout(&self) -> Duration {
    Duration::from_millis(self.lock_timeout_ms)
  }
}

/// Pricing invariant configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
  /// Maximum relative drift of `yes_pool * no_pool` tolerated across
  /// a single trade.
  #[serde(default = "default_invariant_tolerance")]
  pub invariant_tolerance: Decimal,
}

fn default_name() -> String {
  "prediction-ledger".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_initial_liquidity() -> Decimal {
  dec!(100)
}

fn default_starting_balance() -> Decimal {
  dec!(1000)
}

fn default_lock_timeout_ms() -> u64 {
  5_000
}

fn default_invariant_tolerance() -> Decimal {
  dec!(0.000000001)
}

impl Default for IdentityConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
    }
  }
}

impl Default for MarketConfig {
  fn default() -> Self {
    Self {
      initial_liquidity: default_initial_liquidity(),
    }
  }
}

impl Default for AccountConfig {
  fn default() -> Self {
    Self {
      starting_balance: default_starting_balance(),
    }
  }
}

impl Default for ConcurrencyConfig {
  fn default() -> Self {
    Self {
      lock_timeout_ms: default_lock_timeout_ms(),
    }
  }
}

impl Default for PricingConfig {
  fn default() -> Self {
    Self {
      invariant_tolerance: default_invariant_tolerance(),
    }
  }
}
