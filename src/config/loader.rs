//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `ledger.toml`, validating all parameters, and
//! providing clear error messages for misconfiguration. Also hosts
//! the tracing initialization helper embedding hosts call once at
//! startup.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use super::EngineConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<EngineConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config: EngineConfig = toml::from_str(&content)
    .with_context(|| "Failed to parse ledger config")?;

  validate_config(&config)?;

  info!(
    name = %config.engine.name,
    initial_liquidity = %config.market.initial_liquidity,
    starting_balance = %config.account.starting_balance,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
pub fn validate_config(config: &EngineConfig) -> Result<()> {
  anyhow::ensure!(
    config.market.initial_liquidity > Decimal::ZERO,
    "initial_liquidity must be positive, got {}",
    config.market.initial_liquidity
  );
  anyhow::ensure!(
    config.account.starting_balance >= Decimal::ZERO,
    "starting_balance must be non-negative, got {}",
    config.account.starting_balance
  );
  anyhow::ensure!(
    config.concurrency.lock_timeout_ms > 0,
    "lock_timeout_ms must be positive"
  );
  anyhow::ensure!(
    config.pricing.invariant_tolerance > Decimal::ZERO
      && config.pricing.invariant_tolerance < dec!(0.01),
    "invariant_tolerance must be in (0, 0.01), got {}",
    config.pricing.invariant_tolerance
  );

  Ok(())
}

/// Initialize structured JSON logging for an embedding host.
///
/// Uses `RUST_LOG` when set, otherwise the configured level. Call at
/// most once per process.
pub fn init_tracing(config: &EngineConfig) {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.engine.log_level)),
    )
    .json()
    .init();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_default_config_validates() {
    assert!(validate_config(&EngineConfig::default()).is_ok());
  }

  #[test]
  fn test_zero_liquidity_rejected() {
    let mut config = EngineConfig::default();
    config.market.initial_liquidity = Decimal::ZERO;
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_oversized_tolerance_rejected() {
    let mut config = EngineConfig::default();
    config.pricing.invariant_tolerance = dec!(0.5);
    assert!(validate_config(&config).is_err());
  }
}
