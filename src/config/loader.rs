//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    session = %config.session.name,
    pairs = config.pairs.len(),
    quote_debounce_ms = config.engine.quote_debounce_ms,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).with_context(|| "Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - At least one fully described, uniquely addressed pair
/// - Non-negative book prices, fees and balances
/// - A usable decimal separator
fn validate_config(config: &AppConfig) -> Result<()> {
  // Pair validation
  anyhow::ensure!(
    !config.pairs.is_empty(),
    "At least one trading pair must be configured"
  );

  let mut seen = HashSet::new();
  for (i, pair) in config.pairs.iter().enumerate() {
    anyhow::ensure!(
      !pair.address.trim().is_empty(),
      "Pair {} ({}) has empty address",
      i,
      pair.name
    );
    anyhow::ensure!(
      seen.insert(pair.address.as_str()),
      "Pair {} ({}) duplicates address {}",
      i,
      pair.name,
      pair.address
    );
    anyhow::ensure!(
      !pair.token1_address.is_empty() && !pair.token2_address.is_empty(),
      "Pair {} ({}) has an empty token address",
      i,
      pair.name
    );
    anyhow::ensure!(
      pair.token1_address != pair.token2_address,
      "Pair {} ({}) trades a token against itself",
      i,
      pair.name
    );
    anyhow::ensure!(
      pair.best_buy >= Decimal::ZERO && pair.best_sell >= Decimal::ZERO,
      "Pair {} ({}) has a negative book price",
      i,
      pair.name
    );
  }

  // Engine validation
  anyhow::ensure!(
    config.engine.fee_allowance >= Decimal::ZERO,
    "fee_allowance must not be negative, got {}",
    config.engine.fee_allowance
  );
  anyhow::ensure!(
    config.engine.input_scale <= 18,
    "input_scale must be at most 18, got {}",
    config.engine.input_scale
  );
  anyhow::ensure!(
    !config.engine.fee_asset_symbol.is_empty(),
    "fee_asset_symbol must not be empty"
  );

  // Session validation
  anyhow::ensure!(
    matches!(config.session.decimal_separator, '.' | ','),
    "decimal_separator must be '.' or ',', got {:?}",
    config.session.decimal_separator
  );

  // Paper collaborator validation
  let paper = &config.paper;
  anyhow::ensure!(
    paper.max_fill > Decimal::ZERO,
    "paper.max_fill must be positive"
  );
  anyhow::ensure!(
    [paper.exchange_fee_bps, paper.platform_fee_bps, paper.liquidity_fee_bps]
      .iter()
      .all(|bps| *bps >= Decimal::ZERO),
    "paper fee rates must not be negative"
  );
  anyhow::ensure!(
    paper.balances.values().all(|b| *b >= Decimal::ZERO),
    "paper balances must not be negative"
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  const MINIMAL: &str = r#"
    [session]
    name = "test"

    [[pairs]]
    name = "DEXTR/XRD"
    address = "component_dextr_xrd"
    token1_address = "resource_dextr"
    token1_symbol = "DEXTR"
    token2_address = "resource_xrd"
    token2_symbol = "XRD"
    best_buy = "0.95"
    best_sell = "1.05"
  "#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_defaults_applied() {
    let config = parse_config(MINIMAL).unwrap();
    assert_eq!(config.engine.quote_debounce_ms, 250);
    assert_eq!(config.engine.percentage_debounce_ms, 350);
    assert_eq!(config.session.decimal_separator, '.');
    assert!(!config.metrics.enabled);

    let policy = config.engine.percentage_policy();
    assert_eq!(policy.fee_asset_symbol, "XRD");
    assert_eq!(policy.fee_allowance, dec!(3));
    assert_eq!(policy.truncate_decimals, Some(8));

    let book = config.pairs[0].top_of_book();
    assert_eq!(book.best_buy, dec!(0.95));
    assert_eq!(config.pairs[0].trading_pair().token2.symbol, "XRD");
  }

  #[test]
  fn test_negative_truncation_disables_it() {
    let content = format!("{MINIMAL}\n[engine]\ntruncate_decimals = -1\n");
    let config = parse_config(&content).unwrap();
    assert_eq!(config.engine.percentage_policy().truncate_decimals, None);
  }

  #[test]
  fn test_rejects_empty_pairs() {
    let result = parse_config("pairs = []\n[session]\nname = \"x\"\n");
    assert!(result.is_err());
  }

  #[test]
  fn test_rejects_duplicate_pair_address() {
    let pair = MINIMAL.split("[[pairs]]").nth(1).unwrap();
    let content = format!("{MINIMAL}\n[[pairs]]{pair}");
    let error = parse_config(&content).unwrap_err();
    assert!(error.to_string().contains("duplicates"));
  }

  #[test]
  fn test_rejects_bad_separator() {
    let content = MINIMAL.replace("name = \"test\"", "name = \"test\"\ndecimal_separator = \";\"");
    assert!(parse_config(&content).is_err());
  }
}
