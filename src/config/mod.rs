//! Configuration Module - TOML-based Session Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Trading pairs, debounce windows, the fee-asset policy and the
//! paper collaborators are externalized here - nothing venue-specific
//! is hardcoded in the domain layer.

pub mod loader;

use std::collections::HashMap;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::domain::order::{TokenInfo, TopOfBook, TradingPair};
use crate::domain::percentage::PercentagePolicy;

/// Top-level configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the session starts.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Session identity and presentation.
  pub session: SessionConfig,
  /// Order input engine tuning.
  #[serde(default)]
  pub engine: EngineConfig,
  /// Selectable trading pairs.
  pub pairs: Vec<PairConfig>,
  /// Paper collaborators standing in for the DEX.
  #[serde(default)]
  pub paper: PaperConfig,
  /// Metrics and monitoring.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Session identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
  /// Human-readable session name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Emit JSON log lines instead of the human-readable format.
  #[serde(default = "default_true")]
  pub json_logs: bool,
  /// Decimal separator used when echoing typed amounts.
  #[serde(default = "default_separator")]
  pub decimal_separator: char,
  /// Wallet connected at startup, if any.
  pub wallet: Option<String>,
}

/// Order input engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
  /// Quiescence before a quote is fetched (milliseconds).
  #[serde(default = "default_quote_debounce")]
  pub quote_debounce_ms: u64,
  /// Quiescence before a slider percentage is applied (milliseconds).
  #[serde(default = "default_percentage_debounce")]
  pub percentage_debounce_ms: u64,
  /// Symbol of the network fee asset.
  #[serde(default = "default_fee_asset")]
  pub fee_asset_symbol: String,
  /// Fee asset kept back when 100% of its balance is requested.
  #[serde(default = "default_fee_allowance")]
  pub fee_allowance: Decimal,
  /// Fractional digits percentage amounts are truncated to.
  /// Set to a negative value to keep full precision.
  #[serde(default = "default_truncate_decimals")]
  pub truncate_decimals: i32,
  /// Fractional digits accepted in typed amounts.
  #[serde(default = "default_input_scale")]
  pub input_scale: u32,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      quote_debounce_ms: default_quote_debounce(),
      percentage_debounce_ms: default_percentage_debounce(),
      fee_asset_symbol: default_fee_asset(),
      fee_allowance: default_fee_allowance(),
      truncate_decimals: default_truncate_decimals(),
      input_scale: default_input_scale(),
    }
  }
}

impl EngineConfig {
  pub const fn quote_debounce(&self) -> Duration {
    Duration::from_millis(self.quote_debounce_ms)
  }

  pub const fn percentage_debounce(&self) -> Duration {
    Duration::from_millis(self.percentage_debounce_ms)
  }

  pub fn percentage_policy(&self) -> PercentagePolicy {
    PercentagePolicy {
      fee_asset_symbol: self.fee_asset_symbol.clone(),
      fee_allowance: self.fee_allowance,
      truncate_decimals: u32::try_from(self.truncate_decimals).ok(),
    }
  }
}

/// Individual trading pair configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PairConfig {
  /// Display name, e.g. `DEXTR/XRD`.
  pub name: String,
  /// Pair component address.
  pub address: String,
  pub token1_address: String,
  pub token1_symbol: String,
  pub token2_address: String,
  pub token2_symbol: String,
  /// Initial highest bid. Zero means no bids.
  #[serde(default)]
  pub best_buy: Decimal,
  /// Initial lowest ask. Zero means no asks.
  #[serde(default)]
  pub best_sell: Decimal,
}

impl PairConfig {
  pub fn trading_pair(&self) -> TradingPair {
    TradingPair {
      address: self.address.clone(),
      name: self.name.clone(),
      token1: TokenInfo::new(&self.token1_address, &self.token1_symbol),
      token2: TokenInfo::new(&self.token2_address, &self.token2_symbol),
    }
  }

  pub const fn top_of_book(&self) -> TopOfBook {
    TopOfBook {
      best_buy: self.best_buy,
      best_sell: self.best_sell,
    }
  }
}

/// Paper quoter and ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaperConfig {
  /// Simulated quote latency (milliseconds).
  #[serde(default = "default_quote_latency")]
  pub quote_latency_ms: u64,
  /// Largest amount of the received token the book can fill.
  #[serde(default = "default_max_fill")]
  pub max_fill: Decimal,
  #[serde(default = "default_exchange_fee_bps")]
  pub exchange_fee_bps: Decimal,
  #[serde(default)]
  pub platform_fee_bps: Decimal,
  #[serde(default = "default_liquidity_fee_bps")]
  pub liquidity_fee_bps: Decimal,
  /// Whether the simulated wallet approves submissions.
  #[serde(default = "default_true")]
  pub approve_submissions: bool,
  /// Starting balances by token address.
  #[serde(default)]
  pub balances: HashMap<String, Decimal>,
}

impl Default for PaperConfig {
  fn default() -> Self {
    Self {
      quote_latency_ms: default_quote_latency(),
      max_fill: default_max_fill(),
      exchange_fee_bps: default_exchange_fee_bps(),
      platform_fee_bps: Decimal::ZERO,
      liquidity_fee_bps: default_liquidity_fee_bps(),
      approve_submissions: true,
      balances: HashMap::new(),
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default)]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      bind_address: default_metrics_addr(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

const fn default_true() -> bool {
  true
}

const fn default_separator() -> char {
  '.'
}

const fn default_quote_debounce() -> u64 {
  250
}

const fn default_percentage_debounce() -> u64 {
  350
}

fn default_fee_asset() -> String {
  "XRD".to_string()
}

fn default_fee_allowance() -> Decimal {
  dec!(3)
}

const fn default_truncate_decimals() -> i32 {
  8
}

const fn default_input_scale() -> u32 {
  8
}

const fn default_quote_latency() -> u64 {
  120
}

fn default_max_fill() -> Decimal {
  dec!(1000000)
}

fn default_exchange_fee_bps() -> Decimal {
  dec!(10)
}

fn default_liquidity_fee_bps() -> Decimal {
  dec!(5)
}

fn default_metrics_addr() -> String {
  "127.0.0.1:9090".to_string()
}
