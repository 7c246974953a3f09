//! Balance Provider Port - Wallet Balances
//!
//! Defines the trait for reading the connected wallet's fungible
//! balances, keyed by token address.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::order::TokenAddress;

/// Trait for balance collaborators.
#[async_trait]
pub trait BalanceProvider: Send + Sync + 'static {
  /// Fetch all balances held by `wallet`.
  ///
  /// Tokens missing from the map are treated as a zero balance.
  ///
  /// # Errors
  /// Returns error if the balances cannot be read; callers keep their
  /// last known values.
  async fn fetch_balances(&self, wallet: &str) -> anyhow::Result<HashMap<TokenAddress, Decimal>>;
}
