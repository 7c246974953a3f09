//! Wallet Balances Use Case - Balance Cache for the Connected Wallet
//!
//! Caches the connected wallet's balances by token address and hands
//! out the two-leg snapshot every order transition is computed
//! against. A failed refresh keeps the last known values.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::domain::order::{Balances, TokenAddress, TradingPair};
use crate::ports::balance_provider::BalanceProvider;

/// Balance cache for at most one connected wallet.
pub struct WalletBalances<B: BalanceProvider> {
  provider: Arc<B>,
  wallet: Option<String>,
  balances: HashMap<TokenAddress, Decimal>,
  updated_at: Option<DateTime<Utc>>,
}

impl<B: BalanceProvider> WalletBalances<B> {
  /// Create a cache with no wallet connected.
  pub fn new(provider: Arc<B>) -> Self {
    Self {
      provider,
      wallet: None,
      balances: HashMap::new(),
      updated_at: None,
    }
  }

  /// Switch to `wallet` (or disconnect with `None`). Cached balances
  /// belong to the previous wallet and are dropped.
  pub fn connect(&mut self, wallet: Option<String>) {
    info!(wallet = ?wallet, "Wallet changed");
    self.wallet = wallet;
    self.balances.clear();
    self.updated_at = None;
  }

  pub fn wallet(&self) -> Option<&str> {
    self.wallet.as_deref()
  }

  pub const fn is_connected(&self) -> bool {
    self.wallet.is_some()
  }

  pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
    self.updated_at
  }

  /// Re-read all balances for the connected wallet.
  ///
  /// Returns the number of tokens held; 0 when no wallet is connected.
  #[instrument(skip(self), fields(wallet = ?self.wallet))]
  pub async fn refresh(&mut self) -> Result<usize> {
    let Some(wallet) = self.wallet.clone() else {
      return Ok(0);
    };

    let fetched = self
      .provider
      .fetch_balances(&wallet)
      .await
      .context("Failed to fetch wallet balances");

    match fetched {
      Ok(balances) => {
        self.balances = balances;
        self.updated_at = Some(Utc::now());
        info!(tokens = self.balances.len(), "Wallet balances refreshed");
        Ok(self.balances.len())
      }
      Err(e) => {
        warn!(error = %e, "Keeping last known balances");
        Err(e)
      }
    }
  }

  /// Balance of `token`. `None` without a wallet; zero when the wallet
  /// does not hold the token.
  pub fn balance_of(&self, token: &str) -> Option<Decimal> {
    self.wallet.as_ref()?;
    Some(self.balances.get(token).copied().unwrap_or(Decimal::ZERO))
  }

  /// Two-leg snapshot for `pair`.
  pub fn for_pair(&self, pair: Option<&TradingPair>) -> Balances {
    pair.map_or_else(Balances::default, |pair| Balances {
      token1: self.balance_of(&pair.token1.address),
      token2: self.balance_of(&pair.token2.address),
    })
  }
}
