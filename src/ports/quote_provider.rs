//! Quote Provider Port - Trade Outcome Estimates
//!
//! Defines the trait for fetching a quote (receive amount and fees)
//! for a prospective order shape. Callers debounce; implementations
//! must tolerate being called repeatedly with overlapping requests.

use async_trait::async_trait;

use crate::domain::quote::{QuoteKey, QuoteResponse};

/// Trait for quote collaborators.
///
/// There is no cancellation: a superseded request may still complete,
/// and its result is ignored by the caller.
#[async_trait]
pub trait QuoteProvider: Send + Sync + 'static {
  /// Fetch a quote for the given order shape.
  ///
  /// # Errors
  /// Returns error on transport failure. Business-level problems
  /// (e.g. insufficient liquidity) are reported in `QuoteResponse::error`.
  async fn fetch_quote(&self, shape: &QuoteKey) -> anyhow::Result<QuoteResponse>;
}
