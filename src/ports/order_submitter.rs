//! Order Submitter Port - Wallet-signed Order Submission
//!
//! Defines the trait that hands a validated order ticket to the
//! wallet/exchange and reports how the attempt ended.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::order::OrderTicket;

/// On-ledger status reported for a fulfilled submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerStatus {
  Ok,
  Error,
  /// Any other status string; treated as success.
  #[serde(other)]
  Unknown,
}

/// Payload of a fulfilled submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitPayload {
  pub status: LedgerStatus,
  /// Transaction identifier, when the ledger assigned one.
  #[serde(default)]
  pub transaction_id: Option<String>,
  /// Error or info text from the ledger.
  #[serde(default)]
  pub message: Option<String>,
}

/// How a submission action ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmitAction {
  /// The wallet signed and the transaction reached the network.
  Fulfilled { payload: SubmitPayload },
  /// The user rejected or cancelled at the wallet.
  Rejected { reason: String },
}

/// Trait for order submission collaborators.
#[async_trait]
pub trait OrderSubmitter: Send + Sync + 'static {
  /// Submit a validated order.
  ///
  /// # Errors
  /// Returns error if the request could not be made at all; callers
  /// treat it the same as a non-fulfilled action.
  async fn submit_order(&self, ticket: &OrderTicket) -> anyhow::Result<SubmitAction>;
}
