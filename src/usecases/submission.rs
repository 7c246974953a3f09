//! Submission Use Case - Order Hand-off and Outcome Mapping
//!
//! Checks the submit preconditions, packages the order as a ticket
//! and maps the collaborator's answer onto exactly one of three
//! outcomes:
//! - `Succeeded`: fulfilled and not reported as a ledger error
//! - `UserActionFailed`: rejected at the wallet, or the call failed
//! - `LedgerFailed`: fulfilled, but the ledger reported an error

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::order::{OrderTicket, OrderType};
use crate::domain::state::OrderState;
use crate::ports::order_submitter::{LedgerStatus, OrderSubmitter, SubmitAction};

/// Shown when the ledger reports an error without a message.
const LEDGER_FAILURE_FALLBACK: &str = "Transaction failed on ledger";

/// Why an order cannot be submitted right now.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionRefusal {
  #[error("connect a wallet to trade")]
  WalletNotConnected,

  #[error("order has validation errors")]
  InvalidOrder,

  #[error("order amount is zero")]
  ZeroAmount,

  #[error("quote failed: {0}")]
  QuoteFailed(String),

  #[error("no quote for the current order")]
  MissingQuote,
}

impl SubmissionRefusal {
  /// Short label for logs and metrics.
  pub const fn label(&self) -> &'static str {
    match self {
      Self::WalletNotConnected => "wallet_not_connected",
      Self::InvalidOrder => "invalid_order",
      Self::ZeroAmount => "zero_amount",
      Self::QuoteFailed(_) => "quote_failed",
      Self::MissingQuote => "missing_quote",
    }
  }
}

/// How a submission attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
  Succeeded {
    client_order_id: Uuid,
    transaction_id: Option<String>,
  },
  UserActionFailed {
    reason: String,
  },
  LedgerFailed {
    message: String,
  },
}

impl SubmissionOutcome {
  pub const fn is_success(&self) -> bool {
    matches!(self, Self::Succeeded { .. })
  }

  /// Short label for logs and metrics.
  pub const fn label(&self) -> &'static str {
    match self {
      Self::Succeeded { .. } => "succeeded",
      Self::UserActionFailed { .. } => "user_action_failed",
      Self::LedgerFailed { .. } => "ledger_failed",
    }
  }
}

/// Checks preconditions and packages the current order.
///
/// Preconditions in order: a wallet is connected, the order is valid,
/// neither leg is zero, and a quote is held without an error.
pub fn prepare_ticket(
  state: &OrderState,
  wallet_connected: bool,
) -> Result<OrderTicket, SubmissionRefusal> {
  if !wallet_connected {
    return Err(SubmissionRefusal::WalletNotConnected);
  }
  if !state.is_valid() {
    return Err(SubmissionRefusal::InvalidOrder);
  }
  if state.has_zero_amount() {
    return Err(SubmissionRefusal::ZeroAmount);
  }
  if let Some(error) = state.quote_error() {
    return Err(SubmissionRefusal::QuoteFailed(error.to_string()));
  }
  let quote = state.quote().ok_or(SubmissionRefusal::MissingQuote)?;
  let specified = state
    .specified()
    .leg()
    .ok_or(SubmissionRefusal::InvalidOrder)?;

  Ok(OrderTicket {
    client_order_id: Uuid::new_v4(),
    pair_address: state.pair_address().to_string(),
    side: state.side(),
    order_type: state.order_type(),
    price: (state.order_type() == OrderType::Limit).then_some(state.price()),
    specified,
    token1: state.token1().clone(),
    token2: state.token2().clone(),
    post_only: state.post_only(),
    quote: quote.clone(),
    created_at: Utc::now(),
  })
}

/// Hands tickets to the submission port.
pub struct SubmissionController<S: OrderSubmitter> {
  submitter: Arc<S>,
}

impl<S: OrderSubmitter> SubmissionController<S> {
  pub const fn new(submitter: Arc<S>) -> Self {
    Self { submitter }
  }

  /// Submit `ticket` and classify the result.
  #[instrument(skip(self, ticket), fields(
    client_order_id = %ticket.client_order_id,
    side = %ticket.side,
    order_type = %ticket.order_type,
  ))]
  pub async fn submit(&self, ticket: &OrderTicket) -> SubmissionOutcome {
    let outcome = match self.submitter.submit_order(ticket).await {
      Ok(SubmitAction::Fulfilled { payload }) if payload.status == LedgerStatus::Error => {
        SubmissionOutcome::LedgerFailed {
          message: payload
            .message
            .unwrap_or_else(|| LEDGER_FAILURE_FALLBACK.to_string()),
        }
      }
      Ok(SubmitAction::Fulfilled { payload }) => SubmissionOutcome::Succeeded {
        client_order_id: ticket.client_order_id,
        transaction_id: payload.transaction_id,
      },
      Ok(SubmitAction::Rejected { reason }) => SubmissionOutcome::UserActionFailed { reason },
      Err(e) => SubmissionOutcome::UserActionFailed {
        reason: format!("{e:#}"),
      },
    };

    if outcome.is_success() {
      info!(outcome = outcome.label(), "Order submitted");
    } else {
      warn!(outcome = ?outcome, "Order submission failed");
    }
    outcome
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal::Decimal;
  use rust_decimal_macros::dec;

  use crate::domain::order::{AmountInput, Balances, Leg, TokenInfo, TopOfBook, TradingPair};
  use crate::domain::quote::{Quote, QuoteResponse};
  use crate::domain::state::TokenAmountUpdate;

  fn pair() -> TradingPair {
    TradingPair {
      address: "component_dextr_xrd".to_string(),
      name: "DEXTR/XRD".to_string(),
      token1: TokenInfo::new("resource_dextr", "DEXTR"),
      token2: TokenInfo::new("resource_xrd", "XRD"),
    }
  }

  fn limit_order(amount: Decimal) -> OrderState {
    let mut state = OrderState::for_pair(&pair());
    let _ = state.set_type(OrderType::Limit);
    let _ = state.set_price(AmountInput::Value(dec!(2)), &Balances::default());
    let _ = state.set_token_amount(&TokenAmountUpdate {
      leg: Leg::Token1,
      amount: AmountInput::Value(amount),
      book: TopOfBook::default(),
      balances: Balances::default(),
    });
    state
  }

  fn quoted(mut state: OrderState) -> OrderState {
    let key = state.quote_key();
    let _ = state.apply_quote(
      &key,
      Ok(QuoteResponse {
        quote: Some(Quote {
          to_amount: dec!(5),
          to_token: pair().token1,
          exchange_fees: dec!(0.01),
          platform_fees: Decimal::ZERO,
          liquidity_fees: Decimal::ZERO,
        }),
        ..QuoteResponse::default()
      }),
    );
    state
  }

  #[test]
  fn test_wallet_checked_first() {
    let state = OrderState::new();
    assert_eq!(
      prepare_ticket(&state, false),
      Err(SubmissionRefusal::WalletNotConnected)
    );
    assert_eq!(prepare_ticket(&state, true), Err(SubmissionRefusal::InvalidOrder));
  }

  #[test]
  fn test_quote_required() {
    let state = limit_order(dec!(5));
    assert_eq!(prepare_ticket(&state, true), Err(SubmissionRefusal::MissingQuote));

    let mut failed = limit_order(dec!(5));
    let key = failed.quote_key();
    let _ = failed.apply_quote(&key, Err("no liquidity".to_string()));
    assert_eq!(
      prepare_ticket(&failed, true),
      Err(SubmissionRefusal::QuoteFailed("no liquidity".to_string()))
    );
  }

  #[test]
  fn test_ticket_carries_order() {
    let state = quoted(limit_order(dec!(5)));
    let ticket = prepare_ticket(&state, true).unwrap();
    assert_eq!(ticket.price, Some(dec!(2)));
    assert_eq!(ticket.specified, Leg::Token1);
    assert_eq!(ticket.specified_amount(), dec!(5));
    assert_eq!(ticket.token2.amount, AmountInput::Value(dec!(10)));
    assert_eq!(ticket.quote.to_amount, dec!(5));
  }

  #[test]
  fn test_outcome_labels() {
    let ok = SubmissionOutcome::Succeeded {
      client_order_id: Uuid::nil(),
      transaction_id: None,
    };
    assert!(ok.is_success());
    assert_eq!(ok.label(), "succeeded");
    assert_eq!(
      SubmissionOutcome::LedgerFailed {
        message: String::new()
      }
      .label(),
      "ledger_failed"
    );
  }
}
