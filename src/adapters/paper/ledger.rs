//! Paper Ledger - Simulated Wallet and Settlement
//!
//! Holds one account's balances and settles submitted tickets against
//! them at the quoted receive amount. Implements both the balance and
//! the submission ports so a session can run end to end offline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::order::{OrderSide, OrderTicket, TokenAddress};
use crate::ports::balance_provider::BalanceProvider;
use crate::ports::order_submitter::{LedgerStatus, OrderSubmitter, SubmitAction, SubmitPayload};

/// Simulated wallet with in-memory balances.
pub struct PaperLedger {
    balances: RwLock<HashMap<TokenAddress, Decimal>>,
    approve: AtomicBool,
    sequence: AtomicU64,
}

impl PaperLedger {
    pub fn new(balances: HashMap<TokenAddress, Decimal>, approve: bool) -> Self {
        Self {
            balances: RwLock::new(balances),
            approve: AtomicBool::new(approve),
            sequence: AtomicU64::new(0),
        }
    }

    /// Whether the simulated user approves the next submissions.
    pub fn set_approval(&self, approve: bool) {
        info!(approve, "Paper wallet approval changed");
        self.approve.store(approve, Ordering::SeqCst);
    }

    pub async fn balance_of(&self, token: &str) -> Decimal {
        let balances = self.balances.read().await;
        balances.get(token).copied().unwrap_or(Decimal::ZERO)
    }

    /// Number of transactions settled so far.
    pub fn settled(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceProvider for PaperLedger {
    async fn fetch_balances(&self, wallet: &str) -> anyhow::Result<HashMap<TokenAddress, Decimal>> {
        debug!(wallet, "Paper balances read");
        Ok(self.balances.read().await.clone())
    }
}

#[async_trait]
impl OrderSubmitter for PaperLedger {
    async fn submit_order(&self, ticket: &OrderTicket) -> anyhow::Result<SubmitAction> {
        if !self.approve.load(Ordering::SeqCst) {
            return Ok(SubmitAction::Rejected {
                reason: "User rejected the transaction in the wallet".to_string(),
            });
        }

        let (spent, received) = match ticket.side {
            OrderSide::Buy => (&ticket.token2, &ticket.token1),
            OrderSide::Sell => (&ticket.token1, &ticket.token2),
        };
        let spend = spent.amount.value();

        let mut balances = self.balances.write().await;
        let available = balances.get(&spent.address).copied().unwrap_or(Decimal::ZERO);
        if available < spend {
            warn!(
                token = %spent.symbol,
                %available,
                %spend,
                "Paper settlement failed"
            );
            return Ok(SubmitAction::Fulfilled {
                payload: SubmitPayload {
                    status: LedgerStatus::Error,
                    transaction_id: None,
                    message: Some(format!("Insufficient {} balance", spent.symbol)),
                },
            });
        }

        *balances.entry(spent.address.clone()).or_default() -= spend;
        *balances.entry(received.address.clone()).or_default() += ticket.quote.to_amount;

        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let transaction_id = format!("txid_paper_{n:06}_{}", ticket.client_order_id.simple());
        info!(
            transaction_id = %transaction_id,
            spent = %spend,
            received = %ticket.quote.to_amount,
            "Paper order settled"
        );

        Ok(SubmitAction::Fulfilled {
            payload: SubmitPayload {
                status: LedgerStatus::Ok,
                transaction_id: Some(transaction_id),
                message: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::domain::order::{AmountInput, Leg, OrderType, TokenInfo, TokenLeg};
    use crate::domain::quote::Quote;

    fn ticket(side: OrderSide, t1: Decimal, t2: Decimal, to_amount: Decimal) -> OrderTicket {
        let leg = |address: &str, symbol: &str, amount: Decimal| TokenLeg {
            address: address.to_string(),
            symbol: symbol.to_string(),
            amount: AmountInput::Value(amount),
        };
        OrderTicket {
            client_order_id: Uuid::new_v4(),
            pair_address: "component_dextr_xrd".to_string(),
            side,
            order_type: OrderType::Market,
            price: None,
            specified: Leg::Token1,
            token1: leg("resource_dextr", "DEXTR", t1),
            token2: leg("resource_xrd", "XRD", t2),
            post_only: false,
            quote: Quote {
                to_amount,
                to_token: TokenInfo::new("resource_dextr", "DEXTR"),
                exchange_fees: Decimal::ZERO,
                platform_fees: Decimal::ZERO,
                liquidity_fees: Decimal::ZERO,
            },
            created_at: Utc::now(),
        }
    }

    fn ledger(approve: bool) -> PaperLedger {
        PaperLedger::new(HashMap::from([("resource_xrd".to_string(), dec!(100))]), approve)
    }

    #[tokio::test]
    async fn test_buy_moves_balances() {
        let ledger = ledger(true);
        let action = ledger
            .submit_order(&ticket(OrderSide::Buy, dec!(10), dec!(20), dec!(9.9)))
            .await
            .unwrap();
        match action {
            SubmitAction::Fulfilled { payload } => {
                assert_eq!(payload.status, LedgerStatus::Ok);
                assert!(payload.transaction_id.unwrap().starts_with("txid_paper_000001"));
            }
            other => panic!("unexpected action: {other:?}"),
        }
        assert_eq!(ledger.balance_of("resource_xrd").await, dec!(80));
        assert_eq!(ledger.balance_of("resource_dextr").await, dec!(9.9));
        assert_eq!(ledger.settled(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_funds_is_ledger_error() {
        let ledger = ledger(true);
        let action = ledger
            .submit_order(&ticket(OrderSide::Sell, dec!(5), dec!(10), dec!(10)))
            .await
            .unwrap();
        match action {
            SubmitAction::Fulfilled { payload } => {
                assert_eq!(payload.status, LedgerStatus::Error);
                assert_eq!(payload.message.as_deref(), Some("Insufficient DEXTR balance"));
            }
            other => panic!("unexpected action: {other:?}"),
        }
        assert_eq!(ledger.balance_of("resource_xrd").await, dec!(100));
    }

    #[tokio::test]
    async fn test_rejection_when_not_approved() {
        let ledger = ledger(false);
        let action = ledger
            .submit_order(&ticket(OrderSide::Buy, dec!(1), dec!(2), dec!(1)))
            .await
            .unwrap();
        assert!(matches!(action, SubmitAction::Rejected { .. }));

        ledger.set_approval(true);
        assert_eq!(ledger.settled(), 0);
    }
}
