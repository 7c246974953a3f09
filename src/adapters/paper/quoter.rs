//! Paper Quoter - Simulated Quote Collaborator
//!
//! Prices an order shape against a configured top of book: LIMIT
//! orders at their own price, MARKET orders at the best opposing
//! price. Fees are charged in the received token and anything above
//! the configured fill capacity is reported as a liquidity error, the
//! same way a real quote service flags an unfillable order.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::PaperConfig;
use crate::domain::decimal::{divide, multiply, truncate_with_precision};
use crate::domain::order::{OrderSide, OrderType, PairAddress, SpecifiedToken, TopOfBook, TradingPair};
use crate::domain::quote::{Quote, QuoteKey, QuoteResponse};
use crate::ports::quote_provider::QuoteProvider;

const BPS_DIVISOR: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
const QUOTE_PRECISION: u32 = 8;

/// Fee rates in basis points of the received amount.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaperFees {
    pub exchange_bps: Decimal,
    pub platform_bps: Decimal,
    pub liquidity_bps: Decimal,
}

/// Simulated quote service.
pub struct PaperQuoter {
    books: RwLock<HashMap<PairAddress, (TradingPair, TopOfBook)>>,
    latency: Duration,
    max_fill: Decimal,
    fees: PaperFees,
}

impl PaperQuoter {
    pub fn new(latency: Duration, max_fill: Decimal, fees: PaperFees) -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
            latency,
            max_fill,
            fees,
        }
    }

    /// Build from the `[paper]` config section.
    pub fn from_config(config: &PaperConfig) -> Self {
        Self::new(
            Duration::from_millis(config.quote_latency_ms),
            config.max_fill,
            PaperFees {
                exchange_bps: config.exchange_fee_bps,
                platform_bps: config.platform_fee_bps,
                liquidity_bps: config.liquidity_fee_bps,
            },
        )
    }

    /// Register a pair or replace its top of book.
    pub async fn set_book(&self, pair: &TradingPair, book: TopOfBook) {
        let mut books = self.books.write().await;
        books.insert(pair.address.clone(), (pair.clone(), book));
    }

    fn price_quote(&self, pair: &TradingPair, book: &TopOfBook, key: &QuoteKey) -> QuoteResponse {
        let price = match key.order_type {
            OrderType::Limit => key.price,
            OrderType::Market => book.opposing(key.side),
        };
        if price <= Decimal::ZERO {
            return QuoteResponse {
                error: Some("No liquidity available on this side of the book".to_string()),
                ..QuoteResponse::default()
            };
        }

        let (sent, sent_symbol, to_token) = match key.side {
            OrderSide::Buy => (key.token2_amount, &pair.token2.symbol, &pair.token1),
            OrderSide::Sell => (key.token1_amount, &pair.token1.symbol, &pair.token2),
        };
        let gross = match (key.side, key.specified) {
            (OrderSide::Buy, SpecifiedToken::Token1) => Ok(key.token1_amount),
            (OrderSide::Buy, _) => divide(key.token2_amount, price),
            (OrderSide::Sell, SpecifiedToken::Token2) => Ok(key.token2_amount),
            (OrderSide::Sell, _) => multiply(key.token1_amount, price),
        };
        let Ok(gross) = gross else {
            return QuoteResponse {
                error: Some("Order size cannot be priced".to_string()),
                ..QuoteResponse::default()
            };
        };

        if gross > self.max_fill {
            return QuoteResponse {
                error: Some(format!(
                    "Insufficient liquidity: at most {} {} can be filled",
                    self.max_fill, to_token.symbol
                )),
                ..QuoteResponse::default()
            };
        }

        let fee = |bps: Decimal| {
            multiply(gross, bps)
                .and_then(|v| divide(v, BPS_DIVISOR))
                .map(|v| truncate_with_precision(v, QUOTE_PRECISION))
                .unwrap_or(Decimal::ZERO)
        };
        let exchange_fees = fee(self.fees.exchange_bps);
        let platform_fees = fee(self.fees.platform_bps);
        let liquidity_fees = fee(self.fees.liquidity_bps);
        let to_amount = truncate_with_precision(
            (gross - exchange_fees - platform_fees - liquidity_fees).max(Decimal::ZERO),
            QUOTE_PRECISION,
        );

        QuoteResponse {
            description: Some(format!(
                "Sending {} {} to receive ~{} {} at {}",
                sent.normalize(),
                sent_symbol,
                to_amount,
                to_token.symbol,
                price.normalize()
            )),
            quote: Some(Quote {
                to_amount,
                to_token: to_token.clone(),
                exchange_fees,
                platform_fees,
                liquidity_fees,
            }),
            error: None,
        }
    }
}

#[async_trait]
impl QuoteProvider for PaperQuoter {
    async fn fetch_quote(&self, shape: &QuoteKey) -> anyhow::Result<QuoteResponse> {
        tokio::time::sleep(self.latency).await;

        let books = self.books.read().await;
        let Some((pair, book)) = books.get(&shape.pair_address) else {
            anyhow::bail!("unknown pair {}", shape.pair_address);
        };
        let response = self.price_quote(pair, book, shape);
        debug!(
            pair = %pair.name,
            side = %shape.side,
            error = ?response.error,
            "Paper quote priced"
        );
        Ok(response)
    }
}
