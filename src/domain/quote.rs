//! Quote artifacts and the relevance key used to reject stale quotes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::decimal::truncate_with_precision;
use super::order::{OrderSide, OrderType, PairAddress, SpecifiedToken, TokenInfo};

/// Fractional digits shown for the estimated receive amount.
pub const ESTIMATE_DISPLAY_DECIMALS: u32 = 2;

/// External estimate of a trade outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Amount received.
    pub to_amount: Decimal,
    /// Token received.
    pub to_token: TokenInfo,
    #[serde(default)]
    pub exchange_fees: Decimal,
    #[serde(default)]
    pub platform_fees: Decimal,
    #[serde(default)]
    pub liquidity_fees: Decimal,
}

impl Quote {
    pub fn fees(&self) -> FeeBreakdown {
        FeeBreakdown {
            exchange: self.exchange_fees,
            platform: self.platform_fees,
            liquidity: self.liquidity_fees,
        }
    }
}

/// Payload returned by the quote collaborator.
///
/// An `error` with no `quote` is a quote failure; both can be present
/// when the collaborator prices the order but flags it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub quote: Option<Quote>,
    /// Human-readable explanation of the estimate.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Everything a quote depends on. A quote fetched for one key is
/// irrelevant as soon as the order's current key differs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteKey {
    pub pair_address: PairAddress,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub price: Decimal,
    pub specified: SpecifiedToken,
    pub token1_amount: Decimal,
    pub token2_amount: Decimal,
}

/// Quote fees split by recipient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub exchange: Decimal,
    pub platform: Decimal,
    pub liquidity: Decimal,
}

impl FeeBreakdown {
    pub fn total(&self) -> Decimal {
        self.exchange + self.platform + self.liquidity
    }

    /// Fees are paid in the received token: token1 on BUY, token2 on SELL.
    pub fn currency<'a>(side: OrderSide, token1_symbol: &'a str, token2_symbol: &'a str) -> &'a str {
        match side {
            OrderSide::Buy => token1_symbol,
            OrderSide::Sell => token2_symbol,
        }
    }
}

/// "~ amount symbol" line shown under MARKET orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedTotal {
    pub amount: Decimal,
    pub symbol: String,
}

impl EstimatedTotal {
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            amount: truncate_with_precision(quote.to_amount, ESTIMATE_DISPLAY_DECIMALS),
            symbol: quote.to_token.symbol.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_quote() -> Quote {
        Quote {
            to_amount: dec!(41.23987),
            to_token: TokenInfo::new("resource_xrd", "XRD"),
            exchange_fees: dec!(0.1),
            platform_fees: dec!(0.05),
            liquidity_fees: dec!(0.025),
        }
    }

    #[test]
    fn test_fee_total() {
        assert_eq!(sample_quote().fees().total(), dec!(0.175));
    }

    #[test]
    fn test_fee_currency_is_received_token() {
        assert_eq!(FeeBreakdown::currency(OrderSide::Buy, "DEXTR", "XRD"), "DEXTR");
        assert_eq!(FeeBreakdown::currency(OrderSide::Sell, "DEXTR", "XRD"), "XRD");
    }

    #[test]
    fn test_estimated_total_truncates() {
        let est = EstimatedTotal::from_quote(&sample_quote());
        assert_eq!(est.amount, dec!(41.23));
        assert_eq!(est.symbol, "XRD");
    }

    #[test]
    fn test_quote_payload_deserializes() {
        let json = r#"{
            "quote": {
                "toAmount": "12.5",
                "toToken": { "address": "resource_a", "symbol": "DEXTR" },
                "exchangeFees": "0.01"
            },
            "description": "Sending 10 XRD"
        }"#;
        let resp: QuoteResponse = serde_json::from_str(json).unwrap();
        let quote = resp.quote.unwrap();
        assert_eq!(quote.to_amount, dec!(12.5));
        assert_eq!(quote.platform_fees, Decimal::ZERO);
        assert!(resp.error.is_none());
    }
}
