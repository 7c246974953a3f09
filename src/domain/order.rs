//! Core order-input domain types.
//!
//! Defines the two token legs of an order, which leg is the source of
//! truth, side/type enums and the packaged ticket handed to submission.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::decimal;
use super::quote::Quote;

/// Token address / resource identifier.
pub type TokenAddress = String;

/// Trading pair (component) address.
pub type PairAddress = String;

// ────────────────────────────────────────────
// Enums
// ────────────────────────────────────────────

/// Order side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    #[default]
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type. MARKET price comes from the book, LIMIT price from the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    #[default]
    Market,
    Limit,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
        }
    }
}

/// One of the two legs of an order.
///
/// Token1 is the base ("quantity") leg, Token2 the quote ("total") leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Leg {
    Token1,
    Token2,
}

impl Leg {
    /// The leg whose balance an order of `side` spends.
    pub const fn spent_by(side: OrderSide) -> Self {
        match side {
            OrderSide::Buy => Self::Token2,
            OrderSide::Sell => Self::Token1,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::Token1 => Self::Token2,
            Self::Token2 => Self::Token1,
        }
    }
}

/// Which leg is authoritative for the order amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecifiedToken {
    #[serde(rename = "TOKEN_1")]
    Token1,
    #[serde(rename = "TOKEN_2")]
    Token2,
    #[default]
    None,
}

impl SpecifiedToken {
    pub const fn leg(self) -> Option<Leg> {
        match self {
            Self::Token1 => Some(Leg::Token1),
            Self::Token2 => Some(Leg::Token2),
            Self::None => None,
        }
    }
}

impl From<Leg> for SpecifiedToken {
    fn from(leg: Leg) -> Self {
        match leg {
            Leg::Token1 => Self::Token1,
            Leg::Token2 => Self::Token2,
        }
    }
}

// ────────────────────────────────────────────
// Amounts and legs
// ────────────────────────────────────────────

/// User-facing amount that distinguishes "field cleared" from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountInput {
    #[default]
    Cleared,
    Value(Decimal),
}

impl AmountInput {
    /// Wraps a decimal; negative values are treated as a cleared field.
    pub fn new(value: Decimal) -> Self {
        if value.is_sign_negative() && !value.is_zero() {
            Self::Cleared
        } else {
            Self::Value(value)
        }
    }

    /// Value used for validation and arithmetic: cleared is zero.
    pub fn value(self) -> Decimal {
        match self {
            Self::Cleared => Decimal::ZERO,
            Self::Value(v) => v,
        }
    }

    pub const fn is_cleared(self) -> bool {
        matches!(self, Self::Cleared)
    }
}

impl From<Decimal> for AmountInput {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for AmountInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cleared => Ok(()),
            Self::Value(v) => write!(f, "{}", v.normalize()),
        }
    }
}

/// Static token metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: TokenAddress,
    pub symbol: String,
}

impl TokenInfo {
    pub fn new(address: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            symbol: symbol.into(),
        }
    }
}

/// One leg of the order in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLeg {
    pub address: TokenAddress,
    pub symbol: String,
    pub amount: AmountInput,
}

impl TokenLeg {
    pub fn empty(token: &TokenInfo) -> Self {
        Self {
            address: token.address.clone(),
            symbol: token.symbol.clone(),
            amount: AmountInput::Cleared,
        }
    }
}

/// A selectable trading pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingPair {
    pub address: PairAddress,
    pub name: String,
    pub token1: TokenInfo,
    pub token2: TokenInfo,
}

// ────────────────────────────────────────────
// Snapshots supplied into every transition
// ────────────────────────────────────────────

/// Wallet balances for the two legs. `None` means unknown (no wallet).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    pub token1: Option<Decimal>,
    pub token2: Option<Decimal>,
}

impl Balances {
    pub const fn known(token1: Decimal, token2: Decimal) -> Self {
        Self {
            token1: Some(token1),
            token2: Some(token2),
        }
    }

    pub const fn for_leg(&self, leg: Leg) -> Option<Decimal> {
        match leg {
            Leg::Token1 => self.token1,
            Leg::Token2 => self.token2,
        }
    }
}

/// Top of the order book. Zero means no resting order on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopOfBook {
    /// Highest bid.
    pub best_buy: Decimal,
    /// Lowest ask.
    pub best_sell: Decimal,
}

impl TopOfBook {
    /// Price a MARKET order of `side` would trade against.
    pub const fn opposing(&self, side: OrderSide) -> Decimal {
        match side {
            OrderSide::Buy => self.best_sell,
            OrderSide::Sell => self.best_buy,
        }
    }

    /// Price shown next to the price field for `side`, cut to 8
    /// decimals. Clicking it copies this value into the price field.
    pub fn label_price(&self, side: OrderSide) -> Decimal {
        let best = match side {
            OrderSide::Buy => self.best_buy,
            OrderSide::Sell => self.best_sell,
        };
        decimal::truncate_with_precision(best, 8)
    }
}

// ────────────────────────────────────────────
// Submission ticket
// ────────────────────────────────────────────

/// A validated order packaged for the submission collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTicket {
    /// Client-side identifier for correlation in logs.
    pub client_order_id: Uuid,
    pub pair_address: PairAddress,
    pub side: OrderSide,
    pub order_type: OrderType,
    /// Limit price; `None` for MARKET orders.
    pub price: Option<Decimal>,
    pub specified: Leg,
    pub token1: TokenLeg,
    pub token2: TokenLeg,
    pub post_only: bool,
    pub quote: Quote,
    pub created_at: DateTime<Utc>,
}

impl OrderTicket {
    /// Amount of the specified leg.
    pub fn specified_amount(&self) -> Decimal {
        match self.specified {
            Leg::Token1 => self.token1.amount.value(),
            Leg::Token2 => self.token2.amount.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_sentinel_is_cleared() {
        assert_eq!(AmountInput::new(dec!(-1)), AmountInput::Cleared);
        assert_eq!(AmountInput::new(dec!(-3)), AmountInput::Cleared);
        assert_eq!(AmountInput::Cleared.value(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_is_distinct_from_cleared() {
        let zero = AmountInput::new(Decimal::ZERO);
        assert_eq!(zero, AmountInput::Value(Decimal::ZERO));
        assert!(!zero.is_cleared());
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(AmountInput::Cleared.to_string(), "");
        assert_eq!(AmountInput::Value(dec!(12.500)).to_string(), "12.5");
    }

    #[test]
    fn test_spent_leg() {
        assert_eq!(Leg::spent_by(OrderSide::Buy), Leg::Token2);
        assert_eq!(Leg::spent_by(OrderSide::Sell), Leg::Token1);
    }

    #[test]
    fn test_opposing_price() {
        let book = TopOfBook {
            best_buy: dec!(0.99),
            best_sell: dec!(1.01),
        };
        assert_eq!(book.opposing(OrderSide::Buy), dec!(1.01));
        assert_eq!(book.opposing(OrderSide::Sell), dec!(0.99));
        assert_eq!(book.label_price(OrderSide::Buy), dec!(0.99));
    }

    #[test]
    fn test_label_price_is_cut_to_eight_decimals() {
        let book = TopOfBook {
            best_buy: dec!(0.041299999999),
            best_sell: dec!(0.0415),
        };
        assert_eq!(book.label_price(OrderSide::Buy), dec!(0.04129999));
        assert_eq!(book.label_price(OrderSide::Sell), dec!(0.0415));
    }

    #[test]
    fn test_side_serde_matches_wire_names() {
        assert_eq!(serde_json::to_string(&OrderSide::Sell).unwrap(), "\"SELL\"");
        assert_eq!(
            serde_json::to_string(&SpecifiedToken::Token2).unwrap(),
            "\"TOKEN_2\""
        );
    }
}
