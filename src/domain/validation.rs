//! Validation rules.
//!
//! Pure predicates over order fields. Each returns a `ValidationResult`
//! whose message is a locale-agnostic key; the presentation layer maps
//! keys to user-facing text.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::{OrderType, SpecifiedToken, TokenLeg};

/// Reason a rule failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMessage {
    PairNotSelected,
    PriceMustBePositive,
    TokenNotSpecified,
    AmountMustBePositive,
    InsufficientBalance,
}

impl ValidationMessage {
    /// Translation key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::PairNotSelected => "pair_not_selected",
            Self::PriceMustBePositive => "price_must_be_positive",
            Self::TokenNotSpecified => "token_not_specified",
            Self::AmountMustBePositive => "amount_must_be_positive",
            Self::InsufficientBalance => "insufficient_balance",
        }
    }
}

impl std::fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Outcome of one rule for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: Option<ValidationMessage>,
}

impl ValidationResult {
    pub const fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub const fn fail(message: ValidationMessage) -> Self {
        Self {
            valid: false,
            message: Some(message),
        }
    }

    /// Message key, empty when valid.
    pub fn message_key(&self) -> &'static str {
        self.message.map_or("", ValidationMessage::key)
    }

    const fn check(condition: bool, message: ValidationMessage) -> Self {
        if condition {
            Self::ok()
        } else {
            Self::fail(message)
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// Valid iff a non-empty trading pair identifier is selected.
pub fn pair_address_is_set(pair_address: &str) -> ValidationResult {
    ValidationResult::check(
        !pair_address.trim().is_empty(),
        ValidationMessage::PairNotSelected,
    )
}

/// MARKET: always valid. LIMIT: valid iff price > 0.
pub fn price_is_valid(price: Decimal, order_type: OrderType) -> ValidationResult {
    match order_type {
        OrderType::Market => ValidationResult::ok(),
        OrderType::Limit => ValidationResult::check(
            price > Decimal::ZERO,
            ValidationMessage::PriceMustBePositive,
        ),
    }
}

/// Valid iff a leg is specified.
pub fn token_is_specified(specified: SpecifiedToken) -> ValidationResult {
    ValidationResult::check(
        specified != SpecifiedToken::None,
        ValidationMessage::TokenNotSpecified,
    )
}

/// Valid iff the specified leg's amount is > 0. A cleared field counts as 0.
pub fn amount_is_positive(
    specified: SpecifiedToken,
    token1: &TokenLeg,
    token2: &TokenLeg,
) -> ValidationResult {
    let amount = match specified {
        SpecifiedToken::Token1 => token1.amount.value(),
        SpecifiedToken::Token2 => token2.amount.value(),
        SpecifiedToken::None => Decimal::ZERO,
    };
    ValidationResult::check(amount > Decimal::ZERO, ValidationMessage::AmountMustBePositive)
}

/// Valid iff `amount` does not exceed a known balance.
pub fn amount_within_balance(amount: Decimal, balance: Option<Decimal>) -> ValidationResult {
    match balance {
        Some(balance) => {
            ValidationResult::check(amount <= balance, ValidationMessage::InsufficientBalance)
        }
        None => ValidationResult::ok(),
    }
}

/// True iff every result is valid.
pub fn no_validation_errors<'a, I>(results: I) -> bool
where
    I: IntoIterator<Item = &'a ValidationResult>,
{
    results.into_iter().all(|r| r.valid)
}
