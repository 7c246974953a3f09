//! Order state store.
//!
//! Holds the canonical order in progress and exposes the only
//! transitions allowed to change it. Every transition recomputes the
//! validation results that depend on the fields it touched and returns
//! the effects the caller must schedule, so no reactive framework is
//! needed to keep derived values, validation and quote refresh in step.
//!
//! Invariants after every transition:
//! - at most one leg is authoritative (`specified`); the other leg holds
//!   a value derived from it and is overwritten on the next transition
//! - a quote is only held while the quote key it was fetched for is
//!   still the current key

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::derivation::derive_input;
use super::order::{
    AmountInput, Balances, Leg, OrderSide, OrderType, SpecifiedToken, TokenLeg, TopOfBook,
    TradingPair,
};
use super::quote::{Quote, QuoteKey, QuoteResponse};
use super::validation::{
    ValidationResult, amount_is_positive, amount_within_balance, no_validation_errors,
    pair_address_is_set, price_is_valid, token_is_specified,
};

/// Work a transition asks the caller to schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// The order became (or stayed) quotable under a new key.
    RefreshQuote(QuoteKey),
    /// The order is no longer quotable; drop any pending refresh.
    CancelQuoteRefresh,
}

/// What happened to a quote result delivered to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteApplication {
    /// Stored as the current quote.
    Applied,
    /// Relevant, but carried an error or no quote; stored as quote error.
    Failed,
    /// Fetched for a key that is no longer current; ignored.
    Discarded,
}

/// Parameters of `set_token_amount`.
///
/// Balances and top of book are passed in so one transition computes
/// against one consistent snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmountUpdate {
    pub leg: Leg,
    pub amount: AmountInput,
    pub book: TopOfBook,
    pub balances: Balances,
}

/// The order in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderState {
    side: OrderSide,
    order_type: OrderType,
    pair_address: String,
    token1: TokenLeg,
    token2: TokenLeg,
    price: Decimal,
    specified: SpecifiedToken,
    post_only: bool,
    quote: Option<Quote>,
    quote_description: Option<String>,
    quote_error: Option<String>,
    validation_price: ValidationResult,
    validation_token1: ValidationResult,
    validation_token2: ValidationResult,
}

impl OrderState {
    /// Empty order with no pair selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty order for `pair`.
    pub fn for_pair(pair: &TradingPair) -> Self {
        Self {
            pair_address: pair.address.clone(),
            token1: TokenLeg::empty(&pair.token1),
            token2: TokenLeg::empty(&pair.token2),
            ..Self::default()
        }
    }

    // ── Accessors ────────────────────────────────────────────

    pub const fn side(&self) -> OrderSide {
        self.side
    }

    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn pair_address(&self) -> &str {
        &self.pair_address
    }

    pub const fn token1(&self) -> &TokenLeg {
        &self.token1
    }

    pub const fn token2(&self) -> &TokenLeg {
        &self.token2
    }

    pub const fn leg(&self, leg: Leg) -> &TokenLeg {
        match leg {
            Leg::Token1 => &self.token1,
            Leg::Token2 => &self.token2,
        }
    }

    pub const fn price(&self) -> Decimal {
        self.price
    }

    pub const fn specified(&self) -> SpecifiedToken {
        self.specified
    }

    pub const fn post_only(&self) -> bool {
        self.post_only
    }

    pub const fn quote(&self) -> Option<&Quote> {
        self.quote.as_ref()
    }

    pub fn quote_description(&self) -> Option<&str> {
        self.quote_description.as_deref()
    }

    pub fn quote_error(&self) -> Option<&str> {
        self.quote_error.as_deref()
    }

    pub const fn validation_price(&self) -> &ValidationResult {
        &self.validation_price
    }

    pub const fn validation_token1(&self) -> &ValidationResult {
        &self.validation_token1
    }

    pub const fn validation_token2(&self) -> &ValidationResult {
        &self.validation_token2
    }

    // ── Derived predicates ───────────────────────────────────

    /// Key identifying the order shape a quote is valid for.
    pub fn quote_key(&self) -> QuoteKey {
        QuoteKey {
            pair_address: self.pair_address.clone(),
            side: self.side,
            order_type: self.order_type,
            price: self.price,
            specified: self.specified,
            token1_amount: self.token1.amount.value(),
            token2_amount: self.token2.amount.value(),
        }
    }

    /// Well-formed enough to ask for a quote (wallet not required).
    pub fn is_quotable(&self) -> bool {
        pair_address_is_set(&self.pair_address).valid
            && price_is_valid(self.price, self.order_type).valid
            && token_is_specified(self.specified).valid
            && amount_is_positive(self.specified, &self.token1, &self.token2).valid
    }

    /// Field validations pass and the order is well-formed.
    pub fn is_valid(&self) -> bool {
        no_validation_errors([
            &self.validation_price,
            &self.validation_token1,
            &self.validation_token2,
        ]) && self.is_quotable()
    }

    /// Either leg is exactly zero (a cleared leg counts as zero).
    pub fn has_zero_amount(&self) -> bool {
        self.token1.amount.value().is_zero() || self.token2.amount.value().is_zero()
    }

    // ── Transitions ──────────────────────────────────────────

    /// Switches side and resets all user input.
    pub fn set_side(&mut self, side: OrderSide) -> Vec<Effect> {
        self.transition(|s| {
            s.side = side;
            s.clear_user_input();
        })
    }

    /// Switches order type and resets all user input.
    pub fn set_type(&mut self, order_type: OrderType) -> Vec<Effect> {
        self.transition(|s| {
            s.order_type = order_type;
            s.clear_user_input();
        })
    }

    /// Sets the limit price and re-derives the non-specified leg.
    ///
    /// MARKET prices are not user-editable; the call is ignored.
    pub fn set_price(&mut self, price: AmountInput, balances: &Balances) -> Vec<Effect> {
        if self.order_type == OrderType::Market {
            return Vec::new();
        }
        self.transition(|s| {
            s.price = price.value();
            s.validation_price = price_is_valid(s.price, s.order_type);
            if let Some(leg) = s.specified.leg() {
                s.derive_other_leg(leg, s.price);
            }
            s.revalidate_amounts(balances);
        })
    }

    /// Makes `update.leg` the specified leg with `update.amount`.
    ///
    /// The other leg is derived at the limit price (LIMIT) or at the
    /// best opposing book price (MARKET).
    pub fn set_token_amount(&mut self, update: &TokenAmountUpdate) -> Vec<Effect> {
        self.transition(|s| {
            s.specified = update.leg.into();
            s.leg_mut(update.leg).amount = update.amount;
            let price = s.effective_price(&update.book);
            s.derive_other_leg(update.leg, price);
            s.revalidate_amounts(&update.balances);
        })
    }

    /// Re-derives the MARKET estimate leg against a new top of book.
    ///
    /// LIMIT orders and orders with no specified leg are left alone.
    pub fn reprice_market(&mut self, book: &TopOfBook, balances: &Balances) -> Vec<Effect> {
        let Some(leg) = self.specified.leg() else {
            return Vec::new();
        };
        if self.order_type != OrderType::Market {
            return Vec::new();
        }
        self.transition(|s| {
            s.derive_other_leg(leg, book.opposing(s.side));
            s.revalidate_amounts(balances);
        })
    }

    /// Flips the post-only flag. Does not affect validation or quotes.
    pub fn toggle_post_only(&mut self) -> Vec<Effect> {
        self.post_only = !self.post_only;
        Vec::new()
    }

    /// Clears amounts, price, specified leg, quote and validation.
    pub fn reset_user_input(&mut self) -> Vec<Effect> {
        self.transition(Self::clear_user_input)
    }

    /// Merges a quote result fetched for `key`.
    ///
    /// Results for any key other than the current one are dropped.
    pub fn apply_quote(
        &mut self,
        key: &QuoteKey,
        result: Result<QuoteResponse, String>,
    ) -> QuoteApplication {
        if *key != self.quote_key() {
            return QuoteApplication::Discarded;
        }
        match result {
            Ok(response) => {
                self.quote = response.quote;
                self.quote_description = response.description;
                self.quote_error = response.error;
                if self.quote.is_some() && self.quote_error.is_none() {
                    QuoteApplication::Applied
                } else {
                    QuoteApplication::Failed
                }
            }
            Err(error) => {
                self.quote = None;
                self.quote_description = None;
                self.quote_error = Some(error);
                QuoteApplication::Failed
            }
        }
    }

    // ── Internals ────────────────────────────────────────────

    fn transition(&mut self, mutate: impl FnOnce(&mut Self)) -> Vec<Effect> {
        let before = self.quote_key();
        mutate(self);
        let after = self.quote_key();
        if before == after {
            return Vec::new();
        }

        self.quote = None;
        self.quote_description = None;
        self.quote_error = None;

        if self.is_quotable() {
            vec![Effect::RefreshQuote(after)]
        } else {
            vec![Effect::CancelQuoteRefresh]
        }
    }

    fn clear_user_input(&mut self) {
        self.token1.amount = AmountInput::Cleared;
        self.token2.amount = AmountInput::Cleared;
        self.price = Decimal::ZERO;
        self.specified = SpecifiedToken::None;
        self.post_only = false;
        self.quote = None;
        self.quote_description = None;
        self.quote_error = None;
        self.validation_price = ValidationResult::ok();
        self.validation_token1 = ValidationResult::ok();
        self.validation_token2 = ValidationResult::ok();
    }

    fn leg_mut(&mut self, leg: Leg) -> &mut TokenLeg {
        match leg {
            Leg::Token1 => &mut self.token1,
            Leg::Token2 => &mut self.token2,
        }
    }

    const fn effective_price(&self, book: &TopOfBook) -> Decimal {
        match self.order_type {
            OrderType::Limit => self.price,
            OrderType::Market => book.opposing(self.side),
        }
    }

    fn derive_other_leg(&mut self, specified: Leg, price: Decimal) {
        let source = self.leg(specified).amount;
        self.leg_mut(specified.other()).amount = derive_input(specified, source, price);
    }

    fn revalidate_amounts(&mut self, balances: &Balances) {
        self.validation_token1 = self.validate_leg(Leg::Token1, balances);
        self.validation_token2 = self.validate_leg(Leg::Token2, balances);
    }

    fn validate_leg(&self, leg: Leg, balances: &Balances) -> ValidationResult {
        if self.specified.leg() == Some(leg) {
            let positive = amount_is_positive(self.specified, &self.token1, &self.token2);
            if !positive.valid {
                return positive;
            }
        }
        if leg == Leg::spent_by(self.side) {
            return amount_within_balance(self.leg(leg).amount.value(), balances.for_leg(leg));
        }
        ValidationResult::ok()
    }
}
