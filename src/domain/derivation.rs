//! Derivation engine.
//!
//! Computes the displayed amount of the non-specified leg from the
//! specified one. Pure: the stored specified amount is never written
//! back, and repeated calls on the same state return the same output.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::decimal::{divide, multiply};
use super::order::{AmountInput, Leg, OrderType};
use super::state::OrderState;

/// Amounts to show in the quantity (token1) and total (token2) fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayAmounts {
    pub token1: AmountInput,
    pub token2: AmountInput,
}

/// Amount of the other leg implied by `amount` of `specified` at `price`.
///
/// Non-positive prices derive zero in both directions; arithmetic
/// failures (overflow) also collapse to zero so nothing non-finite can
/// reach state.
pub fn derive_amount(specified: Leg, amount: Decimal, price: Decimal) -> Decimal {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match specified {
        Leg::Token1 => multiply(amount, price),
        Leg::Token2 => divide(amount, price),
    }
    .unwrap_or(Decimal::ZERO)
}

/// Same as [`derive_amount`] but keeps a cleared source cleared.
pub fn derive_input(specified: Leg, amount: AmountInput, price: Decimal) -> AmountInput {
    match amount {
        AmountInput::Cleared => AmountInput::Cleared,
        AmountInput::Value(v) => AmountInput::Value(derive_amount(specified, v, price)),
    }
}

/// Display values for both legs.
///
/// MARKET orders show the stored legs as-is (the receive side comes
/// from the quote). LIMIT orders recompute the non-specified leg from
/// the specified leg and the limit price.
pub fn derive_display_amounts(state: &OrderState) -> DisplayAmounts {
    let token1 = state.token1().amount;
    let token2 = state.token2().amount;

    if state.order_type() == OrderType::Market {
        return DisplayAmounts { token1, token2 };
    }

    match state.specified().leg() {
        Some(Leg::Token1) => DisplayAmounts {
            token1,
            token2: derive_input(Leg::Token1, token1, state.price()),
        },
        Some(Leg::Token2) => DisplayAmounts {
            token1: derive_input(Leg::Token2, token2, state.price()),
            token2,
        },
        None => DisplayAmounts { token1, token2 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Balances, TokenInfo, TradingPair};
    use crate::domain::state::TokenAmountUpdate;
    use rust_decimal_macros::dec;

    fn limit_state() -> OrderState {
        let pair = TradingPair {
            address: "component_pair".to_string(),
            name: "DEXTR/XRD".to_string(),
            token1: TokenInfo::new("resource_dextr", "DEXTR"),
            token2: TokenInfo::new("resource_xrd", "XRD"),
        };
        let mut state = OrderState::for_pair(&pair);
        let _ = state.set_type(OrderType::Limit);
        state
    }

    #[test]
    fn test_derive_token2_from_token1() {
        assert_eq!(derive_amount(Leg::Token1, dec!(10), dec!(1.5)), dec!(15));
    }

    #[test]
    fn test_derive_token1_from_token2() {
        assert_eq!(derive_amount(Leg::Token2, dec!(15), dec!(1.5)), dec!(10));
    }

    #[test]
    fn test_non_positive_price_derives_zero() {
        assert_eq!(derive_amount(Leg::Token2, dec!(15), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(derive_amount(Leg::Token2, dec!(15), dec!(-2)), Decimal::ZERO);
    }

    #[test]
    fn test_cleared_source_stays_cleared() {
        assert_eq!(
            derive_input(Leg::Token1, AmountInput::Cleared, dec!(2)),
            AmountInput::Cleared
        );
    }

    #[test]
    fn test_limit_display_follows_price() {
        let mut state = limit_state();
        let balances = Balances::default();
        let _ = state.set_price(AmountInput::Value(dec!(2)), &balances);
        let _ = state.set_token_amount(&TokenAmountUpdate {
            leg: Leg::Token1,
            amount: AmountInput::Value(dec!(3)),
            book: Default::default(),
            balances,
        });

        let display = derive_display_amounts(&state);
        assert_eq!(display.token1, AmountInput::Value(dec!(3)));
        assert_eq!(display.token2, AmountInput::Value(dec!(6)));
        // Idempotent and read-only.
        assert_eq!(derive_display_amounts(&state), display);
        assert_eq!(state.token1().amount, AmountInput::Value(dec!(3)));
    }

    #[test]
    fn test_limit_display_token2_specified_zero_price() {
        let mut state = limit_state();
        let _ = state.set_token_amount(&TokenAmountUpdate {
            leg: Leg::Token2,
            amount: AmountInput::Value(dec!(50)),
            book: Default::default(),
            balances: Balances::default(),
        });
        let display = derive_display_amounts(&state);
        assert_eq!(display.token1, AmountInput::Value(Decimal::ZERO));
        assert_eq!(display.token2, AmountInput::Value(dec!(50)));
    }
}
