//! Percentage-of-balance arithmetic.
//!
//! Turns a slider percentage into a concrete amount for the leg the
//! order spends, reserving a fee allowance when the whole balance of the
//! network's fee asset is requested.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::decimal::{divide, multiply, percent_of, truncate_with_precision};
use super::error::PercentageError;
use super::order::{Balances, Leg, OrderSide, OrderType, TokenLeg};

/// How percentages map onto balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentagePolicy {
    /// Symbol of the asset transaction fees are paid in.
    pub fee_asset_symbol: String,
    /// Units of the fee asset kept back when 100% is requested.
    pub fee_allowance: Decimal,
    /// Fractional digits the result is truncated to. Works around a
    /// transaction-builder precision limit; `None` keeps full precision.
    pub truncate_decimals: Option<u32>,
}

impl Default for PercentagePolicy {
    fn default() -> Self {
        Self {
            fee_asset_symbol: "XRD".to_string(),
            fee_allowance: dec!(3),
            truncate_decimals: Some(8),
        }
    }
}

/// Amount to commit for a percentage request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentageTarget {
    pub leg: Leg,
    pub amount: Decimal,
}

/// Rejects percentages outside `[0, 100]`.
pub fn check_percentage(percentage: Decimal) -> Result<(), PercentageError> {
    if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        return Err(PercentageError::OutOfRange(percentage));
    }
    Ok(())
}

impl PercentagePolicy {
    /// Amount for `percentage` of the balance spent by `side`.
    ///
    /// BUY specifies token2 from its balance, SELL token1. An unknown
    /// balance counts as zero.
    pub fn target(
        &self,
        side: OrderSide,
        percentage: Decimal,
        token1: &TokenLeg,
        token2: &TokenLeg,
        balances: &Balances,
    ) -> Result<PercentageTarget, PercentageError> {
        check_percentage(percentage)?;

        let leg = Leg::spent_by(side);
        let symbol = match leg {
            Leg::Token1 => &token1.symbol,
            Leg::Token2 => &token2.symbol,
        };
        let mut balance = balances.for_leg(leg).unwrap_or(Decimal::ZERO);
        if percentage == Decimal::ONE_HUNDRED && *symbol == self.fee_asset_symbol {
            balance = (balance - self.fee_allowance).max(Decimal::ZERO);
        }

        let mut amount = percent_of(balance, percentage)?;
        if let Some(decimals) = self.truncate_decimals {
            amount = truncate_with_precision(amount, decimals);
        }
        Ok(PercentageTarget { leg, amount })
    }

    /// Amount for a click on a leg's available balance.
    ///
    /// `None` when the balance is unknown or not positive. The fee
    /// allowance caps the amount at any percentage and is not floored,
    /// so a fee-asset balance below the allowance gives a negative
    /// amount, which commits as a cleared field.
    pub fn available(
        &self,
        percentage: Decimal,
        symbol: &str,
        balance: Option<Decimal>,
    ) -> Result<Option<Decimal>, PercentageError> {
        check_percentage(percentage)?;
        let Some(balance) = balance.filter(|b| *b > Decimal::ZERO) else {
            return Ok(None);
        };

        let cap = if symbol == self.fee_asset_symbol {
            balance - self.fee_allowance
        } else {
            balance
        };
        let mut amount = percent_of(balance, percentage)?.min(cap);
        if let Some(decimals) = self.truncate_decimals {
            amount = truncate_with_precision(amount, decimals);
        }
        Ok(Some(amount))
    }
}

/// Slider position that reflects the amounts currently entered.
///
/// A LIMIT BUY driven by quantity, or a LIMIT SELL driven by total,
/// has no meaningful balance share and shows 0.
pub fn slider_position(
    side: OrderSide,
    order_type: OrderType,
    token1_amount: Decimal,
    token2_amount: Decimal,
    balances: &Balances,
) -> Decimal {
    let is_limit = order_type == OrderType::Limit;
    if is_limit && side == OrderSide::Buy && token1_amount > Decimal::ZERO {
        return Decimal::ZERO;
    }
    if is_limit && side == OrderSide::Sell && token2_amount > Decimal::ZERO {
        return Decimal::ZERO;
    }

    let share = |amount: Decimal, balance: Option<Decimal>| -> Option<Decimal> {
        let balance = balance.filter(|b| *b > Decimal::ZERO)?;
        if amount <= Decimal::ZERO {
            return None;
        }
        divide(amount, balance)
            .and_then(|ratio| multiply(ratio, Decimal::ONE_HUNDRED))
            .ok()
    };

    share(token2_amount, balances.token2)
        .or_else(|| share(token1_amount, balances.token1))
        .unwrap_or(Decimal::ZERO)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::AmountInput;

    fn legs(symbol1: &str, symbol2: &str) -> (TokenLeg, TokenLeg) {
        let leg = |symbol: &str| TokenLeg {
            address: format!("resource_{}", symbol.to_lowercase()),
            symbol: symbol.to_string(),
            amount: AmountInput::Cleared,
        };
        (leg(symbol1), leg(symbol2))
    }

    #[test]
    fn test_full_fee_asset_balance_keeps_allowance() {
        let (t1, t2) = legs("DEXTR", "XRD");
        let balances = Balances::known(Decimal::ZERO, dec!(100));
        let target = PercentagePolicy::default()
            .target(OrderSide::Buy, dec!(100), &t1, &t2, &balances)
            .unwrap();
        assert_eq!(target.leg, Leg::Token2);
        assert_eq!(target.amount, dec!(97));
    }

    #[test]
    fn test_allowance_floors_at_zero() {
        let (t1, t2) = legs("DEXTR", "XRD");
        let balances = Balances::known(Decimal::ZERO, dec!(2));
        let target = PercentagePolicy::default()
            .target(OrderSide::Buy, dec!(100), &t1, &t2, &balances)
            .unwrap();
        assert_eq!(target.amount, Decimal::ZERO);
    }

    #[test]
    fn test_partial_percentage_ignores_allowance() {
        let (t1, t2) = legs("XRD", "DEXTR");
        let balances = Balances::known(dec!(50), Decimal::ZERO);
        let target = PercentagePolicy::default()
            .target(OrderSide::Sell, dec!(25), &t1, &t2, &balances)
            .unwrap();
        assert_eq!(target.leg, Leg::Token1);
        assert_eq!(target.amount, dec!(12.5));
    }

    #[test]
    fn test_truncates_to_policy_precision() {
        let (t1, t2) = legs("DEXTR", "XRD");
        let balances = Balances::known(dec!(0.123456789123), Decimal::ZERO);
        let target = PercentagePolicy::default()
            .target(OrderSide::Sell, dec!(100), &t1, &t2, &balances)
            .unwrap();
        assert_eq!(target.amount, dec!(0.12345678));

        let untruncated = PercentagePolicy {
            truncate_decimals: None,
            ..PercentagePolicy::default()
        };
        let target = untruncated
            .target(OrderSide::Sell, dec!(100), &t1, &t2, &balances)
            .unwrap();
        assert_eq!(target.amount, dec!(0.123456789123));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let (t1, t2) = legs("DEXTR", "XRD");
        let policy = PercentagePolicy::default();
        let balances = Balances::default();
        assert_eq!(
            policy.target(OrderSide::Buy, dec!(101), &t1, &t2, &balances),
            Err(PercentageError::OutOfRange(dec!(101)))
        );
        assert!(policy.target(OrderSide::Buy, dec!(-1), &t1, &t2, &balances).is_err());
    }

    #[test]
    fn test_available_keeps_fee_allowance() {
        let policy = PercentagePolicy::default();
        assert_eq!(policy.available(dec!(100), "XRD", Some(dec!(100))), Ok(Some(dec!(97))));
        assert_eq!(policy.available(dec!(100), "DEXTR", Some(dec!(40))), Ok(Some(dec!(40))));
        // The allowance also caps partial requests that would dip into it.
        assert_eq!(policy.available(dec!(99), "XRD", Some(dec!(100))), Ok(Some(dec!(97))));
        assert_eq!(policy.available(dec!(50), "XRD", Some(dec!(100))), Ok(Some(dec!(50))));
    }

    #[test]
    fn test_available_needs_positive_balance() {
        let policy = PercentagePolicy::default();
        assert_eq!(policy.available(dec!(100), "XRD", None), Ok(None));
        assert_eq!(policy.available(dec!(100), "XRD", Some(Decimal::ZERO)), Ok(None));
        assert!(policy.available(dec!(101), "XRD", Some(dec!(10))).is_err());
    }

    #[test]
    fn test_available_below_allowance_is_negative() {
        let policy = PercentagePolicy::default();
        assert_eq!(policy.available(dec!(100), "XRD", Some(dec!(2))), Ok(Some(dec!(-1))));
    }

    #[test]
    fn test_available_truncates() {
        let policy = PercentagePolicy::default();
        assert_eq!(
            policy.available(dec!(100), "DEXTR", Some(dec!(0.123456789123))),
            Ok(Some(dec!(0.12345678)))
        );
    }

    #[test]
    fn test_slider_tracks_total_share() {
        let balances = Balances::known(dec!(10), dec!(200));
        let pos = slider_position(
            OrderSide::Buy,
            OrderType::Market,
            Decimal::ZERO,
            dec!(50),
            &balances,
        );
        assert_eq!(pos, dec!(25));
    }

    #[test]
    fn test_slider_zero_for_limit_buy_by_quantity() {
        let balances = Balances::known(dec!(10), dec!(200));
        let pos = slider_position(OrderSide::Buy, OrderType::Limit, dec!(5), dec!(50), &balances);
        assert_eq!(pos, Decimal::ZERO);
    }

    #[test]
    fn test_slider_clamped() {
        let balances = Balances::known(dec!(10), Decimal::ZERO);
        let pos = slider_position(
            OrderSide::Sell,
            OrderType::Market,
            dec!(40),
            Decimal::ZERO,
            &balances,
        );
        assert_eq!(pos, dec!(100));
    }
}
