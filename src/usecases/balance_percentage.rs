//! Balance Percentage Use Case - Slider Sizing
//!
//! Debounces slider percentages (the last value within the window
//! wins) and converts the settled percentage into an amount for the
//! leg the order spends.

use std::time::Duration;

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::error::PercentageError;
use crate::domain::order::Balances;
use crate::domain::percentage::{PercentagePolicy, PercentageTarget, check_percentage};
use crate::domain::state::OrderState;
use crate::usecases::debounce::Debouncer;

/// Quiescence window applied to slider input.
pub const PERCENTAGE_DEBOUNCE: Duration = Duration::from_millis(350);

/// Debounced percentage-of-balance requests.
pub struct PercentageController {
  policy: PercentagePolicy,
  debouncer: Debouncer<Decimal>,
}

impl PercentageController {
  pub const fn new(policy: PercentagePolicy, quiescence: Duration) -> Self {
    Self {
      policy,
      debouncer: Debouncer::new(quiescence),
    }
  }

  pub const fn policy(&self) -> &PercentagePolicy {
    &self.policy
  }

  /// Queue a percentage. Out-of-range values are rejected up front and
  /// leave any queued value in place.
  pub fn request(&mut self, percentage: Decimal) -> Result<(), PercentageError> {
    check_percentage(percentage)?;
    debug!(percentage = %percentage, "Percentage requested");
    self.debouncer.push(percentage);
    Ok(())
  }

  /// Drop the queued percentage. Returns whether one was queued.
  pub fn cancel(&mut self) -> bool {
    let cancelled = self.debouncer.cancel().is_some();
    if cancelled {
      debug!("Pending percentage cancelled");
    }
    cancelled
  }

  pub const fn is_pending(&self) -> bool {
    self.debouncer.is_pending()
  }

  /// Resolve with the percentage once input has settled. Cancel-safe.
  pub async fn settled(&mut self) -> Decimal {
    self.debouncer.fire().await
  }

  /// Amount `percentage` stands for against the current order.
  pub fn target(
    &self,
    state: &OrderState,
    percentage: Decimal,
    balances: &Balances,
  ) -> Result<PercentageTarget, PercentageError> {
    self.policy.target(
      state.side(),
      percentage,
      state.token1(),
      state.token2(),
      balances,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  use crate::domain::order::{Leg, OrderSide, TokenInfo, TradingPair};

  fn state() -> OrderState {
    OrderState::for_pair(&TradingPair {
      address: "component_dextr_xrd".to_string(),
      name: "DEXTR/XRD".to_string(),
      token1: TokenInfo::new("resource_dextr", "DEXTR"),
      token2: TokenInfo::new("resource_xrd", "XRD"),
    })
  }

  #[tokio::test(start_paused = true)]
  async fn test_rapid_requests_settle_on_last() {
    let mut controller = PercentageController::new(PercentagePolicy::default(), PERCENTAGE_DEBOUNCE);
    controller.request(dec!(10)).unwrap();
    controller.request(dec!(40)).unwrap();
    controller.request(dec!(100)).unwrap();

    assert_eq!(controller.settled().await, dec!(100));
    assert!(!controller.is_pending());
  }

  #[test]
  fn test_out_of_range_keeps_queued_value() {
    let mut controller = PercentageController::new(PercentagePolicy::default(), PERCENTAGE_DEBOUNCE);
    controller.request(dec!(20)).unwrap();
    assert_eq!(
      controller.request(dec!(150)),
      Err(PercentageError::OutOfRange(dec!(150)))
    );
    assert!(controller.is_pending());
    assert!(controller.cancel());
    assert!(!controller.cancel());
  }

  #[test]
  fn test_target_uses_spent_leg() {
    let controller = PercentageController::new(PercentagePolicy::default(), PERCENTAGE_DEBOUNCE);
    let mut state = state();
    let balances = Balances::known(dec!(40), dec!(100));

    let buy = controller.target(&state, dec!(100), &balances).unwrap();
    assert_eq!(buy.leg, Leg::Token2);
    assert_eq!(buy.amount, dec!(97));

    let _ = state.set_side(OrderSide::Sell);
    let sell = controller.target(&state, dec!(50), &balances).unwrap();
    assert_eq!(sell.leg, Leg::Token1);
    assert_eq!(sell.amount, dec!(20));
  }
}
