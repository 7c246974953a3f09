//! Order Input Engine - Orchestrates the Order in Progress
//!
//! Owns the order state store together with the collaborators that
//! feed it:
//! - `WalletBalances`: balance snapshot for validation and sizing
//! - `QuoteRefreshController`: debounced quote fetching
//! - `PercentageController`: debounced slider sizing
//! - `SubmissionController`: hand-off and outcome mapping
//!
//! Every user action goes through exactly one store transition and the
//! effects it returns are scheduled immediately. Asynchronous results
//! (settled percentages, quote arrivals) are delivered by
//! `next_event`, which the caller drives from its own loop.

use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::domain::derivation::derive_display_amounts;
use crate::domain::error::PercentageError;
use crate::domain::order::{
  AmountInput, Balances, Leg, OrderSide, OrderType, SpecifiedToken, TopOfBook, TradingPair,
};
use crate::domain::percentage::{PercentageTarget, slider_position};
use crate::domain::quote::{EstimatedTotal, FeeBreakdown, Quote, QuoteKey};
use crate::domain::state::{Effect, OrderState, QuoteApplication, TokenAmountUpdate};
use crate::domain::validation::{ValidationMessage, ValidationResult};
use crate::ports::balance_provider::BalanceProvider;
use crate::ports::order_submitter::OrderSubmitter;
use crate::ports::quote_provider::QuoteProvider;
use crate::usecases::balance_percentage::PercentageController;
use crate::usecases::balances::WalletBalances;
use crate::usecases::quote_refresh::{QuoteEvent, QuoteRefreshController};
use crate::usecases::submission::{
  SubmissionController, SubmissionOutcome, SubmissionRefusal, prepare_ticket,
};

/// Something asynchronous changed the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
  /// A quote fetch was started for the key.
  QuoteRequested(QuoteKey),
  /// A quote for the current order was stored.
  QuoteApplied,
  /// The current order could not be quoted.
  QuoteFailed(String),
  /// A quote arrived for an order shape that no longer exists.
  QuoteDiscarded,
  /// A settled slider percentage was committed to the spent leg.
  PercentageApplied(PercentageTarget),
  /// A settled slider percentage could not be converted.
  PercentageFailed(String),
}

impl EngineEvent {
  /// Short label for logs and metrics.
  pub const fn label(&self) -> &'static str {
    match self {
      Self::QuoteRequested(_) => "quote_requested",
      Self::QuoteApplied => "quote_applied",
      Self::QuoteFailed(_) => "quote_failed",
      Self::QuoteDiscarded => "quote_discarded",
      Self::PercentageApplied(_) => "percentage_applied",
      Self::PercentageFailed(_) => "percentage_failed",
    }
  }
}

/// One leg as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegView {
  pub symbol: String,
  /// Displayed amount; empty when the field is cleared.
  pub amount: String,
  pub balance: Option<Decimal>,
  pub error: Option<ValidationMessage>,
}

/// Fee summary for the current quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeesView {
  pub total: Decimal,
  pub currency: String,
  pub breakdown: FeeBreakdown,
}

/// Snapshot of everything the order form shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
  pub pair: Option<String>,
  pub wallet: Option<String>,
  pub side: OrderSide,
  pub order_type: OrderType,
  pub specified: SpecifiedToken,
  pub price: Decimal,
  pub price_error: Option<ValidationMessage>,
  /// Best price shown next to the price field.
  pub best_price: Decimal,
  pub token1: LegView,
  pub token2: LegView,
  pub post_only: bool,
  pub slider_position: Decimal,
  pub quote: Option<Quote>,
  pub quote_description: Option<String>,
  pub quote_error: Option<String>,
  /// Approximate receive amount; MARKET orders only.
  pub estimated_total: Option<EstimatedTotal>,
  pub fees: Option<FeesView>,
  pub valid: bool,
  /// Why submit is disabled, if it is.
  pub submit_blocker: Option<String>,
}

/// The order input engine.
pub struct OrderInputEngine<Q: QuoteProvider, S: OrderSubmitter, B: BalanceProvider> {
  state: OrderState,
  pair: Option<TradingPair>,
  book: TopOfBook,
  wallet: WalletBalances<B>,
  quotes: QuoteRefreshController<Q>,
  percentage: PercentageController,
  submission: SubmissionController<S>,
}

impl<Q: QuoteProvider, S: OrderSubmitter, B: BalanceProvider> OrderInputEngine<Q, S, B> {
  /// Create an engine with no pair selected and no wallet connected.
  pub fn new(quotes: Arc<Q>, submitter: Arc<S>, balances: Arc<B>, config: &EngineConfig) -> Self {
    Self {
      state: OrderState::new(),
      pair: None,
      book: TopOfBook::default(),
      wallet: WalletBalances::new(balances),
      quotes: QuoteRefreshController::new(quotes, config.quote_debounce()),
      percentage: PercentageController::new(
        config.percentage_policy(),
        config.percentage_debounce(),
      ),
      submission: SubmissionController::new(submitter),
    }
  }

  // ── Accessors ────────────────────────────────────────────

  pub const fn state(&self) -> &OrderState {
    &self.state
  }

  pub const fn pair(&self) -> Option<&TradingPair> {
    self.pair.as_ref()
  }

  pub const fn book(&self) -> TopOfBook {
    self.book
  }

  pub fn wallet(&self) -> Option<&str> {
    self.wallet.wallet()
  }

  /// Balances of the selected pair's legs.
  pub fn balances(&self) -> Balances {
    self.wallet.for_pair(self.pair.as_ref())
  }

  /// Quote fetches issued but not yet answered.
  pub fn quotes_in_flight(&self) -> usize {
    self.quotes.in_flight()
  }

  pub const fn quote_refresh_pending(&self) -> bool {
    self.quotes.has_pending()
  }

  pub const fn percentage_pending(&self) -> bool {
    self.percentage.is_pending()
  }

  // ── User actions ─────────────────────────────────────────

  /// Select a pair. Input is cleared; side and type are kept.
  pub fn select_pair(&mut self, pair: TradingPair, book: TopOfBook) {
    info!(pair = %pair.name, address = %pair.address, "Pair selected");
    let mut next = OrderState::for_pair(&pair);
    let _ = next.set_side(self.state.side());
    let _ = next.set_type(self.state.order_type());
    self.state = next;
    self.pair = Some(pair);
    self.book = book;
    self.percentage.cancel();
    self.quotes.cancel_pending();
  }

  /// Connect, switch or disconnect the wallet. Input is cleared and
  /// balances are re-read.
  pub async fn connect_wallet(&mut self, wallet: Option<String>) {
    self.wallet.connect(wallet);
    self.reset_user_input();
    if let Err(e) = self.wallet.refresh().await {
      warn!(error = %e, "Balances unavailable after wallet change");
    }
  }

  pub fn set_side(&mut self, side: OrderSide) {
    debug!(side = %side, "Side changed");
    self.percentage.cancel();
    let effects = self.state.set_side(side);
    self.apply(effects);
  }

  pub fn set_type(&mut self, order_type: OrderType) {
    debug!(order_type = %order_type, "Order type changed");
    self.percentage.cancel();
    let effects = self.state.set_type(order_type);
    self.apply(effects);
  }

  /// Set the limit price. Ignored for MARKET orders.
  pub fn set_price(&mut self, price: AmountInput) {
    let balances = self.balances();
    let effects = self.state.set_price(price, &balances);
    self.apply(effects);
  }

  /// Type an amount into one leg, making it the specified leg.
  ///
  /// Supersedes any slider percentage still waiting to settle.
  pub fn set_amount(&mut self, leg: Leg, amount: AmountInput) {
    self.percentage.cancel();
    self.commit_amount(leg, amount);
  }

  pub fn toggle_post_only(&mut self) {
    let effects = self.state.toggle_post_only();
    self.apply(effects);
  }

  /// Clear amounts, price, quote and validation.
  pub fn reset_user_input(&mut self) {
    self.percentage.cancel();
    let effects = self.state.reset_user_input();
    self.apply(effects);
  }

  /// Queue a slider percentage. Applied once input settles.
  pub fn set_percentage(&mut self, percentage: Decimal) -> Result<(), PercentageError> {
    self.percentage.request(percentage)
  }

  /// Copy the best price shown next to the price field into the
  /// limit price. Returns the price used; MARKET orders are untouched.
  pub fn use_best_price(&mut self) -> Option<Decimal> {
    if self.state.order_type() != OrderType::Limit {
      return None;
    }
    let price = self.book.label_price(self.state.side());
    debug!(price = %price, "Best price taken");
    self.set_price(AmountInput::Value(price));
    Some(price)
  }

  /// Size `leg` from its whole available balance right away, bypassing
  /// the slider debounce. Nothing changes when the balance is unknown
  /// or not positive. Returns the committed amount.
  pub fn use_available(&mut self, leg: Leg) -> Option<AmountInput> {
    self.percentage.cancel();
    let balance = self.balances().for_leg(leg);
    let symbol = self.state.leg(leg).symbol.clone();
    let amount = match self
      .percentage
      .policy()
      .available(Decimal::ONE_HUNDRED, &symbol, balance)
    {
      Ok(Some(amount)) => AmountInput::new(amount),
      Ok(None) => {
        debug!(leg = ?leg, "No available balance to use");
        return None;
      }
      Err(e) => {
        warn!(error = %e, "Available balance not applied");
        return None;
      }
    };
    debug!(leg = ?leg, amount = %amount, "Available balance taken");
    self.commit_amount(leg, amount);
    Some(amount)
  }

  /// Replace the top of book. A MARKET order re-derives its estimate
  /// leg from the new opposing price; LIMIT amounts are unaffected.
  pub fn update_top_of_book(&mut self, book: TopOfBook) {
    debug!(best_buy = %book.best_buy, best_sell = %book.best_sell, "Top of book updated");
    self.book = book;
    let balances = self.balances();
    let effects = self.state.reprice_market(&book, &balances);
    self.apply(effects);
  }

  /// Re-read wallet balances. Last known values survive a failure.
  pub async fn refresh_balances(&mut self) -> Result<usize> {
    self.wallet.refresh().await
  }

  /// Submit the current order.
  ///
  /// A refusal leaves everything untouched. On success the input is
  /// cleared and balances are refreshed; any other outcome keeps the
  /// order as it was.
  #[instrument(skip(self), fields(side = %self.state.side(), order_type = %self.state.order_type()))]
  pub async fn submit(&mut self) -> Result<SubmissionOutcome, SubmissionRefusal> {
    let ticket = prepare_ticket(&self.state, self.wallet.is_connected())?;
    let outcome = self.submission.submit(&ticket).await;

    if outcome.is_success() {
      self.reset_user_input();
      if let Err(e) = self.wallet.refresh().await {
        warn!(error = %e, "Balances not refreshed after submission");
      }
    }
    Ok(outcome)
  }

  // ── Asynchronous results ─────────────────────────────────

  /// Wait for the next settled percentage, issued fetch or arrived
  /// quote and fold it into the order. Cancel-safe.
  pub async fn next_event(&mut self) -> EngineEvent {
    tokio::select! {
      event = self.quotes.next_event() => self.on_quote_event(event),
      percentage = self.percentage.settled() => self.on_percentage(percentage),
    }
  }

  fn on_quote_event(&mut self, event: QuoteEvent) -> EngineEvent {
    match event {
      QuoteEvent::Issued(key) => EngineEvent::QuoteRequested(key),
      QuoteEvent::Arrived { key, result } => match self.state.apply_quote(&key, result) {
        QuoteApplication::Applied => {
          debug!("Quote applied");
          EngineEvent::QuoteApplied
        }
        QuoteApplication::Failed => {
          let error = self
            .state
            .quote_error()
            .unwrap_or("quote unavailable")
            .to_string();
          debug!(error = %error, "Quote failed");
          EngineEvent::QuoteFailed(error)
        }
        QuoteApplication::Discarded => {
          debug!("Stale quote discarded");
          EngineEvent::QuoteDiscarded
        }
      },
    }
  }

  fn on_percentage(&mut self, percentage: Decimal) -> EngineEvent {
    let balances = self.balances();
    match self.percentage.target(&self.state, percentage, &balances) {
      Ok(target) => {
        debug!(percentage = %percentage, amount = %target.amount, "Percentage applied");
        self.commit_amount(target.leg, AmountInput::Value(target.amount));
        EngineEvent::PercentageApplied(target)
      }
      Err(e) => {
        warn!(percentage = %percentage, error = %e, "Percentage not applied");
        EngineEvent::PercentageFailed(e.to_string())
      }
    }
  }

  // ── Presentation ─────────────────────────────────────────

  /// Everything the order form displays, computed from one snapshot.
  pub fn view(&self) -> OrderView {
    let state = &self.state;
    let balances = self.balances();
    let display = derive_display_amounts(state);
    let leg_view = |leg: Leg, amount: AmountInput, validation: &ValidationResult| LegView {
      symbol: state.leg(leg).symbol.clone(),
      amount: amount.to_string(),
      balance: balances.for_leg(leg),
      error: validation.message,
    };

    let fees = state.quote().map(|quote| {
      let breakdown = quote.fees();
      FeesView {
        total: breakdown.total(),
        currency: FeeBreakdown::currency(
          state.side(),
          &state.token1().symbol,
          &state.token2().symbol,
        )
        .to_string(),
        breakdown,
      }
    });
    let estimated_total = state
      .quote()
      .filter(|_| state.order_type() == OrderType::Market)
      .map(EstimatedTotal::from_quote);

    OrderView {
      pair: self.pair.as_ref().map(|p| p.name.clone()),
      wallet: self.wallet.wallet().map(str::to_string),
      side: state.side(),
      order_type: state.order_type(),
      specified: state.specified(),
      price: state.price(),
      price_error: state.validation_price().message,
      best_price: self.book.label_price(state.side()),
      token1: leg_view(Leg::Token1, display.token1, state.validation_token1()),
      token2: leg_view(Leg::Token2, display.token2, state.validation_token2()),
      post_only: state.post_only(),
      slider_position: slider_position(
        state.side(),
        state.order_type(),
        display.token1.value(),
        display.token2.value(),
        &balances,
      ),
      quote: state.quote().cloned(),
      quote_description: state.quote_description().map(str::to_string),
      quote_error: state.quote_error().map(str::to_string),
      estimated_total,
      fees,
      valid: state.is_valid(),
      submit_blocker: prepare_ticket(state, self.wallet.is_connected())
        .err()
        .map(|refusal| refusal.to_string()),
    }
  }

  // ── Internals ────────────────────────────────────────────

  fn commit_amount(&mut self, leg: Leg, amount: AmountInput) {
    let update = TokenAmountUpdate {
      leg,
      amount,
      book: self.book,
      balances: self.balances(),
    };
    let effects = self.state.set_token_amount(&update);
    self.apply(effects);
  }

  fn apply(&mut self, effects: Vec<Effect>) {
    for effect in effects {
      match effect {
        Effect::RefreshQuote(key) => self.quotes.schedule(key),
        Effect::CancelQuoteRefresh => self.quotes.cancel_pending(),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;
  use std::time::Duration;

  use async_trait::async_trait;
  use rust_decimal_macros::dec;

  use crate::domain::order::{OrderTicket, TokenAddress, TokenInfo};
  use crate::domain::quote::QuoteResponse;
  use crate::ports::order_submitter::{LedgerStatus, SubmitAction, SubmitPayload};

  struct EchoQuoter;

  #[async_trait]
  impl QuoteProvider for EchoQuoter {
    async fn fetch_quote(&self, shape: &QuoteKey) -> anyhow::Result<QuoteResponse> {
      Ok(QuoteResponse {
        quote: Some(Quote {
          to_amount: shape.token1_amount,
          to_token: TokenInfo::new("resource_dextr", "DEXTR"),
          exchange_fees: dec!(0.1),
          platform_fees: dec!(0.05),
          liquidity_fees: Decimal::ZERO,
        }),
        ..QuoteResponse::default()
      })
    }
  }

  struct OkSubmitter;

  #[async_trait]
  impl OrderSubmitter for OkSubmitter {
    async fn submit_order(&self, _ticket: &OrderTicket) -> anyhow::Result<SubmitAction> {
      Ok(SubmitAction::Fulfilled {
        payload: SubmitPayload {
          status: LedgerStatus::Ok,
          transaction_id: Some("txid_1".to_string()),
          message: None,
        },
      })
    }
  }

  struct FixedBalances;

  #[async_trait]
  impl BalanceProvider for FixedBalances {
    async fn fetch_balances(&self, _wallet: &str) -> anyhow::Result<HashMap<TokenAddress, Decimal>> {
      Ok(HashMap::from([
        ("resource_dextr".to_string(), dec!(40)),
        ("resource_xrd".to_string(), dec!(100)),
      ]))
    }
  }

  type TestEngine = OrderInputEngine<EchoQuoter, OkSubmitter, FixedBalances>;

  fn pair() -> TradingPair {
    TradingPair {
      address: "component_dextr_xrd".to_string(),
      name: "DEXTR/XRD".to_string(),
      token1: TokenInfo::new("resource_dextr", "DEXTR"),
      token2: TokenInfo::new("resource_xrd", "XRD"),
    }
  }

  async fn engine() -> TestEngine {
    let mut engine = OrderInputEngine::new(
      Arc::new(EchoQuoter),
      Arc::new(OkSubmitter),
      Arc::new(FixedBalances),
      &EngineConfig::default(),
    );
    engine.select_pair(
      pair(),
      TopOfBook {
        best_buy: dec!(0.9),
        best_sell: dec!(1.1),
      },
    );
    engine.connect_wallet(Some("account_1".to_string())).await;
    engine
  }

  #[tokio::test(start_paused = true)]
  async fn test_percentage_then_quote() {
    let mut engine = engine().await;
    engine.set_percentage(dec!(100)).unwrap();

    // 100% of 100 XRD keeps the fee allowance back.
    match engine.next_event().await {
      EngineEvent::PercentageApplied(target) => {
        assert_eq!(target.leg, Leg::Token2);
        assert_eq!(target.amount, dec!(97));
      }
      other => panic!("unexpected event: {other:?}"),
    }
    assert!(matches!(engine.next_event().await, EngineEvent::QuoteRequested(_)));
    assert_eq!(engine.next_event().await, EngineEvent::QuoteApplied);

    let view = engine.view();
    assert_eq!(view.token2.amount, "97");
    assert_eq!(view.fees.as_ref().unwrap().total, dec!(0.15));
    assert_eq!(view.fees.unwrap().currency, "DEXTR");
    assert!(view.estimated_total.is_some());
    assert_eq!(view.best_price, dec!(0.9));
    assert_eq!(view.submit_blocker, None);
  }

  #[tokio::test(start_paused = true)]
  async fn test_manual_edit_supersedes_percentage() {
    let mut engine = engine().await;
    engine.set_percentage(dec!(50)).unwrap();
    engine.set_amount(Leg::Token2, AmountInput::Value(dec!(11)));
    assert!(!engine.percentage_pending());

    assert!(matches!(engine.next_event().await, EngineEvent::QuoteRequested(_)));
    assert_eq!(engine.state().token2().amount, AmountInput::Value(dec!(11)));
    assert_eq!(engine.state().token1().amount, AmountInput::Value(dec!(10)));
  }

  #[tokio::test(start_paused = true)]
  async fn test_successful_submit_resets_input() {
    let mut engine = engine().await;
    engine.set_amount(Leg::Token2, AmountInput::Value(dec!(11)));
    let _ = engine.next_event().await;
    assert_eq!(engine.next_event().await, EngineEvent::QuoteApplied);

    let outcome = engine.submit().await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(engine.state().specified(), SpecifiedToken::None);
    assert!(engine.state().quote().is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn test_quote_not_fetched_before_window() {
    let mut engine = engine().await;
    engine.set_amount(Leg::Token2, AmountInput::Value(dec!(11)));
    let early = tokio::time::timeout(Duration::from_millis(200), engine.next_event()).await;
    assert!(early.is_err());
    assert!(engine.quote_refresh_pending());
  }

  #[tokio::test(start_paused = true)]
  async fn test_best_price_fills_limit_price() {
    let mut engine = engine().await;
    assert_eq!(engine.use_best_price(), None);
    assert_eq!(engine.state().price(), Decimal::ZERO);

    engine.set_type(OrderType::Limit);
    assert_eq!(engine.use_best_price(), Some(dec!(0.9)));
    assert_eq!(engine.state().price(), dec!(0.9));

    engine.set_side(OrderSide::Sell);
    assert_eq!(engine.use_best_price(), Some(dec!(1.1)));
    engine.set_amount(Leg::Token1, AmountInput::Value(dec!(10)));
    assert_eq!(engine.view().token2.amount, "11");
  }

  #[tokio::test(start_paused = true)]
  async fn test_available_commits_without_debounce() {
    let mut engine = engine().await;
    engine.set_percentage(dec!(25)).unwrap();

    // The fee asset keeps its allowance back.
    assert_eq!(
      engine.use_available(Leg::Token2),
      Some(AmountInput::Value(dec!(97)))
    );
    assert!(!engine.percentage_pending());
    assert_eq!(engine.state().specified(), SpecifiedToken::Token2);
    assert_eq!(engine.state().token2().amount, AmountInput::Value(dec!(97)));
    assert!(matches!(engine.next_event().await, EngineEvent::QuoteRequested(_)));

    engine.set_side(OrderSide::Sell);
    assert_eq!(
      engine.use_available(Leg::Token1),
      Some(AmountInput::Value(dec!(40)))
    );
  }

  #[tokio::test(start_paused = true)]
  async fn test_available_without_balance_keeps_input() {
    let mut engine = engine().await;
    let mut empty = pair();
    empty.token1 = TokenInfo::new("resource_empty", "EMPTY");
    let book = engine.book();
    engine.select_pair(empty, book);
    engine.set_side(OrderSide::Sell);
    engine.set_amount(Leg::Token1, AmountInput::Value(dec!(3)));

    assert_eq!(engine.use_available(Leg::Token1), None);
    assert_eq!(engine.state().token1().amount, AmountInput::Value(dec!(3)));

    engine.connect_wallet(None).await;
    engine.set_amount(Leg::Token2, AmountInput::Value(dec!(5)));
    assert_eq!(engine.use_available(Leg::Token2), None);
    assert_eq!(engine.state().token2().amount, AmountInput::Value(dec!(5)));
  }

  #[tokio::test(start_paused = true)]
  async fn test_book_update_reprices_market_order() {
    let mut engine = engine().await;
    engine.set_amount(Leg::Token2, AmountInput::Value(dec!(11)));
    assert_eq!(engine.state().token1().amount, AmountInput::Value(dec!(10)));
    let _ = engine.next_event().await;
    assert_eq!(engine.next_event().await, EngineEvent::QuoteApplied);

    engine.update_top_of_book(TopOfBook {
      best_buy: dec!(2),
      best_sell: dec!(2.2),
    });
    assert_eq!(engine.state().token1().amount, AmountInput::Value(dec!(5)));
    assert!(engine.state().quote().is_none());
    assert!(engine.quote_refresh_pending());
  }

  #[tokio::test]
  async fn test_submit_refused_without_quote() {
    let mut engine = engine().await;
    engine.set_amount(Leg::Token2, AmountInput::Value(dec!(11)));
    assert_eq!(engine.submit().await, Err(SubmissionRefusal::MissingQuote));
    assert_eq!(engine.state().token2().amount, AmountInput::Value(dec!(11)));
  }
}
