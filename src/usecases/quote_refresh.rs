//! Quote Refresh Use Case - Debounced Quote Fetching
//!
//! Owns the quote debounce window and the in-flight fetch tasks.
//! Each quiescent key is fetched on its own task in a `JoinSet`; every
//! result comes back tagged with the key it was fetched for, so the
//! store can drop anything that no longer matches the order.
//!
//! Requests are not cancelled once issued. A superseded fetch still
//! completes and is discarded on arrival. A task that dies without a
//! result leaves the set like any other, so `in_flight` never leaks.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::domain::quote::{QuoteKey, QuoteResponse};
use crate::ports::quote_provider::QuoteProvider;
use crate::usecases::debounce::Debouncer;

type QuoteResult = (QuoteKey, Result<QuoteResponse, String>);

/// Progress of the refresh pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteEvent {
  /// The debounce window closed and a fetch was started for the key.
  Issued(QuoteKey),
  /// A fetch finished. Errors are flattened to their display text.
  Arrived {
    key: QuoteKey,
    result: Result<QuoteResponse, String>,
  },
}

/// Debounces quote keys and runs the fetches.
pub struct QuoteRefreshController<Q: QuoteProvider> {
  provider: Arc<Q>,
  debouncer: Debouncer<QuoteKey>,
  fetches: JoinSet<QuoteResult>,
}

impl<Q: QuoteProvider> QuoteRefreshController<Q> {
  /// Create a controller with the given quiescence window.
  pub fn new(provider: Arc<Q>, debounce: Duration) -> Self {
    Self {
      provider,
      debouncer: Debouncer::new(debounce),
      fetches: JoinSet::new(),
    }
  }

  /// Schedule a fetch for `key`, replacing any pending key.
  pub fn schedule(&mut self, key: QuoteKey) {
    debug!(
      pair = %key.pair_address,
      side = %key.side,
      order_type = %key.order_type,
      "Quote refresh scheduled"
    );
    self.debouncer.push(key);
  }

  /// Drop the pending key. Fetches already issued are unaffected.
  pub fn cancel_pending(&mut self) {
    if self.debouncer.cancel().is_some() {
      debug!("Pending quote refresh cancelled");
    }
  }

  pub const fn has_pending(&self) -> bool {
    self.debouncer.is_pending()
  }

  /// Fetches issued whose result has not been received yet.
  pub fn in_flight(&self) -> usize {
    self.fetches.len()
  }

  /// Wait for the next issued fetch or arrived result.
  ///
  /// Cancel-safe, so it can sit in a `select!` next to other sources.
  pub async fn next_event(&mut self) -> QuoteEvent {
    loop {
      tokio::select! {
        biased;

        Some(joined) = self.fetches.join_next() => match joined {
          Ok((key, result)) => return QuoteEvent::Arrived { key, result },
          Err(e) => error!(error = %e, "Quote fetch task ended without a result"),
        },
        key = self.debouncer.fire() => {
          self.issue(key.clone());
          return QuoteEvent::Issued(key);
        }
      }
    }
  }

  fn issue(&mut self, key: QuoteKey) {
    let provider = Arc::clone(&self.provider);
    self.fetches.spawn(async move {
      let result = provider
        .fetch_quote(&key)
        .await
        .map_err(|e| format!("{e:#}"));
      if let Err(error) = &result {
        warn!(error = %error, "Quote fetch failed");
      }
      (key, result)
    });
  }
}
