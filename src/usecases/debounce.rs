//! Debouncer - Last-Write-Wins Timer
//!
//! Coalesces rapid inputs: every `push` replaces the pending value and
//! restarts the quiescence window, and `fire` resolves with the last
//! value once the window has elapsed without a new push. Shared by the
//! slider percentage and the quote refresh.
//!
//! Polled from the owner's `tokio::select!` loop rather than spawned,
//! so the value is always delivered on the task that owns the state.

use std::future;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Last-write-wins timer parameterized by its quiescence window.
#[derive(Debug)]
pub struct Debouncer<T> {
  quiescence: Duration,
  pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
  /// Create an idle debouncer.
  pub const fn new(quiescence: Duration) -> Self {
    Self {
      quiescence,
      pending: None,
    }
  }

  /// Replace the pending value and restart the window.
  pub fn push(&mut self, value: T) {
    self.pending = Some((Instant::now() + self.quiescence, value));
  }

  /// Drop the pending value, returning it if there was one.
  pub fn cancel(&mut self) -> Option<T> {
    self.pending.take().map(|(_, value)| value)
  }

  pub const fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  pub const fn quiescence(&self) -> Duration {
    self.quiescence
  }

  /// Resolve with the pending value once its window has elapsed.
  ///
  /// Never resolves while idle. Cancel-safe: dropping the future before
  /// it resolves keeps the pending value.
  pub async fn fire(&mut self) -> T {
    let Some(deadline) = self.pending.as_ref().map(|(deadline, _)| *deadline) else {
      return future::pending().await;
    };
    sleep_until(deadline).await;
    match self.pending.take() {
      Some((_, value)) => value,
      None => future::pending().await,
    }
  }
}
