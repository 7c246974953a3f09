//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the order form's workflows. Each use case is a self-contained
//! business operation.
//!
//! Use cases:
//! - `OrderInputEngine`: Owns the order and drives everything below
//! - `QuoteRefreshController`: Debounced quote fetching
//! - `PercentageController`: Debounced percentage-of-balance sizing
//! - `WalletBalances`: Balance cache for the connected wallet
//! - `SubmissionController`: Preconditions, hand-off, outcome mapping

pub mod balance_percentage;
pub mod balances;
pub mod debounce;
pub mod order_input;
pub mod quote_refresh;
pub mod submission;

pub use order_input::{EngineEvent, OrderInputEngine, OrderView};
pub use submission::{SubmissionOutcome, SubmissionRefusal};
