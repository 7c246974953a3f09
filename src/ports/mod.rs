//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the order input engine
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `QuoteProvider`: Trade outcome estimates for an order shape
//! - `BalanceProvider`: Wallet balances by token address
//! - `OrderSubmitter`: Wallet-signed order submission

pub mod balance_provider;
pub mod order_submitter;
pub mod quote_provider;

pub use balance_provider::BalanceProvider;
pub use order_submitter::{LedgerStatus, OrderSubmitter, SubmitAction, SubmitPayload};
pub use quote_provider::QuoteProvider;
