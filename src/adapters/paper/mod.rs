//! Paper Adapters - Offline Stand-ins for the DEX
//!
//! Simulated quote service and wallet/ledger used by the interactive
//! session and integration tests. No network access.

pub mod ledger;
pub mod quoter;

pub use ledger::PaperLedger;
pub use quoter::{PaperFees, PaperQuoter};
