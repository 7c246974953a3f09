//! Domain layer - Order input rules and arithmetic.
//!
//! Pure logic for the order-in-progress: decimal arithmetic, the
//! order state store and its transitions, derivation of displayed
//! amounts, validation and percentage-of-balance sizing.
//! No I/O and no logging here (hexagonal architecture inner ring).

pub mod decimal;
pub mod derivation;
pub mod error;
pub mod numeric_input;
pub mod order;
pub mod percentage;
pub mod quote;
pub mod state;
pub mod validation;

// Re-export core types for convenience
pub use derivation::{DisplayAmounts, derive_display_amounts};
pub use error::{ArithmeticError, PercentageError};
pub use order::{
    AmountInput, Balances, Leg, OrderSide, OrderTicket, OrderType, SpecifiedToken, TokenInfo,
    TokenLeg, TopOfBook, TradingPair,
};
pub use percentage::{PercentagePolicy, PercentageTarget};
pub use quote::{EstimatedTotal, FeeBreakdown, Quote, QuoteKey, QuoteResponse};
pub use state::{Effect, OrderState, QuoteApplication, TokenAmountUpdate};
pub use validation::{ValidationMessage, ValidationResult};
