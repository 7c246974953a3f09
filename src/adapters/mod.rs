//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! collaborators. Each sub-module groups adapters by infrastructure
//! concern.
//!
//! Adapter categories:
//! - `paper`: Simulated quote service, wallet and ledger
//! - `metrics`: Prometheus metrics export

pub mod metrics;
pub mod paper;
