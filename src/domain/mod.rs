//! Domain layer - Core business logic and models.
//!
//! This module contains the pure domain logic for the market ledger
//! engine: entities, the constant-product pricing rules, the market
//! lifecycle state machine, and the error taxonomy. No I/O here
//! (hexagonal architecture inner ring); everything is testable in
//! isolation.

pub mod account;
pub mod error;
pub mod lifecycle;
pub mod market;
pub mod pricing;
pub mod trade;

// Re-export core types for convenience
pub use account::{Position, User, UserId};
pub use error::LedgerError;
pub use lifecycle::MarketState;
pub use market::{Market, MarketId, Side};
pub use pricing::TradeEffect;
pub use trade::{Direction, TradeRationale, TradeRecord, TradeRequest};
