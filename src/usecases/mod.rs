//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! engine's public operations. The ledger is the entire mutable
//! surface; nothing else writes economic state.
//!
//! Use cases:
//! - `Ledger`: atomic trade, resolution, payout, and admin operations
//! - `ScopedLocks`: per-market / per-user mutual exclusion with
//!   bounded waits

pub mod ledger;
pub mod locks;

pub use ledger::{Ledger, MarketInfo, PositionSummary, Quote, UserInfo};
pub use locks::ScopedLocks;
