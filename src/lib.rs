//! Prediction Ledger - Library Root
//!
//! A constant-product AMM ledger engine for binary (YES/NO) prediction
//! markets: pool pricing, atomic balance/position accounting, market
//! resolution, and claim-based payouts over a pluggable transactional
//! storage gateway.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;

pub use config::EngineConfig;
pub use domain::{
    Direction, LedgerError, Market, MarketState, Position, Side, TradeRecord, TradeRequest, User,
};
pub use ports::PersistenceGateway;
pub use usecases::Ledger;
