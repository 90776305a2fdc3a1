//! Trade Types - Requests, Records, and Rationale
//!
//! A `TradeRequest` is what callers hand the ledger; a `TradeRecord`
//! is the immutable, append-only audit entry produced by a committed
//! trade. The optional rationale payload travels with the record but
//! is never interpreted by the engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::UserId;
use super::market::{MarketId, Side};

/// Lightweight trade identifier (`trade_<n>`).
pub type TradeId = String;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Free-text audit metadata attached to a trade, typically produced
/// by an automated trading agent. Opaque to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRationale {
    /// Why the trade was made.
    pub reasoning: String,
    /// Model that produced the decision, if any.
    pub model_name: Option<String>,
    /// Strategy label, if any.
    pub strategy: Option<String>,
    /// Self-reported confidence in [0, 1], if any.
    pub confidence: Option<f64>,
    /// Whether an LLM agent originated the trade.
    pub is_llm: bool,
}

/// A trade a caller wants executed.
#[derive(Debug, Clone)]
pub struct TradeRequest {
    pub user_id: UserId,
    pub market_id: MarketId,
    pub side: Side,
    pub direction: Direction,
    /// Number of shares to buy or sell. Must be positive.
    pub quantity: Decimal,
    /// Optional slippage bound for buys: reject if cost exceeds this.
    pub max_cost: Option<Decimal>,
    /// Optional audit metadata, stored verbatim.
    pub rationale: Option<TradeRationale>,
}

impl TradeRequest {
    /// A plain request with no slippage bound or rationale.
    pub fn new(
        user_id: UserId,
        market_id: MarketId,
        side: Side,
        direction: Direction,
        quantity: Decimal,
    ) -> Self {
        Self {
            user_id,
            market_id,
            side,
            direction,
            quantity,
            max_cost: None,
            rationale: None,
        }
    }

    /// Attach a buy-cost ceiling.
    pub fn with_max_cost(mut self, max_cost: Decimal) -> Self {
        self.max_cost = Some(max_cost);
        self
    }

    /// Attach audit metadata.
    pub fn with_rationale(mut self, rationale: TradeRationale) -> Self {
        self.rationale = Some(rationale);
        self
    }
}

/// Immutable record of a committed trade. Append-only; never mutated
/// or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Unique trade identifier.
    pub id: TradeId,
    pub user_id: UserId,
    pub market_id: MarketId,
    pub side: Side,
    pub direction: Direction,
    /// Shares bought or sold.
    pub quantity: Decimal,
    /// Average price paid or received per share (`amount / quantity`).
    pub price: Decimal,
    /// Total cost (buy) or proceeds (sell).
    pub amount: Decimal,
    /// Optional audit metadata, stored verbatim.
    pub rationale: Option<TradeRationale>,
    /// Commit timestamp.
    pub executed_at: DateTime<Utc>,
}
