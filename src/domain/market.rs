//! Market Entity - Binary Outcome AMM Pool State
//!
//! A market holds a YES pool and a NO pool of outcome shares. Prices
//! are derived from the pools by the constant-product rule; the
//! invariant constant `k = yes_pool * no_pool` is always recomputed
//! from the pools rather than stored, so it cannot drift from them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::lifecycle::MarketState;
use super::pricing;

/// Lightweight market identifier (`market_<n>`).
pub type MarketId = String;

/// Which binary outcome a share is backed by. Doubles as the
/// resolution outcome type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Yes,
    No,
}

impl Side {
    /// The opposing side.
    pub fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
        }
    }
}

/// A binary prediction market and its AMM pool state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    /// Unique market identifier.
    pub id: MarketId,
    /// The question the market resolves.
    pub question: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Advisory close timestamp. Not enforced by the engine.
    pub closes_at: DateTime<Utc>,
    /// Lifecycle state.
    pub state: MarketState,
    /// Resolution outcome, set exactly once on resolve.
    pub outcome: Option<Side>,
    /// YES share reserve. Positive while the market is open.
    pub yes_pool: Decimal,
    /// NO share reserve. Positive while the market is open.
    pub no_pool: Decimal,
}

impl Market {
    /// Create a new open market with equal initial pools.
    pub fn new(
        id: MarketId,
        question: String,
        closes_at: DateTime<Utc>,
        initial_liquidity: Decimal,
    ) -> Self {
        Self {
            id,
            question,
            created_at: Utc::now(),
            closes_at,
            state: MarketState::Open,
            outcome: None,
            yes_pool: initial_liquidity,
            no_pool: initial_liquidity,
        }
    }

    /// The constant-product invariant, recomputed from the pools.
    pub fn invariant_k(&self) -> Decimal {
        self.yes_pool * self.no_pool
    }

    /// Current quoted price for one share of `side`.
    ///
    /// YES and NO prices sum to 1 by construction.
    pub fn spot_price(&self, side: Side) -> Decimal {
        pricing::spot_price(self.yes_pool, self.no_pool, side)
    }

    /// Pool reserve for `side`.
    pub fn pool(&self, side: Side) -> Decimal {
        match side {
            Side::Yes => self.yes_pool,
            Side::No => self.no_pool,
        }
    }

    /// Apply a priced trade effect to the pools. Only the pricing
    /// engine produces valid effects, so the pools stay positive.
    pub fn apply_pools(&mut self, yes_pool: Decimal, no_pool: Decimal) {
        self.yes_pool = yes_pool;
        self.no_pool = no_pool;
    }

    /// Transition `Open -> Resolved`, fixing the outcome and freezing
    /// the pools. Irreversible.
    pub fn resolve(&mut self, outcome: Side) -> Result<(), LedgerError> {
        self.state.ensure_resolvable(&self.id)?;
        self.state = MarketState::Resolved;
        self.outcome = Some(outcome);
        Ok(())
    }
}
