//! User and Position Entities
//!
//! Users hold a play-money balance; positions hold per-market YES/NO
//! share counts keyed by (user, market). Both are mutated exclusively
//! through ledger operations, which keep balance and share counts
//! non-negative at all times.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::market::{MarketId, Side};

/// Lightweight user identifier (`user_<n>`).
pub type UserId = String;

/// A registered participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Play-money balance. Never negative.
    pub balance: Decimal,
}

impl User {
    pub fn new(id: UserId, name: String, balance: Decimal) -> Self {
        Self { id, name, balance }
    }

    /// Whether the balance covers `cost`.
    pub fn can_afford(&self, cost: Decimal) -> bool {
        self.balance >= cost
    }
}

/// A user's holdings in one market.
///
/// Created implicitly on first trade, zeroed on payout claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub user_id: UserId,
    pub market_id: MarketId,
    /// YES share count. Never negative.
    pub yes_shares: Decimal,
    /// NO share count. Never negative.
    pub no_shares: Decimal,
}

impl Position {
    /// An empty position for a (user, market) pair.
    pub fn empty(user_id: UserId, market_id: MarketId) -> Self {
        Self {
            user_id,
            market_id,
            yes_shares: Decimal::ZERO,
            no_shares: Decimal::ZERO,
        }
    }

    /// Share count on `side`.
    pub fn shares(&self, side: Side) -> Decimal {
        match side {
            Side::Yes => self.yes_shares,
            Side::No => self.no_shares,
        }
    }

    /// Add shares on `side` (buy fill).
    pub fn add_shares(&mut self, side: Side, quantity: Decimal) {
        match side {
            Side::Yes => self.yes_shares += quantity,
            Side::No => self.no_shares += quantity,
        }
    }

    /// Remove shares on `side` (sell fill). Caller validates the
    /// position covers `quantity` first.
    pub fn remove_shares(&mut self, side: Side, quantity: Decimal) {
        match side {
            Side::Yes => self.yes_shares -= quantity,
            Side::No => self.no_shares -= quantity,
        }
    }

    /// Redemption value when the market resolves to `outcome`:
    /// winning shares pay 1:1, losing shares pay zero.
    pub fn value_at_resolution(&self, outcome: Side) -> Decimal {
        self.shares(outcome)
    }

    /// Whether both share counts are zero.
    pub fn is_empty(&self) -> bool {
        self.yes_shares.is_zero() && self.no_shares.is_zero()
    }

    /// Zero out both sides (payout claim consumed the position).
    pub fn clear(&mut self) {
        self.yes_shares = Decimal::ZERO;
        self.no_shares = Decimal::ZERO;
    }
}
