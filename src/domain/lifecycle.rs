//! Market Lifecycle - Open/Resolved State Machine
//!
//! A market is created `Open` and transitions exactly once to
//! `Resolved`, at which point its pools stop being price-bearing and
//! winning shares become redeemable. The transition is irreversible.
//!
//! The close timestamp on a market is advisory metadata for callers
//! and UIs; reaching it does NOT flip the state. Auto-closing is
//! intentionally out of scope for the engine.

use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::market::MarketId;

/// Lifecycle state of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketState {
    /// Trading permitted.
    Open,
    /// Terminal: outcome fixed, pools frozen, claims permitted.
    Resolved,
}

impl MarketState {
    /// Guard for mutating trade operations.
    pub fn ensure_open(self, market_id: &MarketId) -> Result<(), LedgerError> {
        match self {
            Self::Open => Ok(()),
            Self::Resolved => Err(LedgerError::MarketClosed(market_id.clone())),
        }
    }

    /// Guard for the `Open -> Resolved` transition.
    pub fn ensure_resolvable(self, market_id: &MarketId) -> Result<(), LedgerError> {
        match self {
            Self::Open => Ok(()),
            Self::Resolved => Err(LedgerError::AlreadyResolved(market_id.clone())),
        }
    }

    /// Guard for payout claims.
    pub fn ensure_resolved(self, market_id: &MarketId) -> Result<(), LedgerError> {
        match self {
            Self::Resolved => Ok(()),
            Self::Open => Err(LedgerError::NotResolved(market_id.clone())),
        }
    }
}

impl std::fmt::Display for MarketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Resolved => write!(f, "RESOLVED"),
        }
    }
}
