//! Ledger Error Taxonomy
//!
//! Every rejected operation maps to a specific variant; callers never
//! see a generic failure. All validation errors are raised before any
//! state is touched; `Persistence` is the only variant that can surface
//! after the engine has computed an effect, and it guarantees the effect
//! was not applied.

use rust_decimal::Decimal;
use thiserror::Error;

use super::account::UserId;
use super::market::MarketId;

/// Errors returned by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Zero/negative quantity or a degenerate pricing result.
    #[error("invalid trade: {0}")]
    InvalidTrade(String),

    /// Requested buy quantity meets or exceeds the available pool.
    #[error("insufficient liquidity: requested {requested} shares, pool holds {available}")]
    InsufficientLiquidity {
        requested: Decimal,
        available: Decimal,
    },

    /// Buy cost exceeds the user's balance.
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// Sell quantity exceeds the user's position on that side.
    #[error("insufficient shares: need {needed}, have {available}")]
    InsufficientShares { needed: Decimal, available: Decimal },

    /// Buy cost exceeds the caller-supplied `max_cost` slippage bound.
    #[error("cost {cost} exceeds max cost {limit}")]
    CostLimitExceeded { cost: Decimal, limit: Decimal },

    /// Trading attempted on a resolved market.
    #[error("market {0} is closed to trading")]
    MarketClosed(MarketId),

    /// Resolution attempted on an already-resolved market.
    #[error("market {0} is already resolved")]
    AlreadyResolved(MarketId),

    /// Payout claim attempted before the market resolved.
    #[error("market {0} is not resolved yet")]
    NotResolved(MarketId),

    /// Payout claim on an empty (or already-claimed) position.
    #[error("user {user_id} has no unclaimed position in market {market_id}")]
    AlreadyClaimed { user_id: UserId, market_id: MarketId },

    /// Unknown market identifier.
    #[error("market {0} not found")]
    MarketNotFound(MarketId),

    /// Unknown user identifier.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// Deletion blocked by dependent positions or trades.
    #[error("market {0} has dependent positions or trades")]
    MarketInUse(MarketId),

    /// The persistence gateway failed; the operation was not applied
    /// and may be retried by the caller.
    #[error("persistence failure: {0}")]
    Persistence(#[source] anyhow::Error),

    /// Lock acquisition exceeded the configured timeout.
    #[error("timed out waiting for {scope} lock")]
    Busy { scope: String },
}

impl From<anyhow::Error> for LedgerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Persistence(err)
    }
}

impl LedgerError {
    /// Whether the caller may retry the operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Busy { .. })
    }
}
