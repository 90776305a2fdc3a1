//! Constant-Product Pricing Engine
//!
//! Pure functions computing trade costs, sale proceeds, and quoted
//! prices for a binary market from its `(yes_pool, no_pool)` state.
//! No mutation, no I/O.
//!
//! The pricing rule is the constant-product invariant: a trade moves
//! shares in or out of one pool and the opposing pool absorbs the AMM
//! response so that `yes_pool * no_pool` stays at `k`. Buying q shares
//! of side S shrinks the S pool by q and grows the other pool to
//! `k / (S_pool - q)`; the growth is the buyer's cost. Selling is the
//! exact inverse.
//!
//! All arithmetic is `rust_decimal::Decimal` (28 significant digits),
//! so invariant drift across long trade sequences stays far inside the
//! configured tolerance. Floating point would not give that guarantee.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::market::Side;
use super::trade::Direction;

/// Default relative tolerance for the invariant drift check.
pub const DEFAULT_INVARIANT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// The full economic effect of a priced trade: the post-trade pools,
/// the money amount (cost for buys, proceeds for sells), and the
/// average per-share price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeEffect {
    pub yes_pool: Decimal,
    pub no_pool: Decimal,
    /// Cost to the buyer or proceeds to the seller. Always positive.
    pub amount: Decimal,
    /// `amount / quantity`.
    pub price: Decimal,
}

/// Quoted price of one share of `side`: the opposing pool over the
/// total. YES and NO prices sum to 1 by construction.
pub fn spot_price(yes_pool: Decimal, no_pool: Decimal, side: Side) -> Decimal {
    let total = yes_pool + no_pool;
    match side {
        Side::Yes => no_pool / total,
        Side::No => yes_pool / total,
    }
}

/// Price and pool effect of buying `quantity` shares of `side`.
///
/// The buyer drains `quantity` from the side pool; the opposing pool
/// grows to restore `k`, and that growth is the cost.
pub fn buy_effect(
    yes_pool: Decimal,
    no_pool: Decimal,
    side: Side,
    quantity: Decimal,
) -> Result<TradeEffect, LedgerError> {
    ensure_positive_quantity(quantity)?;

    let k = pool_product(yes_pool, no_pool)?;
    let (side_pool, other_pool) = split_pools(yes_pool, no_pool, side);

    if quantity >= side_pool {
        return Err(LedgerError::InsufficientLiquidity {
            requested: quantity,
            available: side_pool,
        });
    }

    // A quantity just under the pool drives `k / side_after` past
    // Decimal's range; the pool has no tradable depth there, so it
    // reports as insufficient liquidity rather than panicking.
    let side_after = side_pool - quantity;
    let Some(other_after) = k.checked_div(side_after) else {
        return Err(LedgerError::InsufficientLiquidity {
            requested: quantity,
            available: side_pool,
        });
    };
    let cost = other_after - other_pool;
    if cost <= Decimal::ZERO {
        return Err(LedgerError::InvalidTrade(format!(
            "degenerate buy cost {cost} for {quantity} {side} shares"
        )));
    }

    Ok(assemble(side, side_after, other_after, cost, quantity))
}

/// Price and pool effect of selling `quantity` shares of `side`.
///
/// Inverse of [`buy_effect`]: the shares return to the side pool and
/// the opposing pool shrinks back to `k / side_after`; the shrinkage
/// is the seller's proceeds. The ledger, not this function, checks
/// that the seller actually holds the shares.
pub fn sell_effect(
    yes_pool: Decimal,
    no_pool: Decimal,
    side: Side,
    quantity: Decimal,
) -> Result<TradeEffect, LedgerError> {
    ensure_positive_quantity(quantity)?;

    let k = pool_product(yes_pool, no_pool)?;
    let (side_pool, other_pool) = split_pools(yes_pool, no_pool, side);

    let side_after = side_pool.checked_add(quantity).ok_or_else(|| {
        LedgerError::InvalidTrade(format!("sale quantity {quantity} overflows the {side} pool"))
    })?;
    let other_after = k.checked_div(side_after).ok_or_else(|| {
        LedgerError::InvalidTrade(format!("degenerate pool state {yes_pool}/{no_pool}"))
    })?;
    let proceeds = other_pool - other_after;
    if proceeds <= Decimal::ZERO {
        return Err(LedgerError::InvalidTrade(format!(
            "degenerate sale proceeds {proceeds} for {quantity} {side} shares"
        )));
    }

    Ok(assemble(side, side_after, other_after, proceeds, quantity))
}

/// Dispatch on direction. This is the single entry point the ledger
/// and quoting use.
pub fn trade_effect(
    yes_pool: Decimal,
    no_pool: Decimal,
    side: Side,
    direction: Direction,
    quantity: Decimal,
) -> Result<TradeEffect, LedgerError> {
    match direction {
        Direction::Buy => buy_effect(yes_pool, no_pool, side, quantity),
        Direction::Sell => sell_effect(yes_pool, no_pool, side, quantity),
    }
}

/// Relative drift of `yes_pool * no_pool` from a reference `k`.
pub fn invariant_drift(yes_pool: Decimal, no_pool: Decimal, k: Decimal) -> Decimal {
    if k.is_zero() {
        return Decimal::ZERO;
    }
    ((yes_pool * no_pool - k) / k).abs()
}

/// Whether the post-trade pools still satisfy the invariant within
/// `tolerance` (relative).
pub fn invariant_holds(
    yes_pool: Decimal,
    no_pool: Decimal,
    k: Decimal,
    tolerance: Decimal,
) -> bool {
    invariant_drift(yes_pool, no_pool, k) <= tolerance
}

fn pool_product(yes_pool: Decimal, no_pool: Decimal) -> Result<Decimal, LedgerError> {
    yes_pool.checked_mul(no_pool).ok_or_else(|| {
        LedgerError::InvalidTrade(format!("pool product {yes_pool} * {no_pool} overflows"))
    })
}

fn ensure_positive_quantity(quantity: Decimal) -> Result<(), LedgerError> {
    if quantity <= Decimal::ZERO {
        return Err(LedgerError::InvalidTrade(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    Ok(())
}

fn split_pools(yes_pool: Decimal, no_pool: Decimal, side: Side) -> (Decimal, Decimal) {
    match side {
        Side::Yes => (yes_pool, no_pool),
        Side::No => (no_pool, yes_pool),
    }
}

fn assemble(
    side: Side,
    side_after: Decimal,
    other_after: Decimal,
    amount: Decimal,
    quantity: Decimal,
) -> TradeEffect {
    let (yes_pool, no_pool) = match side {
        Side::Yes => (side_after, other_after),
        Side::No => (other_after, side_after),
    };
    TradeEffect {
        yes_pool,
        no_pool,
        amount,
        price: amount / quantity,
    }
}
