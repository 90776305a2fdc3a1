//! Persistence Gateway Port - Durable Storage Interface
//!
//! Defines the transactional storage capability the ledger requires.
//! The engine never persists anything itself: every mutating operation
//! stages its writes into a gateway transaction and commits it as one
//! unit. A failed commit must leave durable state untouched, and the
//! ledger holds no state of its own, so the pair stays consistent.
//!
//! Adapters implement this trait; `InMemoryGateway` in
//! `crate::adapters::persistence` is the reference implementation.

use async_trait::async_trait;

use crate::domain::account::{Position, User, UserId};
use crate::domain::market::{Market, MarketId};
use crate::domain::trade::TradeRecord;

/// Named counters for crash-consistent identifier allocation.
pub mod counters {
  pub const MARKET: &str = "market";
  pub const USER: &str = "user";
  pub const TRADE: &str = "trade";
}

/// Trait for transactional durable storage providers.
///
/// Reads execute against committed state. Writes go through a `Txn`
/// and become visible only on `commit`, which is all-or-nothing.
#[async_trait]
pub trait PersistenceGateway: Send + Sync + 'static {
  /// Adapter-specific transaction handle holding staged writes.
  type Txn: Send;

  /// Open a new transaction.
  async fn begin(&self) -> anyhow::Result<Self::Txn>;

  /// Atomically apply every staged write. Either all of them become
  /// durable and visible, or none do.
  async fn commit(&self, txn: Self::Txn) -> anyhow::Result<()>;

  /// Discard every staged write.
  async fn rollback(&self, txn: Self::Txn) -> anyhow::Result<()>;

  /// Allocate the next value of a named monotone counter. Must be
  /// crash-consistent with stored state: an allocated value is never
  /// handed out twice.
  async fn next_id(&self, counter: &str) -> anyhow::Result<u64>;

  /// Load a market by ID from committed state.
  async fn read_market(&self, id: &MarketId) -> anyhow::Result<Option<Market>>;

  /// Stage a market upsert.
  async fn write_market(&self, txn: &mut Self::Txn, market: &Market) -> anyhow::Result<()>;

  /// Stage a market deletion. The ledger guarantees no dependent
  /// positions or trades exist before staging this.
  async fn delete_market(&self, txn: &mut Self::Txn, id: &MarketId) -> anyhow::Result<()>;

  /// Load a user by ID from committed state.
  async fn read_user(&self, id: &UserId) -> anyhow::Result<Option<User>>;

  /// Stage a user upsert.
  async fn write_user(&self, txn: &mut Self::Txn, user: &User) -> anyhow::Result<()>;

  /// Load a position by (user, market) from committed state.
  async fn read_position(
    &self,
    user_id: &UserId,
    market_id: &MarketId,
  ) -> anyhow::Result<Option<Position>>;

  /// Stage a position upsert.
  async fn write_position(&self, txn: &mut Self::Txn, position: &Position) -> anyhow::Result<()>;

  /// Stage an append to the immutable trade log.
  async fn append_trade(&self, txn: &mut Self::Txn, trade: &TradeRecord) -> anyhow::Result<()>;

  /// All committed trades for a market, in commit order.
  async fn market_trades(&self, id: &MarketId) -> anyhow::Result<Vec<TradeRecord>>;

  /// All committed positions referencing a market.
  async fn market_positions(&self, id: &MarketId) -> anyhow::Result<Vec<Position>>;

  /// All committed positions held by a user.
  async fn user_positions(&self, user_id: &UserId) -> anyhow::Result<Vec<Position>>;

  /// Check if the gateway is healthy (reachable, writable).
  async fn is_healthy(&self) -> bool;
}
