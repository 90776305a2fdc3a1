//! In-Memory Gateway - Transactional Store with Optional JSON Snapshots
//!
//! Reference implementation of the `PersistenceGateway` port. State
//! lives in a single `RwLock`-guarded store; transactions stage their
//! writes locally and apply them under one write lock on commit, so a
//! commit is atomic with respect to every reader and other committer.
//!
//! With a snapshot path configured, each successful commit also
//! serializes the whole store to JSON using atomic writes (write to
//! tmp file, then rename). If the snapshot write fails the in-memory
//! apply is reverted, keeping memory and disk consistent.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::account::{Position, User, UserId};
use crate::domain::market::{Market, MarketId};
use crate::domain::trade::TradeRecord;
use crate::ports::gateway::PersistenceGateway;

/// Position map key: `user_id/market_id`. String-keyed so the store
/// serializes to plain JSON.
fn position_key(user_id: &UserId, market_id: &MarketId) -> String {
    format!("{user_id}/{market_id}")
}

/// The complete committed state.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Store {
    markets: HashMap<MarketId, Market>,
    users: HashMap<UserId, User>,
    positions: HashMap<String, Position>,
    trades: Vec<TradeRecord>,
    counters: HashMap<String, u64>,
}

/// Staged writes for one transaction. Nothing here is visible to
/// readers until `commit` applies it.
#[derive(Debug, Default)]
pub struct MemoryTxn {
    markets: Vec<Market>,
    users: Vec<User>,
    positions: Vec<Position>,
    trades: Vec<TradeRecord>,
    deleted_markets: Vec<MarketId>,
}

/// In-memory transactional gateway, optionally snapshot-backed.
pub struct InMemoryGateway {
    store: RwLock<Store>,
    /// Snapshot file path; `None` disables durability.
    snapshot_path: Option<PathBuf>,
    /// Temporary path for atomic snapshot writes.
    tmp_path: Option<PathBuf>,
}

impl InMemoryGateway {
    /// A purely in-memory gateway (tests, ephemeral hosts).
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::default()),
            snapshot_path: None,
            tmp_path: None,
        }
    }

    /// A gateway that persists a JSON snapshot of the whole store on
    /// every commit, loading any existing snapshot first.
    pub async fn with_snapshot(path: impl Into<PathBuf>) -> Result<Self> {
        let snapshot_path: PathBuf = path.into();
        let tmp_path = snapshot_path.with_extension("json.tmp");

        let store = if snapshot_path.exists() {
            let json = fs::read_to_string(&snapshot_path)
                .await
                .context("Failed to read snapshot file")?;
            let store: Store =
                serde_json::from_str(&json).context("Failed to parse snapshot JSON")?;
            info!(
                path = %snapshot_path.display(),
                markets = store.markets.len(),
                users = store.users.len(),
                "Snapshot loaded"
            );
            store
        } else {
            info!(path = %snapshot_path.display(), "No snapshot found, starting fresh");
            Store::default()
        };

        Ok(Self {
            store: RwLock::new(store),
            snapshot_path: Some(snapshot_path),
            tmp_path: Some(tmp_path),
        })
    }

    /// Persist `store` atomically (tmp write, then rename).
    async fn write_snapshot(&self, store: &Store) -> Result<()> {
        let (Some(path), Some(tmp)) = (&self.snapshot_path, &self.tmp_path) else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(store).context("Failed to serialize snapshot")?;
        fs::write(tmp, &json)
            .await
            .context("Failed to write tmp snapshot file")?;
        fs::rename(tmp, path)
            .await
            .context("Failed to rename snapshot file")?;
        Ok(())
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    type Txn = MemoryTxn;

    async fn begin(&self) -> Result<MemoryTxn> {
        Ok(MemoryTxn::default())
    }

    async fn commit(&self, txn: MemoryTxn) -> Result<()> {
        let mut store = self.store.write().await;
        // Undo snapshot only matters when a disk write can fail.
        let before = self.snapshot_path.as_ref().map(|_| store.clone());

        for market in txn.markets {
            store.markets.insert(market.id.clone(), market);
        }
        for user in txn.users {
            store.users.insert(user.id.clone(), user);
        }
        for position in txn.positions {
            let key = position_key(&position.user_id, &position.market_id);
            store.positions.insert(key, position);
        }
        store.trades.extend(txn.trades);
        for market_id in &txn.deleted_markets {
            store.markets.remove(market_id);
        }

        if let Err(err) = self.write_snapshot(&store).await {
            // Keep memory and disk consistent: undo the apply.
            if let Some(before) = before {
                *store = before;
            }
            return Err(err);
        }

        debug!(
            markets = store.markets.len(),
            trades = store.trades.len(),
            "Transaction committed"
        );
        Ok(())
    }

    async fn rollback(&self, txn: MemoryTxn) -> Result<()> {
        // Staged writes never touched the store; dropping them is the
        // whole rollback.
        drop(txn);
        Ok(())
    }

    async fn next_id(&self, counter: &str) -> Result<u64> {
        let mut store = self.store.write().await;
        let entry = store.counters.entry(counter.to_string()).or_insert(0);
        *entry += 1;
        let id = *entry;

        // Counters must survive a crash so IDs are never reissued.
        if let Err(err) = self.write_snapshot(&store).await {
            if let Some(value) = store.counters.get_mut(counter) {
                *value -= 1;
            }
            return Err(err);
        }
        Ok(id)
    }

    async fn read_market(&self, id: &MarketId) -> Result<Option<Market>> {
        Ok(self.store.read().await.markets.get(id).cloned())
    }

    async fn write_market(&self, txn: &mut MemoryTxn, market: &Market) -> Result<()> {
        txn.markets.push(market.clone());
        Ok(())
    }

    async fn delete_market(&self, txn: &mut MemoryTxn, id: &MarketId) -> Result<()> {
        txn.deleted_markets.push(id.clone());
        Ok(())
    }

    async fn read_user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.store.read().await.users.get(id).cloned())
    }

    async fn write_user(&self, txn: &mut MemoryTxn, user: &User) -> Result<()> {
        txn.users.push(user.clone());
        Ok(())
    }

    async fn read_position(
        &self,
        user_id: &UserId,
        market_id: &MarketId,
    ) -> Result<Option<Position>> {
        let key = position_key(user_id, market_id);
        Ok(self.store.read().await.positions.get(&key).cloned())
    }

    async fn write_position(&self, txn: &mut MemoryTxn, position: &Position) -> Result<()> {
        txn.positions.push(position.clone());
        Ok(())
    }

    async fn append_trade(&self, txn: &mut MemoryTxn, trade: &TradeRecord) -> Result<()> {
        txn.trades.push(trade.clone());
        Ok(())
    }

    async fn market_trades(&self, id: &MarketId) -> Result<Vec<TradeRecord>> {
        Ok(self
            .store
            .read()
            .await
            .trades
            .iter()
            .filter(|t| &t.market_id == id)
            .cloned()
            .collect())
    }

    async fn market_positions(&self, id: &MarketId) -> Result<Vec<Position>> {
        Ok(self
            .store
            .read()
            .await
            .positions
            .values()
            .filter(|p| &p.market_id == id)
            .cloned()
            .collect())
    }

    async fn user_positions(&self, user_id: &UserId) -> Result<Vec<Position>> {
        Ok(self
            .store
            .read()
            .await
            .positions
            .values()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn is_healthy(&self) -> bool {
        match &self.snapshot_path {
            Some(path) => path.parent().is_none_or(std::path::Path::exists),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use crate::ports::gateway::counters;

    fn sample_market(id: &str) -> Market {
        Market::new(
            id.to_string(),
            "Will it rain tomorrow?".to_string(),
            Utc::now(),
            dec!(100),
        )
    }

    #[tokio::test]
    async fn test_staged_writes_invisible_until_commit() {
        let gw = InMemoryGateway::new();
        let market = sample_market("market_1");

        let mut txn = gw.begin().await.unwrap();
        gw.write_market(&mut txn, &market).await.unwrap();
        assert!(gw.read_market(&market.id).await.unwrap().is_none());

        gw.commit(txn).await.unwrap();
        assert!(gw.read_market(&market.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rollback_discards_staged_writes() {
        let gw = InMemoryGateway::new();
        let market = sample_market("market_1");

        let mut txn = gw.begin().await.unwrap();
        gw.write_market(&mut txn, &market).await.unwrap();
        gw.rollback(txn).await.unwrap();

        assert!(gw.read_market(&market.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_next_id_is_monotonic_per_counter() {
        let gw = InMemoryGateway::new();
        assert_eq!(gw.next_id(counters::MARKET).await.unwrap(), 1);
        assert_eq!(gw.next_id(counters::MARKET).await.unwrap(), 2);
        // Independent counters
        assert_eq!(gw.next_id(counters::TRADE).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_market_in_transaction() {
        let gw = InMemoryGateway::new();
        let market = sample_market("market_1");

        let mut txn = gw.begin().await.unwrap();
        gw.write_market(&mut txn, &market).await.unwrap();
        gw.commit(txn).await.unwrap();

        let mut txn = gw.begin().await.unwrap();
        gw.delete_market(&mut txn, &market.id).await.unwrap();
        gw.commit(txn).await.unwrap();

        assert!(gw.read_market(&market.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_snapshot_write_reverts_commit() {
        let dir = std::env::temp_dir().join("prediction-ledger-test-missing");
        let _ = std::fs::remove_dir_all(&dir);
        // Parent directory missing, so every snapshot write fails.
        let path = dir.join("state.json");
        let gw = InMemoryGateway::with_snapshot(&path).await.unwrap();

        let market = sample_market("market_1");
        let mut txn = gw.begin().await.unwrap();
        gw.write_market(&mut txn, &market).await.unwrap();
        assert!(gw.commit(txn).await.is_err());

        // Memory stayed consistent with (absent) disk state.
        assert!(gw.read_market(&market.id).await.unwrap().is_none());
        assert!(!gw.is_healthy().await);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = std::env::temp_dir().join("prediction-ledger-test-snapshot");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("state.json");

        {
            let gw = InMemoryGateway::with_snapshot(&path).await.unwrap();
            let market = sample_market("market_1");
            let mut txn = gw.begin().await.unwrap();
            gw.write_market(&mut txn, &market).await.unwrap();
            gw.commit(txn).await.unwrap();
            gw.next_id(counters::MARKET).await.unwrap();
        }

        // A fresh gateway over the same path sees the committed state
        // and continues the counter.
        let gw = InMemoryGateway::with_snapshot(&path).await.unwrap();
        assert!(gw.read_market(&"market_1".to_string()).await.unwrap().is_some());
        assert_eq!(gw.next_id(counters::MARKET).await.unwrap(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
