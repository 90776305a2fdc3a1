//! Scoped Locks - Per-Market and Per-User Mutual Exclusion
//!
//! The ledger serializes mutating operations per market and per user
//! while letting independent markets proceed fully in parallel. Each
//! scope (a market ID or user ID) maps to its own async mutex;
//! acquisition is bounded by a timeout so contention surfaces as
//! `LedgerError::Busy` instead of an indefinite hang.
//!
//! Lock ordering is fixed: operations touching both a market and a
//! user always take the market lock first, which rules out deadlock
//! between concurrent trades.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::domain::error::LedgerError;

/// Guard holding one acquired scope. The scope unlocks on drop.
pub type ScopeGuard = OwnedMutexGuard<()>;

/// Registry of named mutual-exclusion scopes with bounded acquisition.
pub struct ScopedLocks {
  scopes: Mutex<HashMap<String, Arc<Mutex<()>>>>,
  timeout: Duration,
}

impl ScopedLocks {
  pub fn new(timeout: Duration) -> Self {
    Self {
      scopes: Mutex::new(HashMap::new()),
      timeout,
    }
  }

  /// Acquire the mutex for `scope`, waiting at most the configured
  /// timeout. Scopes are created lazily on first use.
  pub async fn acquire(&self, scope: &str) -> Result<ScopeGuard, LedgerError> {
    let lock = {
      let mut scopes = self.scopes.lock().await;
      scopes
        .entry(scope.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
    };

    match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
      Ok(guard) => Ok(guard),
      Err(_) => {
        debug!(scope, timeout_ms = self.timeout.as_millis() as u64, "Lock acquisition timed out");
        Err(LedgerError::Busy {
          scope: scope.to_string(),
        })
      }
    }
  }
}
