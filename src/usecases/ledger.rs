//! Ledger Use Case - Atomic Market, Balance, and Position Accounting
//!
//! The ledger owns every mutation of economic state. Each public
//! operation validates fully before touching anything, then stages all
//! of its writes into one gateway transaction and commits it as a unit,
//! so callers only ever observe fully applied or fully absent effects.
//!
//! Concurrency contract: mutating operations serialize per market and
//! per user (market lock first, then user lock); independent markets
//! proceed in parallel. Lock waits are bounded and surface as `Busy`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::config::EngineConfig;
use crate::domain::account::{Position, User, UserId};
use crate::domain::lifecycle::MarketState;
use crate::domain::market::{Market, MarketId, Side};
use crate::domain::pricing;
use crate::domain::trade::{Direction, TradeRecord, TradeRequest};
use crate::domain::LedgerError;
use crate::ports::gateway::{counters, PersistenceGateway};

use super::locks::ScopedLocks;

/// Read-only pricing preview for UI display. Produced without locks
/// and without mutating anything.
#[derive(Debug, Clone)]
pub struct Quote {
  pub market_id: MarketId,
  pub side: Side,
  pub direction: Direction,
  pub quantity: Decimal,
  /// Cost (buy) or proceeds (sell) for the full quantity.
  pub amount: Decimal,
  /// Average per-share price for the full quantity.
  pub price: Decimal,
  /// Quoted price of `side` before the hypothetical trade.
  pub spot_before: Decimal,
  /// Quoted price of `side` after the hypothetical trade.
  pub spot_after: Decimal,
}

/// Snapshot of a market's public state.
#[derive(Debug, Clone)]
pub struct MarketInfo {
  pub id: MarketId,
  pub question: String,
  pub state: MarketState,
  pub outcome: Option<Side>,
  pub yes_pool: Decimal,
  pub no_pool: Decimal,
  pub yes_price: Decimal,
  pub no_price: Decimal,
  /// Total money moved across all trades on this market.
  pub volume: Decimal,
  pub created_at: DateTime<Utc>,
  pub closes_at: DateTime<Utc>,
}

/// One position inside a [`UserInfo`] summary.
#[derive(Debug, Clone)]
pub struct PositionSummary {
  pub market_id: MarketId,
  pub question: String,
  pub yes_shares: Decimal,
  pub no_shares: Decimal,
  /// Mark-to-market value for open markets, redemption value for
  /// resolved ones.
  pub current_value: Decimal,
}

/// Snapshot of a user's balance and holdings.
#[derive(Debug, Clone)]
pub struct UserInfo {
  pub id: UserId,
  pub name: String,
  pub balance: Decimal,
  pub positions: Vec<PositionSummary>,
  /// Balance plus the value of every position.
  pub total_value: Decimal,
}

/// The market ledger engine.
///
/// Generic over the persistence gateway so hosts can plug in any
/// transactional store; tests use the in-memory adapter.
pub struct Ledger<G: PersistenceGateway> {
  gateway: Arc<G>,
  config: EngineConfig,
  market_locks: ScopedLocks,
  user_locks: ScopedLocks,
}

impl<G: PersistenceGateway> Ledger<G> {
  /// Create a ledger over a gateway with the given configuration.
  pub fn new(gateway: Arc<G>, config: EngineConfig) -> Self {
    let timeout = config.concurrency.lock_timeout();
    Self {
      gateway,
      config,
      market_locks: ScopedLocks::new(timeout),
      user_locks: ScopedLocks::new(timeout),
    }
  }

  // ── Mutating operations ─────────────────────────────────────

  /// Create a new open market with equal initial pools.
  #[instrument(skip(self, question))]
  pub async fn create_market(
    &self,
    question: &str,
    closes_at: DateTime<Utc>,
  ) -> Result<Market, LedgerError> {
    let n = self.gateway.next_id(counters::MARKET).await?;
    let market = Market::new(
      format!("market_{n}"),
      question.to_string(),
      closes_at,
      self.config.market.initial_liquidity,
    );

    let mut txn = self.gateway.begin().await?;
    let staged = self.gateway.write_market(&mut txn, &market).await;
    self.finish(txn, staged).await?;

    info!(
      market_id = %market.id,
      liquidity = %market.yes_pool,
      "Market created"
    );
    Ok(market)
  }

  /// Register a new user. Falls back to the configured starting
  /// balance when none is given.
  #[instrument(skip(self))]
  pub async fn create_user(
    &self,
    name: &str,
    starting_balance: Option<Decimal>,
  ) -> Result<User, LedgerError> {
    let balance = starting_balance.unwrap_or(self.config.account.starting_balance);
    if balance < Decimal::ZERO {
      return Err(LedgerError::InvalidTrade(format!(
        "starting balance must be non-negative, got {balance}"
      )));
    }

    let n = self.gateway.next_id(counters::USER).await?;
    let user = User::new(format!("user_{n}"), name.to_string(), balance);

    let mut txn = self.gateway.begin().await?;
    let staged = self.gateway.write_user(&mut txn, &user).await;
    self.finish(txn, staged).await?;

    info!(user_id = %user.id, balance = %user.balance, "User created");
    Ok(user)
  }

  /// Execute a trade: price it, move balance and shares, update the
  /// pools, and append the audit record, all in one transaction.
  #[instrument(
    skip(self, request),
    fields(
      user = %request.user_id,
      market = %request.market_id,
      side = %request.side,
      direction = %request.direction,
      quantity = %request.quantity,
    )
  )]
  pub async fn execute_trade(&self, request: TradeRequest) -> Result<TradeRecord, LedgerError> {
    // Market lock first, then user lock. Every multi-scope operation
    // uses this order.
    let _market_guard = self.market_locks.acquire(&request.market_id).await?;
    let _user_guard = self.user_locks.acquire(&request.user_id).await?;

    let mut market = self.read_market(&request.market_id).await?;
    market.state.ensure_open(&market.id)?;

    let effect = pricing::trade_effect(
      market.yes_pool,
      market.no_pool,
      request.side,
      request.direction,
      request.quantity,
    )?;

    let mut user = self.read_user(&request.user_id).await?;
    let mut position = self
      .gateway
      .read_position(&request.user_id, &request.market_id)
      .await?
      .unwrap_or_else(|| Position::empty(request.user_id.clone(), request.market_id.clone()));

    match request.direction {
      Direction::Buy => {
        if let Some(limit) = request.max_cost {
          if effect.amount > limit {
            return Err(LedgerError::CostLimitExceeded {
              cost: effect.amount,
              limit,
            });
          }
        }
        if !user.can_afford(effect.amount) {
          return Err(LedgerError::InsufficientBalance {
            needed: effect.amount,
            available: user.balance,
          });
        }
        user.balance -= effect.amount;
        position.add_shares(request.side, request.quantity);
      }
      Direction::Sell => {
        let held = position.shares(request.side);
        if held < request.quantity {
          return Err(LedgerError::InsufficientShares {
            needed: request.quantity,
            available: held,
          });
        }
        position.remove_shares(request.side, request.quantity);
        user.balance += effect.amount;
      }
    }

    let k_before = market.invariant_k();
    market.apply_pools(effect.yes_pool, effect.no_pool);
    let tolerance = self.config.pricing.invariant_tolerance;
    if !pricing::invariant_holds(market.yes_pool, market.no_pool, k_before, tolerance) {
      let drift = pricing::invariant_drift(market.yes_pool, market.no_pool, k_before);
      return Err(LedgerError::InvalidTrade(format!(
        "invariant drift {drift} exceeds tolerance {tolerance}"
      )));
    }

    let n = self.gateway.next_id(counters::TRADE).await?;
    let record = TradeRecord {
      id: format!("trade_{n}"),
      user_id: request.user_id.clone(),
      market_id: request.market_id.clone(),
      side: request.side,
      direction: request.direction,
      quantity: request.quantity,
      price: effect.price,
      amount: effect.amount,
      rationale: request.rationale,
      executed_at: Utc::now(),
    };

    let mut txn = self.gateway.begin().await?;
    let staged = async {
      self.gateway.write_market(&mut txn, &market).await?;
      self.gateway.write_user(&mut txn, &user).await?;
      self.gateway.write_position(&mut txn, &position).await?;
      self.gateway.append_trade(&mut txn, &record).await?;
      Ok(())
    }
    .await;
    self.finish(txn, staged).await?;

    info!(
      trade_id = %record.id,
      amount = %record.amount,
      price = %record.price,
      yes_pool = %market.yes_pool,
      no_pool = %market.no_pool,
      "Trade committed"
    );
    Ok(record)
  }

  /// Resolve a market to its final outcome. Irreversible; pools are
  /// frozen and payout claims become available.
  #[instrument(skip(self))]
  pub async fn resolve_market(
    &self,
    market_id: &MarketId,
    outcome: Side,
  ) -> Result<(), LedgerError> {
    let _market_guard = self.market_locks.acquire(market_id).await?;

    let mut market = self.read_market(market_id).await?;
    market.resolve(outcome)?;

    let mut txn = self.gateway.begin().await?;
    let staged = self.gateway.write_market(&mut txn, &market).await;
    self.finish(txn, staged).await?;

    info!(market_id = %market.id, outcome = %outcome, "Market resolved");
    Ok(())
  }

  /// Redeem a user's position in a resolved market: winning shares
  /// pay 1:1, losing shares pay zero, and the position is consumed.
  ///
  /// Claiming an empty (or already-claimed) position is an error, not
  /// a silent no-op, so double payouts are impossible by construction.
  #[instrument(skip(self))]
  pub async fn claim_payout(
    &self,
    user_id: &UserId,
    market_id: &MarketId,
  ) -> Result<Decimal, LedgerError> {
    let _market_guard = self.market_locks.acquire(market_id).await?;
    let _user_guard = self.user_locks.acquire(user_id).await?;

    let market = self.read_market(market_id).await?;
    market.state.ensure_resolved(&market.id)?;
    let Some(outcome) = market.outcome else {
      // A resolved market always carries an outcome; treat a missing
      // one as unresolved rather than panic.
      return Err(LedgerError::NotResolved(market.id.clone()));
    };

    let mut position = self
      .gateway
      .read_position(user_id, market_id)
      .await?
      .ok_or_else(|| LedgerError::AlreadyClaimed {
        user_id: user_id.clone(),
        market_id: market_id.clone(),
      })?;
    if position.is_empty() {
      return Err(LedgerError::AlreadyClaimed {
        user_id: user_id.clone(),
        market_id: market_id.clone(),
      });
    }

    let mut user = self.read_user(user_id).await?;
    let payout = position.value_at_resolution(outcome);
    user.balance += payout;
    position.clear();

    let mut txn = self.gateway.begin().await?;
    let staged = async {
      self.gateway.write_user(&mut txn, &user).await?;
      self.gateway.write_position(&mut txn, &position).await?;
      Ok(())
    }
    .await;
    self.finish(txn, staged).await?;

    info!(
      user_id = %user.id,
      market_id = %market.id,
      payout = %payout,
      "Payout claimed"
    );
    Ok(payout)
  }

  /// Delete a market that nothing references. Any dependent position
  /// or trade record makes deletion a hard failure.
  #[instrument(skip(self))]
  pub async fn delete_market(&self, market_id: &MarketId) -> Result<(), LedgerError> {
    let _market_guard = self.market_locks.acquire(market_id).await?;

    let market = self.read_market(market_id).await?;
    if market.state == MarketState::Resolved {
      return Err(LedgerError::AlreadyResolved(market.id.clone()));
    }

    let has_positions = !self.gateway.market_positions(market_id).await?.is_empty();
    let has_trades = !self.gateway.market_trades(market_id).await?.is_empty();
    if has_positions || has_trades {
      return Err(LedgerError::MarketInUse(market.id.clone()));
    }

    let mut txn = self.gateway.begin().await?;
    let staged = self.gateway.delete_market(&mut txn, market_id).await;
    self.finish(txn, staged).await?;

    info!(market_id = %market.id, "Market deleted");
    Ok(())
  }

  // ── Read-only operations ────────────────────────────────────

  /// Price a hypothetical trade without executing it.
  pub async fn quote(
    &self,
    market_id: &MarketId,
    side: Side,
    direction: Direction,
    quantity: Decimal,
  ) -> Result<Quote, LedgerError> {
    let market = self.read_market(market_id).await?;
    market.state.ensure_open(&market.id)?;

    let effect = pricing::trade_effect(market.yes_pool, market.no_pool, side, direction, quantity)?;
    Ok(Quote {
      market_id: market.id,
      side,
      direction,
      quantity,
      amount: effect.amount,
      price: effect.price,
      spot_before: pricing::spot_price(market.yes_pool, market.no_pool, side),
      spot_after: pricing::spot_price(effect.yes_pool, effect.no_pool, side),
    })
  }

  /// Current quoted price of one share of `side`. For resolved
  /// markets this is the last pre-resolution price, not a tradable one.
  pub async fn spot_price(&self, market_id: &MarketId, side: Side) -> Result<Decimal, LedgerError> {
    let market = self.read_market(market_id).await?;
    Ok(market.spot_price(side))
  }

  /// Public snapshot of a market, including traded volume.
  pub async fn market_info(&self, market_id: &MarketId) -> Result<MarketInfo, LedgerError> {
    let market = self.read_market(market_id).await?;
    let trades = self.gateway.market_trades(market_id).await?;
    let volume = trades.iter().map(|t| t.amount).sum();

    Ok(MarketInfo {
      yes_price: market.spot_price(Side::Yes),
      no_price: market.spot_price(Side::No),
      id: market.id,
      question: market.question,
      state: market.state,
      outcome: market.outcome,
      yes_pool: market.yes_pool,
      no_pool: market.no_pool,
      volume,
      created_at: market.created_at,
      closes_at: market.closes_at,
    })
  }

  /// Snapshot of a user's balance and marked positions.
  pub async fn user_info(&self, user_id: &UserId) -> Result<UserInfo, LedgerError> {
    let user = self.read_user(user_id).await?;
    let positions = self.gateway.user_positions(user_id).await?;

    let mut summaries = Vec::with_capacity(positions.len());
    let mut total_value = user.balance;
    for position in positions {
      let market = self.read_market(&position.market_id).await?;
      let current_value = match market.outcome {
        Some(outcome) => position.value_at_resolution(outcome),
        None => {
          position.yes_shares * market.spot_price(Side::Yes)
            + position.no_shares * market.spot_price(Side::No)
        }
      };
      total_value += current_value;
      summaries.push(PositionSummary {
        market_id: position.market_id,
        question: market.question,
        yes_shares: position.yes_shares,
        no_shares: position.no_shares,
        current_value,
      });
    }

    Ok(UserInfo {
      id: user.id,
      name: user.name,
      balance: user.balance,
      positions: summaries,
      total_value,
    })
  }

  /// The committed trade log for a market, in commit order, with any
  /// attached rationale.
  pub async fn trade_history(&self, market_id: &MarketId) -> Result<Vec<TradeRecord>, LedgerError> {
    // Existence check first so unknown markets fail loudly.
    self.read_market(market_id).await?;
    Ok(self.gateway.market_trades(market_id).await?)
  }

  // ── Internals ───────────────────────────────────────────────

  async fn read_market(&self, market_id: &MarketId) -> Result<Market, LedgerError> {
    self
      .gateway
      .read_market(market_id)
      .await?
      .ok_or_else(|| LedgerError::MarketNotFound(market_id.clone()))
  }

  async fn read_user(&self, user_id: &UserId) -> Result<User, LedgerError> {
    self
      .gateway
      .read_user(user_id)
      .await?
      .ok_or_else(|| LedgerError::UserNotFound(user_id.clone()))
  }

  /// Commit a transaction whose staging succeeded, or roll it back
  /// and surface the staging error. Either way, no partial state.
  async fn finish(&self, txn: G::Txn, staged: anyhow::Result<()>) -> Result<(), LedgerError> {
    match staged {
      Ok(()) => Ok(self.gateway.commit(txn).await?),
      Err(err) => {
        if let Err(rb) = self.gateway.rollback(txn).await {
          warn!(error = %rb, "Rollback failed after staging error");
        }
        Err(LedgerError::Persistence(err))
      }
    }
  }
}
