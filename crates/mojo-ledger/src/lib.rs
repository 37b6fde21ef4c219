//! Mojo Ledger - the credibility ledger
//!
//! Owns the atomic read-modify-write of every user's `UserStatistics` and
//! the book of open stake reservations. Accounts and reservations live
//! behind a single lock, so `available = mojo - open reservations` is always
//! computed from one consistent read.
//!
//! # Invariants
//!
//! 1. Mojo balances never go negative
//! 2. Spends are checked against *available* mojo, not the raw balance
//! 3. Demotion is evaluated on every delta, at most one tier per call
//! 4. Rank upgrades re-validate eligibility against the live row; a
//!    client-computed eligibility check is never trusted

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use mojo_types::{
    maintenance_floor, rank::upgrade_eligibility, try_rank_of, Mojo, MojoError, ReservationId,
    Result, UserId, UserStatistics,
};

/// An open hold against a user's balance
///
/// Created atomically alongside a wager request or speculation, released on
/// rejection, and settled (converted into a hard debit) on acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub user: UserId,
    pub amount: Mojo,
    pub created_at: DateTime<Utc>,
}

/// A rank movement caused by a ledger mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankChange {
    pub from: u8,
    pub to: u8,
}

/// Result of applying a delta
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaOutcome {
    pub statistics: UserStatistics,
    /// Set when the delta pushed the user below their maintenance floor
    pub demotion: Option<RankChange>,
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<UserId, UserStatistics>,
    reservations: HashMap<ReservationId, Reservation>,
}

impl LedgerState {
    fn account(&mut self, user: &UserId) -> &mut UserStatistics {
        self.accounts
            .entry(user.clone())
            .or_insert_with(|| UserStatistics::new(user.clone()))
    }

    fn reserved(&self, user: &UserId) -> Mojo {
        self.reservations
            .values()
            .filter(|r| &r.user == user)
            .map(|r| r.amount)
            .sum()
    }

    fn available(&self, user: &UserId) -> Mojo {
        let balance = self
            .accounts
            .get(user)
            .map(|a| a.mojo)
            .unwrap_or_else(Mojo::zero);
        balance.saturating_sub(self.reserved(user))
    }
}

/// The credibility ledger
///
/// Thread-safe in-memory store; every method holds the write lock for the
/// full mutation, which is the single-row-transaction model of this core.
#[derive(Clone, Default)]
pub struct CredibilityLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl CredibilityLedger {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
        }
    }

    /// Return the user's statistics, creating them with defaults on first
    /// access. Idempotent under concurrent first-access: both callers land
    /// on the same row.
    pub async fn get_or_create(&self, user: &UserId) -> UserStatistics {
        let mut state = self.state.write().await;
        state.account(user).clone()
    }

    /// Read-only lookup; `None` if the user has never been seen
    pub async fn statistics(&self, user: &UserId) -> Option<UserStatistics> {
        self.state.read().await.accounts.get(user).cloned()
    }

    /// Apply a credibility/mojo delta in one atomic update
    ///
    /// Mojo decreases saturate at zero (penalties never overdraw). After the
    /// delta, the user's credibility is checked against the maintenance
    /// floor of their current rank; dropping below it demotes one tier with
    /// no mojo refund.
    pub async fn apply_delta(
        &self,
        user: &UserId,
        credibility_delta: i32,
        mojo_delta: f64,
    ) -> Result<DeltaOutcome> {
        let mut state = self.state.write().await;
        let account = state.account(user);

        account.credibility += credibility_delta;
        if mojo_delta >= 0.0 {
            account.mojo += Mojo::new(mojo_delta);
        } else {
            account.mojo = account.mojo.saturating_sub(Mojo::new(-mojo_delta));
        }

        let demotion = Self::check_demotion(account)?;
        Ok(DeltaOutcome {
            statistics: account.clone(),
            demotion,
        })
    }

    /// Credit mojo with no credibility movement
    pub async fn credit(&self, user: &UserId, amount: Mojo) -> Result<UserStatistics> {
        let mut state = self.state.write().await;
        let account = state.account(user);
        account.mojo += amount;
        Ok(account.clone())
    }

    /// Spend mojo, failing closed against the available balance
    pub async fn spend(&self, user: &UserId, amount: Mojo) -> Result<UserStatistics> {
        let mut state = self.state.write().await;
        let available = state.available(user);
        if amount > available {
            return Err(MojoError::InsufficientMojo {
                requested: amount.value(),
                available: available.value(),
            });
        }
        let account = state.account(user);
        account.mojo = account.mojo.saturating_sub(amount);
        Ok(account.clone())
    }

    /// Purchase the next rank tier
    ///
    /// Re-validates eligibility against the live row (never trusting a
    /// client-side check); the mojo requirement is checked against the
    /// available balance so reserved stakes cannot be double-spent. A race
    /// that spent the mojo first surfaces as `RankRequirementNotMet`.
    pub async fn upgrade_rank(&self, user: &UserId, target_rank_id: u8) -> Result<UserStatistics> {
        let mut state = self.state.write().await;
        let available = state.available(user);
        let account = state.account(user);

        let check = upgrade_eligibility(
            account.rank_id,
            target_rank_id,
            account.credibility,
            available,
        )?;
        if !check.eligible {
            return Err(MojoError::RankRequirementNotMet {
                credibility_shortfall: check.credibility_shortfall,
                mojo_shortfall: check.mojo_shortfall.value(),
            });
        }

        let cost = try_rank_of(target_rank_id)?.mojo_cost;
        account.mojo = account.mojo.saturating_sub(cost);
        let from = account.rank_id;
        account.rank_id = target_rank_id;
        info!(user = %user, from, to = target_rank_id, "rank upgraded");
        Ok(account.clone())
    }

    /// Bump the lifetime completion counter
    pub async fn record_goal_logged(&self, user: &UserId) -> u64 {
        let mut state = self.state.write().await;
        let account = state.account(user);
        account.lifetime_goals_logged += 1;
        account.lifetime_goals_logged
    }

    // ------------------------------------------------------------------
    // Reservations
    // ------------------------------------------------------------------

    /// Place a hold on the user's balance
    pub async fn reserve(&self, user: &UserId, amount: Mojo) -> Result<ReservationId> {
        let mut state = self.state.write().await;
        let available = state.available(user);
        if amount > available {
            return Err(MojoError::InsufficientMojo {
                requested: amount.value(),
                available: available.value(),
            });
        }
        let reservation = Reservation {
            id: ReservationId::new(),
            user: user.clone(),
            amount,
            created_at: Utc::now(),
        };
        let id = reservation.id.clone();
        state.reservations.insert(id.clone(), reservation);
        Ok(id)
    }

    /// Drop a hold without moving any mojo (rejection path)
    pub async fn release(&self, reservation_id: &ReservationId) -> Result<Mojo> {
        let mut state = self.state.write().await;
        let reservation = state.reservations.remove(reservation_id).ok_or_else(|| {
            MojoError::ReservationNotFound {
                reservation_id: reservation_id.to_string(),
            }
        })?;
        Ok(reservation.amount)
    }

    /// Convert a hold into a hard debit in one step (acceptance path)
    ///
    /// The reserved amount leaves the balance; the caller's record now owns
    /// the escrowed stake.
    pub async fn settle(&self, reservation_id: &ReservationId) -> Result<Mojo> {
        let mut state = self.state.write().await;
        let reservation = state.reservations.remove(reservation_id).ok_or_else(|| {
            MojoError::ReservationNotFound {
                reservation_id: reservation_id.to_string(),
            }
        })?;
        let account = state.account(&reservation.user);
        account.mojo = account.mojo.saturating_sub(reservation.amount);
        Ok(reservation.amount)
    }

    /// Balance minus open holds, from a single consistent read
    pub async fn available(&self, user: &UserId) -> Mojo {
        self.state.read().await.available(user)
    }

    /// Sum of the user's open holds
    pub async fn reserved(&self, user: &UserId) -> Mojo {
        self.state.read().await.reserved(user)
    }

    /// Whether the user sits in the hysteresis band: below their rank's
    /// credibility threshold but not yet below its maintenance floor.
    /// Visible to the UI, no penalty.
    pub async fn in_warning(&self, user: &UserId) -> bool {
        let state = self.state.read().await;
        match state.accounts.get(user) {
            Some(account) => match try_rank_of(account.rank_id) {
                Ok(rank) => {
                    account.credibility < rank.min_credibility
                        && account.credibility >= maintenance_floor(rank.id)
                }
                Err(_) => false,
            },
            None => false,
        }
    }

    /// Demote one tier if the account fell below its maintenance floor.
    /// Deltas are small relative to tier spacing, so one tier per call is
    /// enough.
    fn check_demotion(account: &mut UserStatistics) -> Result<Option<RankChange>> {
        if account.rank_id <= 1 {
            return Ok(None);
        }
        try_rank_of(account.rank_id)?;
        let floor = maintenance_floor(account.rank_id);
        if account.credibility < floor {
            let change = RankChange {
                from: account.rank_id,
                to: account.rank_id - 1,
            };
            account.rank_id -= 1;
            warn!(
                user = %account.user,
                credibility = account.credibility,
                floor,
                from = change.from,
                to = change.to,
                "credibility fell below maintenance floor, demoting"
            );
            return Ok(Some(change));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mojo_types::{rank_of, RANKS};

    #[tokio::test]
    async fn test_lazy_creation_defaults() {
        let ledger = CredibilityLedger::new();
        let user = UserId::new();

        assert!(ledger.statistics(&user).await.is_none());
        let stats = ledger.get_or_create(&user).await;
        assert_eq!(stats.credibility, 50);
        assert!(stats.mojo.is_zero());
        assert_eq!(stats.rank_id, 1);

        // Second access lands on the same row
        let again = ledger.get_or_create(&user).await;
        assert_eq!(again, stats);
    }

    #[tokio::test]
    async fn test_apply_delta_and_floor_at_zero() {
        let ledger = CredibilityLedger::new();
        let user = UserId::new();

        let outcome = ledger.apply_delta(&user, 5, 10.0).await.unwrap();
        assert_eq!(outcome.statistics.credibility, 55);
        assert_eq!(outcome.statistics.mojo, Mojo::new(10.0));

        // Penalty bigger than the balance saturates at zero
        let outcome = ledger.apply_delta(&user, -3, -100.0).await.unwrap();
        assert!(outcome.statistics.mojo.is_zero());
        assert_eq!(outcome.statistics.credibility, 52);
    }

    #[tokio::test]
    async fn test_demotion_hysteresis() {
        let ledger = CredibilityLedger::new();
        let user = UserId::new();
        let tier2 = &RANKS[1];

        // Reach tier 2 legitimately
        ledger
            .apply_delta(&user, tier2.min_credibility - 50, tier2.mojo_cost.value())
            .await
            .unwrap();
        ledger.upgrade_rank(&user, 2).await.unwrap();

        // Drop into the warning band: no demotion yet
        let floor = maintenance_floor(2);
        let stats = ledger.get_or_create(&user).await;
        let outcome = ledger
            .apply_delta(&user, floor - stats.credibility, 0.0)
            .await
            .unwrap();
        assert!(outcome.demotion.is_none());
        assert_eq!(outcome.statistics.rank_id, 2);
        assert!(ledger.in_warning(&user).await);

        // One more point below the floor: demoted, no refund
        let outcome = ledger.apply_delta(&user, -1, 0.0).await.unwrap();
        assert_eq!(
            outcome.demotion,
            Some(RankChange { from: 2, to: 1 })
        );
        assert_eq!(outcome.statistics.rank_id, 1);
        assert!(outcome.statistics.mojo.is_zero());
    }

    #[tokio::test]
    async fn test_rank_one_never_demotes() {
        let ledger = CredibilityLedger::new();
        let user = UserId::new();

        let outcome = ledger.apply_delta(&user, -500, 0.0).await.unwrap();
        assert!(outcome.demotion.is_none());
        assert_eq!(outcome.statistics.rank_id, 1);
    }

    #[tokio::test]
    async fn test_spend_respects_reservations() {
        let ledger = CredibilityLedger::new();
        let user = UserId::new();
        ledger.credit(&user, Mojo::new(100.0)).await.unwrap();

        ledger.reserve(&user, Mojo::new(60.0)).await.unwrap();
        assert_eq!(ledger.available(&user).await, Mojo::new(40.0));

        let result = ledger.spend(&user, Mojo::new(50.0)).await;
        assert!(matches!(
            result,
            Err(MojoError::InsufficientMojo { .. })
        ));

        let stats = ledger.spend(&user, Mojo::new(40.0)).await.unwrap();
        assert_eq!(stats.mojo, Mojo::new(60.0));
    }

    #[tokio::test]
    async fn test_reservation_release_and_settle() {
        let ledger = CredibilityLedger::new();
        let user = UserId::new();
        ledger.credit(&user, Mojo::new(50.0)).await.unwrap();

        let hold = ledger.reserve(&user, Mojo::new(20.0)).await.unwrap();
        assert_eq!(ledger.reserved(&user).await, Mojo::new(20.0));

        // Release: hold gone, balance untouched
        let amount = ledger.release(&hold).await.unwrap();
        assert_eq!(amount, Mojo::new(20.0));
        assert_eq!(ledger.get_or_create(&user).await.mojo, Mojo::new(50.0));
        assert_eq!(ledger.available(&user).await, Mojo::new(50.0));

        // Settle: hold gone and the amount debited
        let hold = ledger.reserve(&user, Mojo::new(20.0)).await.unwrap();
        ledger.settle(&hold).await.unwrap();
        assert_eq!(ledger.get_or_create(&user).await.mojo, Mojo::new(30.0));
        assert!(ledger.reserved(&user).await.is_zero());

        // A settled hold cannot be settled again
        assert!(matches!(
            ledger.settle(&hold).await,
            Err(MojoError::ReservationNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_over_reserving_fails() {
        let ledger = CredibilityLedger::new();
        let user = UserId::new();
        ledger.credit(&user, Mojo::new(30.0)).await.unwrap();

        ledger.reserve(&user, Mojo::new(20.0)).await.unwrap();
        let result = ledger.reserve(&user, Mojo::new(20.0)).await;
        assert!(matches!(
            result,
            Err(MojoError::InsufficientMojo { .. })
        ));
    }

    #[tokio::test]
    async fn test_upgrade_revalidates_against_live_row() {
        let ledger = CredibilityLedger::new();
        let user = UserId::new();
        let tier2 = &RANKS[1];

        ledger
            .apply_delta(&user, tier2.min_credibility - 50, tier2.mojo_cost.value())
            .await
            .unwrap();

        // A concurrent spend drains the mojo before the upgrade commits
        ledger.spend(&user, Mojo::new(1.0)).await.unwrap();

        let result = ledger.upgrade_rank(&user, 2).await;
        assert!(matches!(
            result,
            Err(MojoError::RankRequirementNotMet { .. })
        ));

        // Top it back up: upgrade succeeds and debits the cost
        ledger.credit(&user, Mojo::new(1.0)).await.unwrap();
        let stats = ledger.upgrade_rank(&user, 2).await.unwrap();
        assert_eq!(stats.rank_id, 2);
        assert!(stats.mojo.is_zero());
        assert_eq!(rank_of(stats.rank_id).name, "Striver");
    }

    #[tokio::test]
    async fn test_upgrade_skipping_tiers_rejected() {
        let ledger = CredibilityLedger::new();
        let user = UserId::new();
        ledger.apply_delta(&user, 500, 5000.0).await.unwrap();

        assert!(matches!(
            ledger.upgrade_rank(&user, 3).await,
            Err(MojoError::InvalidRankTransition { current: 1, target: 3 })
        ));
    }
}
