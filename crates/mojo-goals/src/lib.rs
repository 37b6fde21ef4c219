//! Mojo Goals - the weekly goal tracker
//!
//! One live goal per user: a target of 2-4 completions per week, logged at
//! most once per calendar day, with the week resetting lazily on the first
//! access after Monday 00:00 rather than by a background job.
//!
//! Completions feed the credibility ledger: a base mojo award per counted
//! log, and a flat bonus plus credibility the first time weekly progress
//! reaches the target. Alliance and battle settlement live above this crate;
//! the tracker only answers "has this user met their week?".

pub mod clock;
pub mod rewards;
pub mod week;

pub use clock::{Clock, FixedClock, SystemClock};
pub use rewards::*;
pub use week::monday_of;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use mojo_ledger::CredibilityLedger;
use mojo_types::{GoalFrequency, Mojo, MojoError, Result, UserGoal, UserId};

/// What a counted completion produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    /// Progress after this log, saturating at the weekly target
    pub progress: u8,
    pub frequency: u8,
    /// True only on the log that first reaches the target this week
    pub weekly_goal_met: bool,
    pub mojo_awarded: Mojo,
    pub credibility_awarded: i32,
    pub lifetime_goals_logged: u64,
}

/// The weekly goal tracker
///
/// Generic over the clock so week boundaries are testable; production code
/// uses [`SystemClock`].
pub struct GoalTracker<C: Clock> {
    clock: Arc<C>,
    ledger: CredibilityLedger,
    goals: Arc<RwLock<HashMap<UserId, UserGoal>>>,
}

impl<C: Clock> Clone for GoalTracker<C> {
    fn clone(&self) -> Self {
        Self {
            clock: Arc::clone(&self.clock),
            ledger: self.ledger.clone(),
            goals: Arc::clone(&self.goals),
        }
    }
}

impl<C: Clock> GoalTracker<C> {
    pub fn new(ledger: CredibilityLedger, clock: Arc<C>) -> Self {
        Self {
            clock,
            ledger,
            goals: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create (or replace) the user's live goal, anchored to the current week
    pub async fn select_goal(&self, user: &UserId, per_week: u8) -> Result<UserGoal> {
        let frequency = GoalFrequency::new(per_week)?;
        let week_start = monday_of(self.clock.today());
        let goal = UserGoal::new(user.clone(), frequency, week_start);
        self.goals.write().await.insert(user.clone(), goal.clone());
        Ok(goal)
    }

    /// The user's goal with the lazy weekly rollover already applied
    pub async fn current_goal(&self, user: &UserId) -> Result<UserGoal> {
        let monday = monday_of(self.clock.today());
        let mut goals = self.goals.write().await;
        let goal = goals.get_mut(user).ok_or_else(|| MojoError::GoalNotFound {
            user_id: user.to_string(),
        })?;
        if goal.week_start < monday {
            goal.roll_over(monday);
        }
        Ok(goal.clone())
    }

    /// Whether the user has met their weekly target this week
    ///
    /// Used by alliance settlement; false when no goal exists.
    pub async fn weekly_goal_met(&self, user: &UserId) -> bool {
        match self.current_goal(user).await {
            Ok(goal) => goal.is_complete(),
            Err(_) => false,
        }
    }

    /// Count today's completion
    ///
    /// At most one completion counts per calendar day; a second call on the
    /// same day fails with `AlreadyLoggedToday` and changes nothing. Progress
    /// saturates at the weekly target while the lifetime counter keeps
    /// counting.
    pub async fn log_completion(&self, user: &UserId) -> Result<CompletionOutcome> {
        let today = self.clock.today();
        let monday = monday_of(today);

        let newly_complete;
        let progress;
        let frequency;
        {
            let mut goals = self.goals.write().await;
            let goal = goals.get_mut(user).ok_or_else(|| MojoError::GoalNotFound {
                user_id: user.to_string(),
            })?;

            if goal.week_start < monday {
                goal.roll_over(monday);
            }

            if goal.last_completion == Some(today) {
                return Err(MojoError::AlreadyLoggedToday { date: today });
            }

            let was_complete = goal.is_complete();
            goal.current_progress = (goal.current_progress + 1).min(goal.frequency.per_week());
            goal.completion_dates.insert(today);
            goal.last_completion = Some(today);

            newly_complete = !was_complete && goal.is_complete();
            progress = goal.current_progress;
            frequency = goal.frequency.per_week();
        }

        let mut mojo_awarded = Mojo::new(BASE_LOG_MOJO);
        let mut credibility_awarded = 0;

        self.ledger.apply_delta(user, 0, BASE_LOG_MOJO).await?;
        let lifetime_goals_logged = self.ledger.record_goal_logged(user).await;

        if newly_complete {
            self.ledger
                .apply_delta(user, WEEKLY_BONUS_CREDIBILITY, WEEKLY_BONUS_MOJO)
                .await?;
            mojo_awarded += Mojo::new(WEEKLY_BONUS_MOJO);
            credibility_awarded += WEEKLY_BONUS_CREDIBILITY;
            info!(user = %user, progress, frequency, "weekly goal met");
        }

        Ok(CompletionOutcome {
            progress,
            frequency,
            weekly_goal_met: newly_complete,
            mojo_awarded,
            credibility_awarded,
            lifetime_goals_logged,
        })
    }
}
