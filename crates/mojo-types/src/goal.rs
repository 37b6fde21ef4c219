//! Weekly goal domain types

use crate::{MojoError, Result, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Target completions per week; only 2, 3, or 4 are offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalFrequency(u8);

impl GoalFrequency {
    pub fn new(per_week: u8) -> Result<Self> {
        if (2..=4).contains(&per_week) {
            Ok(Self(per_week))
        } else {
            Err(MojoError::InvalidFrequency { frequency: per_week })
        }
    }

    pub fn per_week(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for GoalFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x per week", self.0)
    }
}

/// A user's single live weekly goal
///
/// Weekly reset is applied lazily on next access rather than by a background
/// job: whenever the wall-clock week has advanced past `week_start`, the
/// progress fields roll over before any operation touches them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGoal {
    pub user: UserId,
    pub frequency: GoalFrequency,
    /// Completions so far this week, saturating at `frequency`
    pub current_progress: u8,
    /// The Monday that begins the tracked week
    pub week_start: NaiveDate,
    /// Idempotency guard: at most one completion counted per calendar day
    pub last_completion: Option<NaiveDate>,
    /// Distinct completion dates within the current week
    pub completion_dates: BTreeSet<NaiveDate>,
}

impl UserGoal {
    pub fn new(user: UserId, frequency: GoalFrequency, week_start: NaiveDate) -> Self {
        Self {
            user,
            frequency,
            current_progress: 0,
            week_start,
            last_completion: None,
            completion_dates: BTreeSet::new(),
        }
    }

    /// Whether the weekly target has been reached this week
    pub fn is_complete(&self) -> bool {
        self.current_progress >= self.frequency.per_week()
    }

    /// Reset the weekly fields for a new week
    ///
    /// `last_completion` is deliberately kept: the daily guard spans week
    /// boundaries (a Sunday log still blocks a second log that same day).
    pub fn roll_over(&mut self, new_week_start: NaiveDate) {
        self.current_progress = 0;
        self.completion_dates.clear();
        self.week_start = new_week_start;
    }
}
