//! Reward constants for goal completions
//!
//! These amounts sit well below the rank ladder's tier spacing, so a single
//! award or penalty can move a user across at most one demotion floor.

/// Mojo for every counted daily log
pub const BASE_LOG_MOJO: f64 = 5.0;

/// Flat bonus the first time weekly progress reaches the target
pub const WEEKLY_BONUS_MOJO: f64 = 20.0;

/// Credibility gained alongside the weekly bonus
pub const WEEKLY_BONUS_CREDIBILITY: i32 = 5;

/// Bonus to each partner when both sides of an alliance complete their week
pub const ALLIANCE_BONUS_MOJO: f64 = 15.0;
