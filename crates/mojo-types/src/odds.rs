//! Odds and payout math for prophecy/curse wagers
//!
//! Odds derive from the credibility of the wager's *target* (the receiver)
//! at request time, and are frozen into the quest record. The two formulas
//! mirror each other so both sides of the market stay self-consistent:
//! betting against a high-credibility user costs more per unit of payout for
//! curses and pays less for prophecies.

use crate::Mojo;

/// Floor and ceiling for computed odds
pub const MIN_ODDS: f64 = 1.0;
pub const MAX_ODDS: f64 = 100.0;

/// The two wager directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WagerDirection {
    /// Betting the target *will* complete their weekly goal
    Prophecy,
    /// Betting the target *will fail* their weekly goal
    Curse,
}

/// Compute odds from the target's credibility
///
/// Credibility is clamped to [0, 100] before applying the formula, and the
/// result is clamped to [1, 100] (which also absorbs the division-by-zero
/// extremes: prophecy at 0 credibility and curse at 100 both pin to 100).
pub fn wager_odds(direction: WagerDirection, credibility: i32) -> f64 {
    let cred = credibility.clamp(0, 100) as f64;
    let raw = match direction {
        WagerDirection::Prophecy => {
            if cred == 0.0 {
                MAX_ODDS
            } else {
                100.0 / cred
            }
        }
        WagerDirection::Curse => {
            if cred == 100.0 {
                MAX_ODDS
            } else {
                100.0 / (100.0 - cred)
            }
        }
    };
    raw.clamp(MIN_ODDS, MAX_ODDS)
}

/// Total payout for a winning wager: the stake returned plus `stake * odds`
/// in winnings
///
/// Resolution uses this same function, so client and settlement math can
/// never drift.
pub fn potential_payout(stake: Mojo, odds: f64) -> Mojo {
    stake.scale(1.0 + odds)
}
