//! The rank ladder
//!
//! A static table of eight tiers with credibility thresholds and mojo
//! purchase costs, plus the pure functions for lookup, upgrade eligibility,
//! and demotion hysteresis. No state of its own.
//!
//! Demotion uses a hysteresis band: a user below a tier's credibility
//! threshold but at or above its maintenance floor is "in warning" (visible,
//! no penalty); only dropping below the floor forces a demotion. Regaining
//! the tier requires re-purchasing it with mojo.

use crate::{Mojo, MojoError, Result};
use serde::{Deserialize, Serialize};

/// Width of the hysteresis band below each tier's credibility threshold
pub const MAINTENANCE_BAND: i32 = 10;

/// The lowest rank id; never demoted from, costs nothing
pub const FLOOR_RANK_ID: u8 = 1;

/// Highest rank id
pub const TOP_RANK_ID: u8 = 8;

/// A tier on the rank ladder
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rank {
    /// Ladder position, 1..=8
    pub id: u8,
    /// Display name
    pub name: &'static str,
    /// Display tagline shown under the rank emblem
    pub tagline: &'static str,
    /// Minimum credibility to purchase and to hold the tier
    pub min_credibility: i32,
    /// Mojo price to purchase the tier
    pub mojo_cost: Mojo,
}

/// The full ladder, ordered by id
///
/// Both `min_credibility` and `mojo_cost` are strictly monotone, and tier
/// spacing exceeds the maintenance band so a floor never overlaps the
/// previous tier's threshold.
pub const RANKS: [Rank; 8] = [
    Rank { id: 1, name: "Rookie", tagline: "Everyone starts somewhere", min_credibility: 0, mojo_cost: Mojo(0.0) },
    Rank { id: 2, name: "Striver", tagline: "Showing up, week after week", min_credibility: 60, mojo_cost: Mojo(50.0) },
    Rank { id: 3, name: "Contender", tagline: "Consistency is currency", min_credibility: 75, mojo_cost: Mojo(100.0) },
    Rank { id: 4, name: "Challenger", tagline: "Backs it up with stakes", min_credibility: 90, mojo_cost: Mojo(175.0) },
    Rank { id: 5, name: "Gladiator", tagline: "Thrives in the arena", min_credibility: 105, mojo_cost: Mojo(275.0) },
    Rank { id: 6, name: "Champion", tagline: "The group bets on them", min_credibility: 120, mojo_cost: Mojo(400.0) },
    Rank { id: 7, name: "Warlord", tagline: "Feared in every wager", min_credibility: 140, mojo_cost: Mojo(600.0) },
    Rank { id: 8, name: "Legend", tagline: "Credibility made flesh", min_credibility: 160, mojo_cost: Mojo(900.0) },
];

/// Look up a rank for display, failing soft
///
/// An out-of-range id returns the lowest tier. Never use this on a mutation
/// path; mutation decisions go through [`try_rank_of`] and fail closed.
pub fn rank_of(id: u8) -> &'static Rank {
    try_rank_of(id).unwrap_or(&RANKS[0])
}

/// Look up a rank for mutation decisions, failing closed
pub fn try_rank_of(id: u8) -> Result<&'static Rank> {
    if (FLOOR_RANK_ID..=TOP_RANK_ID).contains(&id) {
        Ok(&RANKS[(id - 1) as usize])
    } else {
        Err(MojoError::RankOutOfRange { rank_id: id })
    }
}

/// Outcome of an upgrade eligibility check
///
/// The shortfalls are for UI messaging ("you need 7 more credibility"), not
/// for decision-making elsewhere; `eligible` is the decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeEligibility {
    pub eligible: bool,
    /// Credibility still missing (0 when met)
    pub credibility_shortfall: i32,
    /// Mojo still missing (zero when met)
    pub mojo_shortfall: Mojo,
}

/// Check whether a user may purchase the next tier
///
/// Only a single-step climb is legal; anything else is an
/// `InvalidRankTransition`.
pub fn upgrade_eligibility(
    current_rank_id: u8,
    target_rank_id: u8,
    credibility: i32,
    mojo: Mojo,
) -> Result<UpgradeEligibility> {
    let current = try_rank_of(current_rank_id)?;
    let target = try_rank_of(target_rank_id)?;

    if target.id != current.id + 1 {
        return Err(MojoError::InvalidRankTransition {
            current: current.id,
            target: target.id,
        });
    }

    let credibility_shortfall = (target.min_credibility - credibility).max(0);
    let mojo_shortfall = target.mojo_cost.saturating_sub(mojo);

    Ok(UpgradeEligibility {
        eligible: credibility_shortfall == 0 && mojo_shortfall.is_zero(),
        credibility_shortfall,
        mojo_shortfall,
    })
}

/// The credibility floor below which a rank can no longer be held
///
/// `max(0, min_credibility - 10)` for every tier above the first; the first
/// tier has no floor and can never be demoted from.
pub fn maintenance_floor(rank_id: u8) -> i32 {
    match try_rank_of(rank_id) {
        Ok(rank) if rank.id > FLOOR_RANK_ID => (rank.min_credibility - MAINTENANCE_BAND).max(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_invariants() {
        assert_eq!(RANKS[0].min_credibility, 0);
        assert!(RANKS[0].mojo_cost.is_zero());
        for pair in RANKS.windows(2) {
            assert_eq!(pair[1].id, pair[0].id + 1);
            assert!(pair[1].min_credibility > pair[0].min_credibility);
            assert!(pair[1].mojo_cost > pair[0].mojo_cost);
        }
    }

    #[test]
    fn test_rank_of_fails_soft() {
        assert_eq!(rank_of(0).id, 1);
        assert_eq!(rank_of(9).id, 1);
        assert_eq!(rank_of(5).name, "Gladiator");
    }

    #[test]
    fn test_try_rank_of_fails_closed() {
        assert!(matches!(
            try_rank_of(9),
            Err(MojoError::RankOutOfRange { rank_id: 9 })
        ));
    }

    #[test]
    fn test_maintenance_floor_band() {
        for rank in RANKS.iter().skip(1) {
            let floor = maintenance_floor(rank.id);
            assert_eq!(floor, (rank.min_credibility - MAINTENANCE_BAND).max(0));
            assert!(floor < rank.min_credibility);
        }
        assert_eq!(maintenance_floor(1), 0);
    }

    #[test]
    fn test_upgrade_must_be_adjacent() {
        let result = upgrade_eligibility(1, 3, 1000, Mojo::new(1000.0));
        assert!(matches!(
            result,
            Err(MojoError::InvalidRankTransition { current: 1, target: 3 })
        ));
    }

    #[test]
    fn test_upgrade_boundary() {
        let target = &RANKS[1];

        // One credibility short: ineligible, shortfall reported
        let check = upgrade_eligibility(1, 2, target.min_credibility - 1, target.mojo_cost).unwrap();
        assert!(!check.eligible);
        assert_eq!(check.credibility_shortfall, 1);
        assert!(check.mojo_shortfall.is_zero());

        // Exactly at the threshold with sufficient mojo: eligible
        let check = upgrade_eligibility(1, 2, target.min_credibility, target.mojo_cost).unwrap();
        assert!(check.eligible);
        assert_eq!(check.credibility_shortfall, 0);
    }

    #[test]
    fn test_upgrade_mojo_shortfall() {
        let target = &RANKS[1];
        let check = upgrade_eligibility(1, 2, target.min_credibility, Mojo::new(10.0)).unwrap();
        assert!(!check.eligible);
        assert!(check.mojo_shortfall.approx_eq(target.mojo_cost - Mojo::new(10.0)));
    }
}
