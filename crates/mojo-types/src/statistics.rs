//! Per-user economy record

use crate::{Mojo, UserId};
use serde::{Deserialize, Serialize};

/// Credibility every user starts with
pub const DEFAULT_CREDIBILITY: i32 = 50;

/// The per-user record the whole economy reads and mutates
///
/// Created lazily on first access. Owned exclusively by the user; mutated by
/// the goal tracker (completions), the arena and speculation markets
/// (settlement), and the rank-upgrade operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub user: UserId,
    /// Reputation score; unbounded above, conceptually 0+
    pub credibility: i32,
    /// Currency balance; never negative
    pub mojo: Mojo,
    /// Current rank ladder position, 1..=8
    pub rank_id: u8,
    /// Monotonic counter across all weeks; keeps counting past the weekly cap
    pub lifetime_goals_logged: u64,
}

impl UserStatistics {
    /// A fresh record with the lazy-creation defaults
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            credibility: DEFAULT_CREDIBILITY,
            mojo: Mojo::zero(),
            rank_id: 1,
            lifetime_goals_logged: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let stats = UserStatistics::new(UserId::new());
        assert_eq!(stats.credibility, 50);
        assert!(stats.mojo.is_zero());
        assert_eq!(stats.rank_id, 1);
        assert_eq!(stats.lifetime_goals_logged, 0);
    }
}
