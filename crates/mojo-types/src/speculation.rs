//! Speculation domain types
//!
//! A speculation is a free-form two-party bet: the creator writes the
//! proposition, picks a side and odds, and stakes mojo; any other group
//! member may take the other side for the same stake. A third, disinterested
//! member resolves it. Settlement is a zero-sum split of a fixed pot, which
//! is deliberately a different shape from the arena's formula payout.

use crate::{GroupId, Mojo, ReservationId, SpeculationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum proposition length
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Minimum group size for speculations, so a disinterested resolver exists
pub const MIN_GROUP_MEMBERS: usize = 3;

/// Lifecycle state of a speculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpeculationState {
    /// Visible to the group, waiting for someone to take the other side;
    /// the creator's stake is held by an open ledger reservation
    Open { reservation: ReservationId },
    /// Both stakes escrowed into the pot
    Accepted {
        accepter: UserId,
        accepted_at: DateTime<Utc>,
    },
    /// Terminal; the winner took the whole pot
    Resolved {
        accepter: UserId,
        result: bool,
        winner: UserId,
        payout: Mojo,
        resolved_at: DateTime<Utc>,
    },
}

impl SpeculationState {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    /// The accepter, once one exists
    pub fn accepter(&self) -> Option<&UserId> {
        match self {
            Self::Open { .. } => None,
            Self::Accepted { accepter, .. } | Self::Resolved { accepter, .. } => Some(accepter),
        }
    }
}

/// A free-form two-party bet inside a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speculation {
    pub id: SpeculationId,
    pub group: GroupId,
    pub creator: UserId,
    /// The proposition, 1..=200 chars
    pub description: String,
    /// The creator's stance on the proposition
    pub creator_side: bool,
    /// Creator-set odds (display only; settlement splits the fixed pot)
    pub odds: f64,
    /// Stake per party; the pot is twice this
    pub stake: Mojo,
    pub state: SpeculationState,
    pub created_at: DateTime<Utc>,
}

impl Speculation {
    /// The symmetric pot: both parties stake the same amount
    pub fn total_pot(&self) -> Mojo {
        self.stake.scale(2.0)
    }

    /// The side a given party holds, if they are a party
    pub fn side_of(&self, user: &UserId) -> Option<bool> {
        if user == &self.creator {
            return Some(self.creator_side);
        }
        match self.state.accepter() {
            Some(accepter) if accepter == user => Some(!self.creator_side),
            _ => None,
        }
    }
}
