//! Arena quest domain types
//!
//! Quest state is a single tagged enum rather than a bundle of independent
//! status fields, so illegal combinations (a rejected quest with a wager
//! outcome, wager terms on an alliance) are unrepresentable.

use crate::{GroupId, Mojo, QuestId, ReservationId, UserId, WagerDirection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four quest types a user can send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestType {
    /// Mutual pact: both partners complete their weekly goals, both earn a bonus
    Alliance,
    /// Head-to-head: whoever logs more sessions in the week wins
    Battle,
    /// Wager that the receiver *will* complete their weekly goal
    Prophecy,
    /// Wager that the receiver *will fail* their weekly goal
    Curse,
}

impl QuestType {
    /// Whether this type carries a mojo stake and odds
    pub fn is_wager(&self) -> bool {
        matches!(self, Self::Prophecy | Self::Curse)
    }

    /// The odds direction for wager types
    pub fn wager_direction(&self) -> Option<WagerDirection> {
        match self {
            Self::Prophecy => Some(WagerDirection::Prophecy),
            Self::Curse => Some(WagerDirection::Curse),
            _ => None,
        }
    }
}

impl fmt::Display for QuestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Alliance => "alliance",
            Self::Battle => "battle",
            Self::Prophecy => "prophecy",
            Self::Curse => "curse",
        };
        write!(f, "{}", label)
    }
}

/// Kind of a stored quest, carrying wager terms only where they exist
///
/// For prophecy/curse the odds were computed from the receiver's credibility
/// at request time and are frozen here; resolution never recomputes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum QuestKind {
    Alliance,
    Battle,
    Prophecy { stake: Mojo, odds: f64 },
    Curse { stake: Mojo, odds: f64 },
}

impl QuestKind {
    /// The discriminant type (used for duplicate pre-checks)
    pub fn quest_type(&self) -> QuestType {
        match self {
            Self::Alliance => QuestType::Alliance,
            Self::Battle => QuestType::Battle,
            Self::Prophecy { .. } => QuestType::Prophecy,
            Self::Curse { .. } => QuestType::Curse,
        }
    }

    /// The stake held against this quest (zero for alliance/battle)
    pub fn stake(&self) -> Mojo {
        match self {
            Self::Prophecy { stake, .. } | Self::Curse { stake, .. } => *stake,
            _ => Mojo::zero(),
        }
    }

    /// The frozen odds for wager kinds
    pub fn odds(&self) -> Option<f64> {
        match self {
            Self::Prophecy { odds, .. } | Self::Curse { odds, .. } => Some(*odds),
            _ => None,
        }
    }

    pub fn is_wager(&self) -> bool {
        self.quest_type().is_wager()
    }
}

/// Outcome of a resolved wager quest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WagerOutcome {
    /// The sender's call was right; stake returned plus winnings
    Won,
    /// The sender's call was wrong; stake forfeited
    Lost,
    /// Inconclusive (e.g. the quest outlived its window); stake returned, nothing else
    Refunded,
}

/// Lifecycle state of a quest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuestState {
    /// Awaiting the receiver's response; a wager's stake is held by an open
    /// ledger reservation until then
    Pending { reservation: Option<ReservationId> },
    /// Receiver declined; terminal, no mojo moved
    Rejected,
    /// Receiver accepted; wager stakes are escrowed from this point
    Accepted,
    /// Wager settled; terminal
    Resolved { outcome: WagerOutcome, payout: Mojo },
}

impl QuestState {
    /// Open quests block duplicates for the same (sender, receiver, type, group)
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending { .. } | Self::Accepted)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Resolved { .. })
    }
}

/// A two-party quest inside a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaQuest {
    pub id: QuestId,
    pub group: GroupId,
    pub sender: UserId,
    pub receiver: UserId,
    pub kind: QuestKind,
    pub state: QuestState,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ArenaQuest {
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Both parties of the quest
    pub fn participants(&self) -> [&UserId; 2] {
        [&self.sender, &self.receiver]
    }

    /// The partner of `user`, if `user` is a participant
    pub fn partner_of(&self, user: &UserId) -> Option<&UserId> {
        if &self.sender == user {
            Some(&self.receiver)
        } else if &self.receiver == user {
            Some(&self.sender)
        } else {
            None
        }
    }
}
