//! Error types for the mojo core
//!
//! Three tiers: validation errors are rejected before any state read,
//! precondition errors carry enough detail for the caller to decide whether
//! to retry with different parameters, and integrity errors fail closed.
//! No operation silently no-ops on failure.

use thiserror::Error;

/// Result type for mojo core operations
pub type Result<T> = std::result::Result<T, MojoError>;

/// Mojo core error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MojoError {
    // ========================================================================
    // Validation errors (bad input shape, rejected before any state read)
    // ========================================================================

    /// Speculation description is empty
    #[error("Speculation description must not be empty")]
    EmptyDescription,

    /// Speculation description exceeds the limit
    #[error("Speculation description is {length} chars, max is {max}")]
    DescriptionTooLong { length: usize, max: usize },

    /// Stake must be strictly positive
    #[error("Stake must be positive, got {stake}")]
    InvalidStake { stake: f64 },

    /// Odds must be strictly positive
    #[error("Odds must be positive, got {odds}")]
    InvalidOdds { odds: f64 },

    /// Goal frequency outside {2, 3, 4}
    #[error("Goal frequency must be 2, 3, or 4 per week, got {frequency}")]
    InvalidFrequency { frequency: u8 },

    /// A quest cannot target its own sender
    #[error("Cannot send a quest to yourself")]
    SelfQuest,

    // ========================================================================
    // Goal errors
    // ========================================================================

    /// Daily idempotency guard: at most one completion per calendar day
    #[error("Goal already logged today ({date})")]
    AlreadyLoggedToday { date: chrono::NaiveDate },

    /// No live goal for the user
    #[error("User {user_id} has no active goal")]
    GoalNotFound { user_id: String },

    // ========================================================================
    // Ledger & rank errors
    // ========================================================================

    /// Not enough unreserved mojo
    #[error("Insufficient mojo: requested {requested:.2}, available {available:.2}")]
    InsufficientMojo { requested: f64, available: f64 },

    /// Server-side re-validation of an upgrade failed
    #[error("Rank requirements not met: {credibility_shortfall} credibility and {mojo_shortfall:.2} mojo short")]
    RankRequirementNotMet {
        credibility_shortfall: i32,
        mojo_shortfall: f64,
    },

    /// Upgrades climb exactly one tier at a time
    #[error("Invalid rank transition from {current} to {target}")]
    InvalidRankTransition { current: u8, target: u8 },

    /// Rank id outside the ladder; mutation paths fail closed
    #[error("Rank id {rank_id} is outside the ladder")]
    RankOutOfRange { rank_id: u8 },

    /// Reservation id not held by the book
    #[error("Reservation {reservation_id} not found")]
    ReservationNotFound { reservation_id: String },

    // ========================================================================
    // Quest errors
    // ========================================================================

    /// An open quest already exists for the same (sender, receiver, type, group);
    /// carries the existing quest's id so the caller can show its status
    #[error("An open {quest_type} quest already exists: {quest_id}")]
    DuplicateQuest {
        quest_type: String,
        quest_id: String,
    },

    /// Quest id unknown
    #[error("Quest {quest_id} not found")]
    QuestNotFound { quest_id: String },

    /// Only a pending quest can be responded to
    #[error("Quest {quest_id} is not pending")]
    QuestNotPending { quest_id: String },

    /// Only the receiver may respond
    #[error("Only the receiver may respond to quest {quest_id}")]
    NotQuestReceiver { quest_id: String },

    /// Alliances and battles have no wager to resolve
    #[error("Quest {quest_id} is a {quest_type}, not a wager")]
    NotAWager {
        quest_id: String,
        quest_type: String,
    },

    /// A wager only settles out of the accepted state
    #[error("Quest {quest_id} has no active wager to resolve")]
    QuestNotActive { quest_id: String },

    /// Exactly one resolve succeeds per record
    #[error("{id} has already been resolved")]
    AlreadyResolved { id: String },

    // ========================================================================
    // Speculation errors
    // ========================================================================

    /// Speculation id unknown
    #[error("Speculation {speculation_id} not found")]
    SpeculationNotFound { speculation_id: String },

    /// Speculations need a disinterested resolver to exist
    #[error("Group has {members} members, speculations require at least {required}")]
    GroupTooSmallForSpeculation { members: usize, required: usize },

    /// Only an open speculation can be accepted
    #[error("Speculation {speculation_id} is not open")]
    SpeculationNotOpen { speculation_id: String },

    /// Only an accepted speculation can be resolved
    #[error("Speculation {speculation_id} has not been accepted yet")]
    SpeculationNotAccepted { speculation_id: String },

    /// The creator cannot take the other side of their own bet
    #[error("Cannot accept your own speculation")]
    CannotAcceptOwnSpeculation,

    /// Accepter must belong to the speculation's group
    #[error("User {user_id} is not a member of group {group_id}")]
    NotGroupMember { user_id: String, group_id: String },

    /// Resolver must be a group member who is neither creator nor accepter
    #[error("User {user_id} is not eligible to resolve this speculation")]
    NotEligibleToResolve { user_id: String },
}

impl MojoError {
    /// Whether this is an input-shape error, safe to retry after correction
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyDescription
                | Self::DescriptionTooLong { .. }
                | Self::InvalidStake { .. }
                | Self::InvalidOdds { .. }
                | Self::InvalidFrequency { .. }
                | Self::SelfQuest
        )
    }
}
