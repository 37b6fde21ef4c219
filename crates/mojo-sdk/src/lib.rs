//! Mojo SDK - the high-level surface of the credibility/mojo economy
//!
//! Binds the ledger, goal tracker, arena, and speculation market into one
//! facade, [`MojoCore`], exposing the public operations of the core:
//! statistics access, rank upgrades, goal selection and completion logging,
//! the quest lifecycle, and the speculation lifecycle.
//!
//! External services (identity, profiles, notifications) are consumed
//! through the traits in [`collaborators`]; notification dispatch always
//! happens *after* the core mutation committed, never inside it.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use mojo_sdk::{
//!     InMemoryGroups, InMemoryProfiles, MojoCore, RecordingSink, SystemClock,
//! };
//!
//! #[tokio::main]
//! async fn main() -> mojo_types::Result<()> {
//!     let groups = Arc::new(InMemoryGroups::new());
//!     let core = MojoCore::new(
//!         groups.clone(),
//!         Arc::new(InMemoryProfiles::new()),
//!         Arc::new(RecordingSink::new()),
//!         Arc::new(SystemClock),
//!     );
//!
//!     let user = mojo_types::UserId::new();
//!     core.select_goal(&user, 3).await?;
//!     let report = core.log_goal_completion(&user).await?;
//!     println!("progress {}/{}", report.outcome.progress, report.outcome.frequency);
//!     Ok(())
//! }
//! ```

pub mod collaborators;

pub use collaborators::{
    GroupDirectory, InMemoryGroups, InMemoryProfiles, MojoNotification, NotificationSink,
    ProfileDirectory, RecordingSink,
};
pub use mojo_goals::{
    Clock, CompletionOutcome, FixedClock, SystemClock, ALLIANCE_BONUS_MOJO, BASE_LOG_MOJO,
    WEEKLY_BONUS_CREDIBILITY, WEEKLY_BONUS_MOJO,
};
pub use mojo_ledger::{CredibilityLedger, DeltaOutcome, RankChange, Reservation};
pub use mojo_types::*;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::info;

use mojo_arena::ArenaQuestEngine;
use mojo_goals::{monday_of, GoalTracker};
use mojo_speculation::SpeculationMarket;

/// An alliance bonus paid out during completion logging
#[derive(Debug, Clone, PartialEq)]
pub struct AllianceBonus {
    pub quest: QuestId,
    pub partner: UserId,
    pub amount: Mojo,
}

/// Everything a counted completion produced, including alliance settlement
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReport {
    pub outcome: CompletionOutcome,
    /// Alliances settled by this log (both partners complete), at most once
    /// per quest per week
    pub alliance_bonuses: Vec<AllianceBonus>,
}

/// The mojo economy core
///
/// One instance owns all four engines over a shared ledger. Cloning is
/// cheap and clones share state.
pub struct MojoCore<C: Clock> {
    clock: Arc<C>,
    ledger: CredibilityLedger,
    goals: GoalTracker<C>,
    arena: ArenaQuestEngine,
    market: SpeculationMarket,
    profiles: Arc<dyn ProfileDirectory>,
    notifications: Arc<dyn NotificationSink>,
    /// Week each alliance quest last paid its bonus, keyed by quest id
    alliance_settled: Arc<RwLock<HashMap<QuestId, NaiveDate>>>,
}

impl<C: Clock> Clone for MojoCore<C> {
    fn clone(&self) -> Self {
        Self {
            clock: Arc::clone(&self.clock),
            ledger: self.ledger.clone(),
            goals: self.goals.clone(),
            arena: self.arena.clone(),
            market: self.market.clone(),
            profiles: Arc::clone(&self.profiles),
            notifications: Arc::clone(&self.notifications),
            alliance_settled: Arc::clone(&self.alliance_settled),
        }
    }
}

impl<C: Clock> MojoCore<C> {
    pub fn new(
        groups: Arc<dyn GroupDirectory>,
        profiles: Arc<dyn ProfileDirectory>,
        notifications: Arc<dyn NotificationSink>,
        clock: Arc<C>,
    ) -> Self {
        let ledger = CredibilityLedger::new();
        Self {
            goals: GoalTracker::new(ledger.clone(), Arc::clone(&clock)),
            arena: ArenaQuestEngine::new(ledger.clone()),
            market: SpeculationMarket::new(ledger.clone(), groups),
            clock,
            ledger,
            profiles,
            notifications,
            alliance_settled: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Direct access to the underlying ledger (read paths, tooling)
    pub fn ledger(&self) -> &CredibilityLedger {
        &self.ledger
    }

    // ------------------------------------------------------------------
    // Statistics & rank
    // ------------------------------------------------------------------

    /// The user's statistics, created with defaults on first access
    pub async fn get_or_create_statistics(&self, user: &UserId) -> UserStatistics {
        self.ledger.get_or_create(user).await
    }

    /// Whether the user sits in the demotion warning band
    pub async fn in_rank_warning(&self, user: &UserId) -> bool {
        self.ledger.in_warning(user).await
    }

    /// Purchase the next rank tier; eligibility is re-validated against the
    /// live ledger row
    pub async fn upgrade_rank(&self, user: &UserId, target_rank_id: u8) -> Result<UserStatistics> {
        let stats = self.ledger.upgrade_rank(user, target_rank_id).await?;
        let rank = rank_of(stats.rank_id);
        self.notifications
            .notify(MojoNotification {
                user: user.clone(),
                title: format!("Rank up: {}", rank.name),
                message: format!("{} - you are now rank {} of 8.", rank.tagline, rank.id),
                mojo_change: -rank.mojo_cost.value(),
                source_quest: None,
            })
            .await;
        Ok(stats)
    }

    // ------------------------------------------------------------------
    // Goals
    // ------------------------------------------------------------------

    /// Create (or replace) the user's weekly goal
    pub async fn select_goal(&self, user: &UserId, per_week: u8) -> Result<UserGoal> {
        self.goals.select_goal(user, per_week).await
    }

    /// The user's goal with the weekly rollover applied
    pub async fn current_goal(&self, user: &UserId) -> Result<UserGoal> {
        self.goals.current_goal(user).await
    }

    /// Log today's completion and settle whatever it unlocks
    ///
    /// On a weekly completion this also settles accepted alliances whose
    /// partner has met their week, paying both sides once per quest per
    /// week, and emits the corresponding notifications.
    pub async fn log_goal_completion(&self, user: &UserId) -> Result<CompletionReport> {
        let outcome = self.goals.log_completion(user).await?;

        let mut alliance_bonuses = Vec::new();
        if outcome.weekly_goal_met {
            self.notifications
                .notify(MojoNotification {
                    user: user.clone(),
                    title: "Weekly goal complete!".to_string(),
                    message: format!(
                        "{} of {} sessions logged - bonus earned.",
                        outcome.progress, outcome.frequency
                    ),
                    mojo_change: outcome.mojo_awarded.value(),
                    source_quest: None,
                })
                .await;

            alliance_bonuses = self.settle_alliances(user).await?;
        }

        Ok(CompletionReport {
            outcome,
            alliance_bonuses,
        })
    }

    /// Pay alliance bonuses for every accepted alliance whose other side has
    /// also met their week. Guarded so each quest pays at most once per week.
    async fn settle_alliances(&self, user: &UserId) -> Result<Vec<AllianceBonus>> {
        let week = monday_of(self.clock.today());
        let mut bonuses = Vec::new();

        for quest in self.arena.accepted_alliances(user).await {
            let partner = match quest.partner_of(user) {
                Some(partner) => partner.clone(),
                None => continue,
            };
            if !self.goals.weekly_goal_met(&partner).await {
                continue;
            }

            {
                let mut settled = self.alliance_settled.write().await;
                if settled.get(&quest.id) == Some(&week) {
                    continue;
                }
                settled.insert(quest.id.clone(), week);
            }

            let amount = Mojo::new(ALLIANCE_BONUS_MOJO);
            self.ledger.credit(user, amount).await?;
            self.ledger.credit(&partner, amount).await?;
            info!(quest = %quest.id, user = %user, partner = %partner, "alliance bonus paid");

            let user_name = self.profiles.display_name(user).await;
            let partner_name = self.profiles.display_name(&partner).await;
            self.notifications
                .notify(MojoNotification {
                    user: user.clone(),
                    title: "Alliance complete!".to_string(),
                    message: format!("You and {} both finished your weeks.", partner_name),
                    mojo_change: ALLIANCE_BONUS_MOJO,
                    source_quest: Some(quest.id.clone()),
                })
                .await;
            self.notifications
                .notify(MojoNotification {
                    user: partner.clone(),
                    title: "Alliance complete!".to_string(),
                    message: format!("You and {} both finished your weeks.", user_name),
                    mojo_change: ALLIANCE_BONUS_MOJO,
                    source_quest: Some(quest.id.clone()),
                })
                .await;

            bonuses.push(AllianceBonus {
                quest: quest.id,
                partner,
                amount,
            });
        }

        Ok(bonuses)
    }

    // ------------------------------------------------------------------
    // Arena quests
    // ------------------------------------------------------------------

    /// Send a quest request to another group member
    pub async fn request_quest(
        &self,
        group: &GroupId,
        sender: &UserId,
        receiver: &UserId,
        quest_type: QuestType,
        stake: Mojo,
    ) -> Result<ArenaQuest> {
        let quest = self
            .arena
            .request(group, sender, receiver, quest_type, stake)
            .await?;

        let sender_name = self.profiles.display_name(sender).await;
        self.notifications
            .notify(MojoNotification {
                user: receiver.clone(),
                title: format!("New {} quest", quest_type),
                message: format!("{} challenged you to a {}.", sender_name, quest_type),
                mojo_change: 0.0,
                source_quest: Some(quest.id.clone()),
            })
            .await;
        Ok(quest)
    }

    /// Accept or reject a pending quest (receiver only)
    pub async fn respond_to_quest(
        &self,
        quest_id: &QuestId,
        responder: &UserId,
        accept: bool,
    ) -> Result<ArenaQuest> {
        let quest = self.arena.respond(quest_id, responder, accept).await?;

        let responder_name = self.profiles.display_name(responder).await;
        let verb = if accept { "accepted" } else { "declined" };
        self.notifications
            .notify(MojoNotification {
                user: quest.sender.clone(),
                title: format!("Quest {}", verb),
                message: format!("{} {} your {} quest.", responder_name, verb, quest.kind.quest_type()),
                mojo_change: 0.0,
                source_quest: Some(quest.id.clone()),
            })
            .await;
        Ok(quest)
    }

    /// Settle an accepted prophecy/curse wager
    pub async fn resolve_quest(
        &self,
        quest_id: &QuestId,
        outcome: WagerOutcome,
    ) -> Result<ArenaQuest> {
        let quest = self.arena.resolve(quest_id, outcome).await?;

        let (title, payout) = match &quest.state {
            QuestState::Resolved { outcome: WagerOutcome::Won, payout } => ("Wager won!", *payout),
            QuestState::Resolved { outcome: WagerOutcome::Refunded, payout } => {
                ("Wager refunded", *payout)
            }
            _ => ("Wager lost", Mojo::zero()),
        };
        self.notifications
            .notify(MojoNotification {
                user: quest.sender.clone(),
                title: title.to_string(),
                message: format!("Your {} quest settled.", quest.kind.quest_type()),
                mojo_change: payout.value(),
                source_quest: Some(quest.id.clone()),
            })
            .await;
        Ok(quest)
    }

    /// Open quests the user participates in
    pub async fn open_quests_for(&self, user: &UserId) -> Vec<ArenaQuest> {
        self.arena.open_quests_for(user).await
    }

    // ------------------------------------------------------------------
    // Speculations
    // ------------------------------------------------------------------

    /// Post a speculation to a group
    pub async fn create_speculation(
        &self,
        group: &GroupId,
        creator: &UserId,
        description: &str,
        creator_side: bool,
        odds: f64,
        stake: Mojo,
    ) -> Result<Speculation> {
        self.market
            .create(group, creator, description, creator_side, odds, stake)
            .await
    }

    /// Take the other side of an open speculation
    pub async fn accept_speculation(
        &self,
        spec_id: &SpeculationId,
        accepter: &UserId,
    ) -> Result<Speculation> {
        self.market.accept(spec_id, accepter).await
    }

    /// Resolve an accepted speculation (disinterested group member only)
    pub async fn resolve_speculation(
        &self,
        spec_id: &SpeculationId,
        resolver: &UserId,
        result: bool,
    ) -> Result<Speculation> {
        let speculation = self.market.resolve(spec_id, resolver, result).await?;

        if let SpeculationState::Resolved { ref accepter, ref winner, payout, .. } =
            speculation.state
        {
            let loser = if winner == &speculation.creator {
                accepter.clone()
            } else {
                speculation.creator.clone()
            };
            self.notifications
                .notify(MojoNotification {
                    user: winner.clone(),
                    title: "Speculation won!".to_string(),
                    message: format!("\"{}\" went your way.", speculation.description),
                    mojo_change: payout.value(),
                    source_quest: None,
                })
                .await;
            self.notifications
                .notify(MojoNotification {
                    user: loser,
                    title: "Speculation lost".to_string(),
                    message: format!("\"{}\" did not go your way.", speculation.description),
                    mojo_change: 0.0,
                    source_quest: None,
                })
                .await;
        }
        Ok(speculation)
    }

    /// Open speculations in a group
    pub async fn open_speculations(&self, group: &GroupId) -> Vec<Speculation> {
        self.market.open_in_group(group).await
    }
}
