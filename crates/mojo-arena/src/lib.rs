//! Mojo Arena - the quest engine
//!
//! A two-party state machine over four quest types. Alliances and battles
//! carry no stake; prophecies and curses are wagers whose odds are computed
//! from the *receiver's* credibility at request time and frozen into the
//! record.
//!
//! Lifecycle: `request` creates a pending quest (taking a ledger reservation
//! for wager stakes), the receiver alone may `respond`, and accepted wagers
//! are later settled by `resolve` with a won/lost/refunded outcome. Exactly
//! one `resolve` succeeds per quest.
//!
//! Battle settlement cadence (who compares weekly session counts, and when)
//! is an open product question and is deliberately not implemented here;
//! battles stop at the accepted state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use mojo_ledger::CredibilityLedger;
use mojo_types::{
    potential_payout, wager_odds, ArenaQuest, GroupId, Mojo, MojoError, QuestId, QuestKind,
    QuestState, QuestType, Result, UserId, WagerOutcome,
};

/// The arena quest engine
///
/// Thread-safe in-memory store; each operation holds the quest store's write
/// lock for the full mutation so duplicate checks and state transitions are
/// race-free, and concurrent resolves yield exactly one success.
#[derive(Clone)]
pub struct ArenaQuestEngine {
    ledger: CredibilityLedger,
    quests: Arc<RwLock<HashMap<QuestId, ArenaQuest>>>,
}

impl ArenaQuestEngine {
    pub fn new(ledger: CredibilityLedger) -> Self {
        Self {
            ledger,
            quests: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Send a quest request
    ///
    /// At most one open quest may exist per (sender, receiver, type, group);
    /// a duplicate fails with `DuplicateQuest` carrying the existing quest's
    /// id so the caller can show its status instead of erroring blindly.
    ///
    /// For wagers the stake must be positive and within the sender's
    /// available mojo; a reservation holds it until the receiver responds.
    /// Alliances and battles must carry a zero stake.
    pub async fn request(
        &self,
        group: &GroupId,
        sender: &UserId,
        receiver: &UserId,
        quest_type: QuestType,
        stake: Mojo,
    ) -> Result<ArenaQuest> {
        if sender == receiver {
            return Err(MojoError::SelfQuest);
        }
        if quest_type.is_wager() {
            if !stake.is_positive() {
                return Err(MojoError::InvalidStake { stake: stake.value() });
            }
        } else if !stake.is_zero() {
            return Err(MojoError::InvalidStake { stake: stake.value() });
        }

        let mut quests = self.quests.write().await;

        if let Some(existing) = quests.values().find(|q| {
            q.is_open()
                && &q.sender == sender
                && &q.receiver == receiver
                && &q.group == group
                && q.kind.quest_type() == quest_type
        }) {
            return Err(MojoError::DuplicateQuest {
                quest_type: quest_type.to_string(),
                quest_id: existing.id.to_string(),
            });
        }

        let (kind, reservation) = match quest_type.wager_direction() {
            Some(direction) => {
                // Odds come from the receiver's credibility, frozen now
                let receiver_stats = self.ledger.get_or_create(receiver).await;
                let odds = wager_odds(direction, receiver_stats.credibility);
                let reservation = self.ledger.reserve(sender, stake).await?;
                let kind = match quest_type {
                    QuestType::Prophecy => QuestKind::Prophecy { stake, odds },
                    _ => QuestKind::Curse { stake, odds },
                };
                (kind, Some(reservation))
            }
            None => {
                let kind = match quest_type {
                    QuestType::Alliance => QuestKind::Alliance,
                    _ => QuestKind::Battle,
                };
                (kind, None)
            }
        };

        let quest = ArenaQuest {
            id: QuestId::new(),
            group: group.clone(),
            sender: sender.clone(),
            receiver: receiver.clone(),
            kind,
            state: QuestState::Pending { reservation },
            created_at: Utc::now(),
            responded_at: None,
            resolved_at: None,
        };

        info!(quest = %quest.id, %quest_type, sender = %sender, receiver = %receiver, "quest requested");
        quests.insert(quest.id.clone(), quest.clone());
        Ok(quest)
    }

    /// Accept or reject a pending quest; only the receiver may respond
    ///
    /// Rejection is terminal and moves no mojo (the stake was only
    /// reserved). Acceptance escrows a wager's stake out of the sender's
    /// balance.
    pub async fn respond(
        &self,
        quest_id: &QuestId,
        responder: &UserId,
        accept: bool,
    ) -> Result<ArenaQuest> {
        let mut quests = self.quests.write().await;
        let quest = quests.get_mut(quest_id).ok_or_else(|| MojoError::QuestNotFound {
            quest_id: quest_id.to_string(),
        })?;

        let reservation = match quest.state {
            QuestState::Pending { ref reservation } => reservation.clone(),
            _ => {
                return Err(MojoError::QuestNotPending {
                    quest_id: quest_id.to_string(),
                })
            }
        };
        if responder != &quest.receiver {
            return Err(MojoError::NotQuestReceiver {
                quest_id: quest_id.to_string(),
            });
        }

        if accept {
            if let Some(ref reservation) = reservation {
                // The stake leaves the sender's balance and is held by the quest
                self.ledger.settle(reservation).await?;
            }
            quest.state = QuestState::Accepted;
        } else {
            if let Some(ref reservation) = reservation {
                self.ledger.release(reservation).await?;
            }
            quest.state = QuestState::Rejected;
        }
        quest.responded_at = Some(Utc::now());

        info!(quest = %quest.id, accept, "quest response recorded");
        Ok(quest.clone())
    }

    /// Settle an accepted wager
    ///
    /// Triggered externally by the receiver's weekly outcome. `Won` credits
    /// the sender the full payout (stake returned plus winnings), `Lost`
    /// forfeits the escrowed stake, `Refunded` returns the stake exactly.
    pub async fn resolve(&self, quest_id: &QuestId, outcome: WagerOutcome) -> Result<ArenaQuest> {
        let mut quests = self.quests.write().await;
        let quest = quests.get_mut(quest_id).ok_or_else(|| MojoError::QuestNotFound {
            quest_id: quest_id.to_string(),
        })?;

        let (stake, odds) = match (&quest.kind, quest.kind.odds()) {
            (kind, Some(odds)) => (kind.stake(), odds),
            _ => {
                return Err(MojoError::NotAWager {
                    quest_id: quest_id.to_string(),
                    quest_type: quest.kind.quest_type().to_string(),
                })
            }
        };

        match quest.state {
            QuestState::Accepted => {}
            QuestState::Resolved { .. } => {
                return Err(MojoError::AlreadyResolved {
                    id: quest_id.to_string(),
                })
            }
            _ => {
                return Err(MojoError::QuestNotActive {
                    quest_id: quest_id.to_string(),
                })
            }
        }

        let payout = match outcome {
            WagerOutcome::Won => potential_payout(stake, odds),
            WagerOutcome::Lost => Mojo::zero(),
            WagerOutcome::Refunded => stake,
        };
        if payout.is_positive() {
            self.ledger.credit(&quest.sender, payout).await?;
        }

        quest.state = QuestState::Resolved { outcome, payout };
        quest.resolved_at = Some(Utc::now());

        info!(quest = %quest.id, ?outcome, %payout, "wager settled");
        Ok(quest.clone())
    }

    /// Look up a quest
    pub async fn get(&self, quest_id: &QuestId) -> Result<ArenaQuest> {
        self.quests
            .read()
            .await
            .get(quest_id)
            .cloned()
            .ok_or_else(|| MojoError::QuestNotFound {
                quest_id: quest_id.to_string(),
            })
    }

    /// All open quests the user participates in
    pub async fn open_quests_for(&self, user: &UserId) -> Vec<ArenaQuest> {
        let quests = self.quests.read().await;
        quests
            .values()
            .filter(|q| q.is_open() && q.partner_of(user).is_some())
            .cloned()
            .collect()
    }

    /// Accepted alliances the user participates in (for weekly settlement)
    pub async fn accepted_alliances(&self, user: &UserId) -> Vec<ArenaQuest> {
        let quests = self.quests.read().await;
        quests
            .values()
            .filter(|q| {
                q.state == QuestState::Accepted
                    && q.kind == QuestKind::Alliance
                    && q.partner_of(user).is_some()
            })
            .cloned()
            .collect()
    }
}
