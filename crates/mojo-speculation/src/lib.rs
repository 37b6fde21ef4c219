//! Mojo Speculation - the free-form betting market
//!
//! A speculation is a creator-written proposition with a side, odds, and a
//! stake; any other group member may take the other side for the same stake,
//! and a third, disinterested member calls the result. Settlement is a
//! zero-sum split of the fixed pot (`2 x stake` to the winner), a different
//! shape from the arena's formula payout, and deliberately a separate code
//! path.
//!
//! Groups must have at least three members so a disinterested resolver
//! always exists.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use mojo_ledger::CredibilityLedger;
use mojo_types::{
    GroupId, Mojo, MojoError, Result, Speculation, SpeculationId, SpeculationState, UserId,
    MAX_DESCRIPTION_LEN, MIN_GROUP_MEMBERS,
};

/// Group membership facts, supplied by the external identity collaborator
///
/// This core never manages membership; it only asks two questions of
/// whoever does.
#[async_trait::async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn member_count(&self, group: &GroupId) -> usize;
    async fn is_member(&self, group: &GroupId, user: &UserId) -> bool;
}

/// In-memory group directory (tests, demos, single-process deployments)
#[derive(Clone, Default)]
pub struct InMemoryGroups {
    members: Arc<RwLock<HashMap<GroupId, HashSet<UserId>>>>,
}

impl InMemoryGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_member(&self, group: &GroupId, user: &UserId) {
        self.members
            .write()
            .await
            .entry(group.clone())
            .or_default()
            .insert(user.clone());
    }
}

#[async_trait::async_trait]
impl GroupDirectory for InMemoryGroups {
    async fn member_count(&self, group: &GroupId) -> usize {
        self.members
            .read()
            .await
            .get(group)
            .map(|m| m.len())
            .unwrap_or(0)
    }

    async fn is_member(&self, group: &GroupId, user: &UserId) -> bool {
        self.members
            .read()
            .await
            .get(group)
            .map(|m| m.contains(user))
            .unwrap_or(false)
    }
}

/// The speculation market
#[derive(Clone)]
pub struct SpeculationMarket {
    ledger: CredibilityLedger,
    groups: Arc<dyn GroupDirectory>,
    speculations: Arc<RwLock<HashMap<SpeculationId, Speculation>>>,
}

impl SpeculationMarket {
    pub fn new(ledger: CredibilityLedger, groups: Arc<dyn GroupDirectory>) -> Self {
        Self {
            ledger,
            groups,
            speculations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Post a speculation to the group
    ///
    /// Input shape is validated before any state is read; the creator's
    /// stake is then held by a ledger reservation until someone accepts.
    pub async fn create(
        &self,
        group: &GroupId,
        creator: &UserId,
        description: &str,
        creator_side: bool,
        odds: f64,
        stake: Mojo,
    ) -> Result<Speculation> {
        let description = description.trim();
        if description.is_empty() {
            return Err(MojoError::EmptyDescription);
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(MojoError::DescriptionTooLong {
                length: description.chars().count(),
                max: MAX_DESCRIPTION_LEN,
            });
        }
        if odds.is_nan() || odds <= 0.0 {
            return Err(MojoError::InvalidOdds { odds });
        }
        if !stake.is_positive() {
            return Err(MojoError::InvalidStake { stake: stake.value() });
        }

        let members = self.groups.member_count(group).await;
        if members < MIN_GROUP_MEMBERS {
            return Err(MojoError::GroupTooSmallForSpeculation {
                members,
                required: MIN_GROUP_MEMBERS,
            });
        }

        let reservation = self.ledger.reserve(creator, stake).await?;

        let speculation = Speculation {
            id: SpeculationId::new(),
            group: group.clone(),
            creator: creator.clone(),
            description: description.to_string(),
            creator_side,
            odds,
            stake,
            state: SpeculationState::Open { reservation },
            created_at: Utc::now(),
        };

        info!(speculation = %speculation.id, creator = %creator, %stake, "speculation created");
        self.speculations
            .write()
            .await
            .insert(speculation.id.clone(), speculation.clone());
        Ok(speculation)
    }

    /// Take the other side for the same stake
    ///
    /// Both stakes are escrowed out of the balances from this point: the
    /// accepter's by a direct spend, the creator's by settling the
    /// reservation taken at creation.
    pub async fn accept(&self, spec_id: &SpeculationId, accepter: &UserId) -> Result<Speculation> {
        let mut speculations = self.speculations.write().await;
        let speculation =
            speculations
                .get_mut(spec_id)
                .ok_or_else(|| MojoError::SpeculationNotFound {
                    speculation_id: spec_id.to_string(),
                })?;

        let reservation = match speculation.state {
            SpeculationState::Open { ref reservation } => reservation.clone(),
            _ => {
                return Err(MojoError::SpeculationNotOpen {
                    speculation_id: spec_id.to_string(),
                })
            }
        };
        if accepter == &speculation.creator {
            return Err(MojoError::CannotAcceptOwnSpeculation);
        }
        if !self.groups.is_member(&speculation.group, accepter).await {
            return Err(MojoError::NotGroupMember {
                user_id: accepter.to_string(),
                group_id: speculation.group.to_string(),
            });
        }

        // Accepter's stake first (the fallible step), then the creator's hold
        self.ledger.spend(accepter, speculation.stake).await?;
        self.ledger.settle(&reservation).await?;

        speculation.state = SpeculationState::Accepted {
            accepter: accepter.clone(),
            accepted_at: Utc::now(),
        };

        info!(speculation = %speculation.id, accepter = %accepter, "speculation accepted");
        Ok(speculation.clone())
    }

    /// Call the result
    ///
    /// Only a group member who is neither creator nor accepter may resolve
    /// (disinterested arbitration). The party whose side matches the result
    /// takes the whole pot; exactly one resolve succeeds.
    pub async fn resolve(
        &self,
        spec_id: &SpeculationId,
        resolver: &UserId,
        result: bool,
    ) -> Result<Speculation> {
        let mut speculations = self.speculations.write().await;
        let speculation =
            speculations
                .get_mut(spec_id)
                .ok_or_else(|| MojoError::SpeculationNotFound {
                    speculation_id: spec_id.to_string(),
                })?;

        let accepter = match speculation.state {
            SpeculationState::Accepted { ref accepter, .. } => accepter.clone(),
            SpeculationState::Resolved { .. } => {
                return Err(MojoError::AlreadyResolved {
                    id: spec_id.to_string(),
                })
            }
            SpeculationState::Open { .. } => {
                return Err(MojoError::SpeculationNotAccepted {
                    speculation_id: spec_id.to_string(),
                })
            }
        };

        let interested = resolver == &speculation.creator || resolver == &accepter;
        if interested || !self.groups.is_member(&speculation.group, resolver).await {
            return Err(MojoError::NotEligibleToResolve {
                user_id: resolver.to_string(),
            });
        }

        let winner = if speculation.creator_side == result {
            speculation.creator.clone()
        } else {
            accepter.clone()
        };
        let payout = speculation.total_pot();
        self.ledger.credit(&winner, payout).await?;

        speculation.state = SpeculationState::Resolved {
            accepter,
            result,
            winner: winner.clone(),
            payout,
            resolved_at: Utc::now(),
        };

        info!(speculation = %speculation.id, winner = %winner, %payout, "speculation resolved");
        Ok(speculation.clone())
    }

    /// Look up a speculation
    pub async fn get(&self, spec_id: &SpeculationId) -> Result<Speculation> {
        self.speculations
            .read()
            .await
            .get(spec_id)
            .cloned()
            .ok_or_else(|| MojoError::SpeculationNotFound {
                speculation_id: spec_id.to_string(),
            })
    }

    /// Open speculations visible to a group
    pub async fn open_in_group(&self, group: &GroupId) -> Vec<Speculation> {
        let speculations = self.speculations.read().await;
        speculations
            .values()
            .filter(|s| &s.group == group && s.state.is_open())
            .cloned()
            .collect()
    }
}
