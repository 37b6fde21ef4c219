//! External collaborator contracts
//!
//! The core consumes identity, profile, and notification services through
//! these seams. The in-memory implementations serve tests, demos, and
//! single-process deployments.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use mojo_types::{QuestId, UserId};

pub use mojo_speculation::{GroupDirectory, InMemoryGroups};

/// Resolves user ids to display names for human-readable messages
///
/// Formatting only; no correctness property depends on it.
#[async_trait::async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn display_name(&self, user: &UserId) -> String;
}

/// In-memory profile directory
#[derive(Clone, Default)]
pub struct InMemoryProfiles {
    names: Arc<RwLock<HashMap<UserId, String>>>,
}

impl InMemoryProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_name(&self, user: &UserId, name: impl Into<String>) {
        self.names.write().await.insert(user.clone(), name.into());
    }
}

#[async_trait::async_trait]
impl ProfileDirectory for InMemoryProfiles {
    async fn display_name(&self, user: &UserId) -> String {
        match self.names.read().await.get(user) {
            Some(name) => name.clone(),
            // Fall back to the first uuid segment, enough to tell users apart
            None => {
                let s = user.0.to_string();
                s.split('-').next().unwrap_or(&s).to_string()
            }
        }
    }
}

/// A fire-and-forget event for the external notification service
///
/// Delivery and ordering are not guaranteed by this core; the receiving
/// side must be idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MojoNotification {
    pub user: UserId,
    pub title: String,
    pub message: String,
    /// Signed mojo movement this event describes, zero when none
    pub mojo_change: f64,
    pub source_quest: Option<QuestId>,
}

/// Sink for notification events, invoked only after the core mutation
/// committed
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: MojoNotification);
}

/// Sink that records everything it receives (tests, local inspection)
#[derive(Clone, Default)]
pub struct RecordingSink {
    sent: Arc<RwLock<Vec<MojoNotification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<MojoNotification> {
        self.sent.read().await.clone()
    }

    pub async fn sent_to(&self, user: &UserId) -> Vec<MojoNotification> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|n| &n.user == user)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, notification: MojoNotification) {
        self.sent.write().await.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_profile_fallback_name() {
        let profiles = InMemoryProfiles::new();
        let user = UserId::new();

        let fallback = profiles.display_name(&user).await;
        assert!(!fallback.is_empty());

        profiles.set_name(&user, "Jess").await;
        assert_eq!(profiles.display_name(&user).await, "Jess");
    }

    #[tokio::test]
    async fn test_recording_sink_filters_by_user() {
        let sink = RecordingSink::new();
        let a = UserId::new();
        let b = UserId::new();

        sink.notify(MojoNotification {
            user: a.clone(),
            title: "t".into(),
            message: "m".into(),
            mojo_change: 1.0,
            source_quest: None,
        })
        .await;

        assert_eq!(sink.sent().await.len(), 1);
        assert_eq!(sink.sent_to(&a).await.len(), 1);
        assert!(sink.sent_to(&b).await.is_empty());
    }
}
