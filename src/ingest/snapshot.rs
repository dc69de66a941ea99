use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::{
    error::RankResult,
    ingest::{CatalogSource, InteractionSource},
    models::{Interaction, Item, UserId, UserProfile},
};

/// On-disk layout of a snapshot file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

/// Read-only collaborator backed by a JSON snapshot
#[derive(Debug, Clone)]
pub struct JsonSnapshot {
    snapshot: Arc<Snapshot>,
}

impl JsonSnapshot {
    /// Loads and parses a snapshot file
    pub async fn load(path: impl AsRef<Path>) -> RankResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let snapshot = Self::parse(&raw)?;

        tracing::info!(
            path = %path.display(),
            users = snapshot.snapshot.users.len(),
            items = snapshot.snapshot.items.len(),
            interactions = snapshot.snapshot.interactions.len(),
            "Loaded snapshot"
        );

        Ok(snapshot)
    }

    pub fn parse(raw: &str) -> RankResult<Self> {
        let snapshot: Snapshot = serde_json::from_str(raw)?;
        Ok(Self::from(snapshot))
    }
}

impl From<Snapshot> for JsonSnapshot {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }
}

#[async_trait::async_trait]
impl InteractionSource for JsonSnapshot {
    async fn fetch_interactions(&self) -> RankResult<Vec<Interaction>> {
        Ok(self.snapshot.interactions.clone())
    }

    fn name(&self) -> &'static str {
        "json_snapshot"
    }
}

#[async_trait::async_trait]
impl CatalogSource for JsonSnapshot {
    async fn items(&self) -> RankResult<Vec<Item>> {
        Ok(self.snapshot.items.clone())
    }

    async fn user(&self, user_id: &UserId) -> RankResult<Option<UserProfile>> {
        Ok(self
            .snapshot
            .users
            .iter()
            .find(|u| &u.id == user_id)
            .cloned())
    }

    async fn users(&self) -> RankResult<Vec<UserProfile>> {
        Ok(self.snapshot.users.clone())
    }
}
