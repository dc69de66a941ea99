//! Collaborator contracts for feeding the engine
//!
//! The engine owns no persistence. Interaction events and the item/user
//! directory come from implementations of these traits; `JsonSnapshot` is
//! the file-backed one used by the binary.

use crate::{
    error::RankResult,
    models::{Interaction, Item, Recommendation, UserId, UserProfile},
    services::Engine,
};

pub mod snapshot;

pub use snapshot::JsonSnapshot;

/// Source of interaction facts
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InteractionSource: Send + Sync {
    /// All interactions the source currently holds
    async fn fetch_interactions(&self) -> RankResult<Vec<Interaction>>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Item catalog and user directory
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Current candidate items
    async fn items(&self) -> RankResult<Vec<Item>>;

    /// Profile for one user, `None` if the directory does not know them
    async fn user(&self, user_id: &UserId) -> RankResult<Option<UserProfile>>;

    /// Every known user profile
    async fn users(&self) -> RankResult<Vec<UserProfile>>;
}

/// Pulls every interaction from `source` into the engine
///
/// Leaves the engine with a deviation matrix reflecting the new facts.
/// Returns the number of interactions handed to the engine.
pub async fn sync_interactions(
    engine: &Engine,
    source: &dyn InteractionSource,
) -> RankResult<usize> {
    let interactions = source.fetch_interactions().await?;

    tracing::info!(
        source = source.name(),
        count = interactions.len(),
        "Syncing interactions"
    );

    let recorded = engine.record_batch(interactions).await;

    if engine.is_stale().await {
        engine.rebuild_deviation_matrix().await;
    }

    Ok(recorded)
}

/// Looks the user up in the directory and ranks the current catalog
///
/// A user missing from the directory is ranked with no declared interests.
pub async fn recommend_for(
    engine: &Engine,
    catalog: &dyn CatalogSource,
    user_id: &UserId,
    top_n: usize,
) -> RankResult<Vec<Recommendation>> {
    let profile = match catalog.user(user_id).await? {
        Some(profile) => profile,
        None => {
            tracing::debug!(user_id = %user_id, "User not in directory, using empty profile");
            UserProfile::new(user_id.clone())
        }
    };
    let items = catalog.items().await?;

    engine.recommend(&profile, &items, top_n).await
}
