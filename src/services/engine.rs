use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::{Config, RebuildPolicy},
    error::RankResult,
    models::{Interaction, Item, ItemId, Recommendation, UserId, UserProfile},
};

use super::{
    deviation::DeviationMatrix,
    predictor::{Prediction, Predictor},
    rating_store::RatingStore,
    recommender::Recommender,
};

/// Shared ranking engine
///
/// The rating store is guarded by a read/write lock. The deviation matrix is
/// an immutable snapshot behind an `Arc`: rebuilds construct a fresh matrix
/// and swap the pointer, so readers always hold a complete (old or new)
/// matrix and never observe a partial build.
pub struct Engine {
    config: Config,
    store: RwLock<RatingStore>,
    deviations: RwLock<Arc<DeviationMatrix>>,
}

impl Engine {
    /// Creates an engine with an empty rating store
    pub fn new(config: Config) -> RankResult<Self> {
        let store = RatingStore::from_config(&config);
        Self::with_store(config, store)
    }

    /// Creates an engine over an existing store and builds its first matrix
    pub fn with_store(config: Config, store: RatingStore) -> RankResult<Self> {
        config.validate()?;
        let matrix = DeviationMatrix::build(&store, config.max_items_per_user);
        Ok(Self {
            config,
            store: RwLock::new(store),
            deviations: RwLock::new(Arc::new(matrix)),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Records one interaction; rebuilds the matrix under `RebuildPolicy::OnRecord`
    pub async fn record(&self, interaction: Interaction) {
        self.store.write().await.record(interaction);

        if self.config.rebuild_policy == RebuildPolicy::OnRecord {
            self.rebuild_deviation_matrix().await;
        }
    }

    /// Records a batch in timestamp order under a single write lock, followed
    /// by at most one rebuild
    pub async fn record_batch(&self, interactions: Vec<Interaction>) -> usize {
        let recorded = interactions.len();
        self.store.write().await.record_batch(interactions);

        if recorded > 0 && self.config.rebuild_policy == RebuildPolicy::OnRecord {
            self.rebuild_deviation_matrix().await;
        }
        recorded
    }

    /// Recomputes the deviation matrix and publishes it to readers
    ///
    /// The build holds the store read guard, so no `record` lands mid-build.
    /// A finished build never replaces a snapshot of a newer generation.
    pub async fn rebuild_deviation_matrix(&self) {
        let matrix = {
            let store = self.store.read().await;
            Arc::new(DeviationMatrix::build(&store, self.config.max_items_per_user))
        };

        let mut published = self.deviations.write().await;
        if matrix.generation() >= published.generation() {
            *published = matrix;
        } else {
            tracing::debug!(
                built = matrix.generation(),
                published = published.generation(),
                "Discarding deviation matrix older than the published one"
            );
        }
    }

    /// The currently published deviation matrix
    pub async fn deviation_snapshot(&self) -> Arc<DeviationMatrix> {
        self.deviations.read().await.clone()
    }

    /// Whether the published matrix lags behind recorded interactions
    pub async fn is_stale(&self) -> bool {
        let generation = self.store.read().await.generation();
        self.deviation_snapshot().await.generation() < generation
    }

    pub async fn affinity(&self, user_id: &UserId, item_id: &ItemId) -> Option<f64> {
        self.store.read().await.affinity(user_id, item_id)
    }

    pub async fn rated_items(&self, user_id: &UserId) -> BTreeSet<ItemId> {
        self.store.read().await.rated_items(user_id)
    }

    /// Collaborative estimate for one candidate, `None` without support
    pub async fn predict(&self, user_id: &UserId, item_id: &ItemId) -> Option<Prediction> {
        let store = self.store.read().await;
        let deviations = self.deviation_snapshot().await;
        Predictor::new(&store, &deviations).predict(user_id, item_id)
    }

    /// Ranks `catalog` for `user`, returning at most `top_n` unseen items
    pub async fn recommend(
        &self,
        user: &UserProfile,
        catalog: &[Item],
        top_n: usize,
    ) -> RankResult<Vec<Recommendation>> {
        let store = self.store.read().await;
        let deviations = self.deviation_snapshot().await;
        Recommender::new(&store, &deviations, &self.config).recommend(user, catalog, top_n)
    }

    /// Predicted affinity for every catalog item (see [`Recommender::score_catalog`])
    pub async fn score_catalog(
        &self,
        user: &UserProfile,
        catalog: &[Item],
    ) -> BTreeMap<ItemId, f64> {
        let store = self.store.read().await;
        let deviations = self.deviation_snapshot().await;
        Recommender::new(&store, &deviations, &self.config).score_catalog(user, catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rating(user: &str, item: &str, value: f64) -> Interaction {
        Interaction::rating(UserId::from(user), ItemId::from(item), value, Utc::now())
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            affinity_min: 1.0,
            affinity_max: 1.0,
            ..Config::default()
        };
        assert!(Engine::new(config).is_err());
    }

    #[test]
    fn test_record_rebuilds_by_default() {
        let engine = Engine::new(Config::default()).unwrap();
        tokio_test::block_on(engine.record(rating("u1", "A", 4.0)));
        tokio_test::block_on(engine.record(rating("u1", "B", 2.0)));

        assert!(!tokio_test::block_on(engine.is_stale()));
        let matrix = tokio_test::block_on(engine.deviation_snapshot());
        assert_eq!(matrix.generation(), 2);
        assert!(matrix
            .deviation(&ItemId::from("A"), &ItemId::from("B"))
            .is_some());
    }

    #[test]
    fn test_manual_policy_waits_for_rebuild() {
        let config = Config {
            rebuild_policy: RebuildPolicy::Manual,
            ..Config::default()
        };
        let engine = Engine::new(config).unwrap();
        tokio_test::block_on(engine.record(rating("u1", "A", 4.0)));
        tokio_test::block_on(engine.record(rating("u1", "B", 2.0)));

        assert!(tokio_test::block_on(engine.is_stale()));
        let before = tokio_test::block_on(engine.deviation_snapshot());
        assert!(before.is_empty());

        tokio_test::block_on(engine.rebuild_deviation_matrix());
        assert!(!tokio_test::block_on(engine.is_stale()));

        // The snapshot taken earlier is untouched by the swap
        assert!(before.is_empty());
        assert_eq!(before.generation(), 0);
    }

    #[test]
    fn test_record_batch_counts() {
        let engine = Engine::new(Config::default()).unwrap();
        let recorded = tokio_test::block_on(engine.record_batch(vec![
            rating("u1", "A", 4.0),
            rating("u1", "B", 2.0),
            rating("u2", "A", 5.0),
        ]));
        assert_eq!(recorded, 3);
        assert_eq!(
            tokio_test::block_on(engine.rated_items(&UserId::from("u1"))).len(),
            2
        );
        assert_eq!(
            tokio_test::block_on(engine.affinity(&UserId::from("u2"), &ItemId::from("A"))),
            Some(5.0)
        );
    }

    #[test]
    fn test_with_store_builds_initial_matrix() {
        let mut store = RatingStore::default();
        store.record(rating("u1", "A", 4.0));
        store.record(rating("u1", "B", 2.0));

        let engine = Engine::with_store(Config::default(), store).unwrap();
        let prediction =
            tokio_test::block_on(engine.predict(&UserId::from("u1"), &ItemId::from("A")));
        // u1 rated both, prediction still derives from the other item
        assert_eq!(prediction.map(|p| p.score), Some(4.0));
    }
}
