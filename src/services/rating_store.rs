use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    config::Config,
    models::{Interaction, InteractionWeights, ItemId, UserId},
};

/// Accumulated affinity of one user for one item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    /// `sum` clamped into the store bounds
    pub affinity: f64,
    pub last_interaction: DateTime<Utc>,
    sum: f64,
}

impl Rating {
    /// Unclamped sum of every contribution
    pub fn sum(&self) -> f64 {
        self.sum
    }
}

/// Sparse user → item affinity matrix built from interaction facts
///
/// Each pair keeps the plain sum of its contributions and exposes it clamped
/// into the configured bounds, so one chatty user cannot push an entry past
/// the limits and the result does not depend on the order facts arrive in.
/// Ordered maps keep every traversal deterministic.
#[derive(Debug, Clone)]
pub struct RatingStore {
    weights: InteractionWeights,
    bounds: (f64, f64),
    ratings: BTreeMap<UserId, BTreeMap<ItemId, Rating>>,
    generation: u64,
}

impl RatingStore {
    /// Creates an empty store
    pub fn new(weights: InteractionWeights, bounds: (f64, f64)) -> Self {
        Self {
            weights,
            bounds,
            ratings: BTreeMap::new(),
            generation: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.interaction_weights(), config.affinity_bounds())
    }

    /// Re-derives the matrix from a full interaction history
    ///
    /// Interactions are applied in timestamp order (stable for equal
    /// timestamps), the same order `record_batch` uses.
    pub fn from_history(
        interactions: impl IntoIterator<Item = Interaction>,
        weights: InteractionWeights,
        bounds: (f64, f64),
    ) -> Self {
        let mut store = Self::new(weights, bounds);
        store.record_batch(interactions.into_iter().collect());
        store
    }

    /// Records a batch in timestamp order
    ///
    /// Sorting keeps floating-point summation identical to a replay of the
    /// same facts, whatever order they were delivered in.
    pub fn record_batch(&mut self, mut interactions: Vec<Interaction>) {
        interactions.sort_by_key(|i| i.timestamp);
        for interaction in interactions {
            self.record(interaction);
        }
    }

    /// Folds an interaction into the (user, item) affinity
    ///
    /// Identifiers are opaque and never validated here. Contributions that are
    /// not finite are dropped.
    pub fn record(&mut self, interaction: Interaction) {
        let contribution = self.weights.contribution(&interaction);
        if !contribution.is_finite() {
            tracing::warn!(
                user_id = %interaction.user_id,
                item_id = %interaction.item_id,
                kind = ?interaction.kind,
                "Dropping interaction with non-finite contribution"
            );
            return;
        }

        let (min, max) = self.bounds;
        let rating = self
            .ratings
            .entry(interaction.user_id.clone())
            .or_default()
            .entry(interaction.item_id.clone())
            .or_insert(Rating {
                affinity: 0.0,
                last_interaction: interaction.timestamp,
                sum: 0.0,
            });

        rating.sum += contribution;
        rating.affinity = rating.sum.clamp(min, max);
        rating.last_interaction = rating.last_interaction.max(interaction.timestamp);

        tracing::debug!(
            user_id = %interaction.user_id,
            item_id = %interaction.item_id,
            contribution,
            affinity = rating.affinity,
            "Recorded interaction"
        );

        self.generation += 1;
    }

    /// Current affinity, or `None` when the pair has no signal
    pub fn affinity(&self, user_id: &UserId, item_id: &ItemId) -> Option<f64> {
        self.ratings
            .get(user_id)
            .and_then(|items| items.get(item_id))
            .map(|r| r.affinity)
    }

    /// Items the user has interacted with in any way
    pub fn rated_items(&self, user_id: &UserId) -> BTreeSet<ItemId> {
        self.ratings
            .get(user_id)
            .map(|items| items.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn user_ratings(&self, user_id: &UserId) -> Option<&BTreeMap<ItemId, Rating>> {
        self.ratings.get(user_id)
    }

    pub fn has_interactions(&self, user_id: &UserId) -> bool {
        self.ratings.contains_key(user_id)
    }

    /// All users with at least one interaction, in id order
    pub fn users(&self) -> impl Iterator<Item = (&UserId, &BTreeMap<ItemId, Rating>)> {
        self.ratings.iter()
    }

    /// The user's `limit` most recently touched items with their affinity
    ///
    /// Ties on timestamp fall back to item id order.
    pub fn recent_ratings(&self, user_id: &UserId, limit: usize) -> Vec<(&ItemId, f64)> {
        let Some(items) = self.ratings.get(user_id) else {
            return Vec::new();
        };

        let mut recent: Vec<(&ItemId, &Rating)> = items.iter().collect();
        recent.sort_by(|(a_id, a), (b_id, b)| {
            b.last_interaction
                .cmp(&a.last_interaction)
                .then_with(|| a_id.cmp(b_id))
        });
        recent
            .into_iter()
            .take(limit)
            .map(|(id, r)| (id, r.affinity))
            .collect()
    }

    /// Monotonic counter bumped by every applied `record`, which is also the
    /// number of interactions folded in
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn bounds(&self) -> (f64, f64) {
        self.bounds
    }
}

impl Default for RatingStore {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
