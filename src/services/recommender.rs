use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::{
    config::Config,
    error::{RankError, RankResult},
    models::{Item, ItemId, Recommendation, ScoreSource, UserProfile},
};

use super::{
    content::ContentScorer, deviation::DeviationMatrix, predictor::Predictor,
    rating_store::RatingStore,
};

/// Ranks unseen catalog items for a user against one consistent snapshot
pub struct Recommender<'a> {
    store: &'a RatingStore,
    deviations: &'a DeviationMatrix,
    config: &'a Config,
}

impl<'a> Recommender<'a> {
    pub fn new(
        store: &'a RatingStore,
        deviations: &'a DeviationMatrix,
        config: &'a Config,
    ) -> Self {
        Self {
            store,
            deviations,
            config,
        }
    }

    /// Returns up to `top_n` unseen items, best first
    ///
    /// Items the user already interacted with are never returned. A candidate
    /// uses its collaborative prediction when support reaches `min_support`
    /// and its content score otherwise. Ties break on ascending item id.
    pub fn recommend(
        &self,
        user: &UserProfile,
        catalog: &[Item],
        top_n: usize,
    ) -> RankResult<Vec<Recommendation>> {
        let has_history = self.store.has_interactions(&user.id);

        if !has_history {
            if self.config.strict_unknown_user {
                return Err(RankError::UnknownUser(user.id.clone()));
            }
            if !user.has_declared_interests() {
                tracing::debug!(user_id = %user.id, "No history or interests, nothing to rank");
                return Ok(Vec::new());
            }
        }

        if catalog.is_empty() || top_n == 0 {
            tracing::debug!(user_id = %user.id, top_n, "Empty catalog or zero top_n");
            return Ok(Vec::new());
        }

        let rated = self.store.rated_items(&user.id);
        let predictor = Predictor::new(self.store, self.deviations);
        let scorer = ContentScorer::for_user(user, self.store, catalog, self.config.fallback_top_k);
        let min_support = self.config.min_support.max(1);

        let mut seen: HashSet<&ItemId> = HashSet::new();
        let mut ranked: Vec<Recommendation> = Vec::new();
        let mut collaborative = 0usize;

        for item in catalog {
            if rated.contains(&item.id) || !seen.insert(&item.id) {
                continue;
            }

            let recommendation = match predictor.predict(&user.id, &item.id) {
                Some(prediction) if prediction.support >= min_support => {
                    collaborative += 1;
                    Recommendation {
                        item_id: item.id.clone(),
                        score: prediction.score,
                        source: ScoreSource::Collaborative {
                            support: prediction.support,
                        },
                    }
                }
                _ => Recommendation {
                    item_id: item.id.clone(),
                    score: scorer.score(item),
                    source: ScoreSource::Content,
                },
            };
            ranked.push(recommendation);
        }

        ranked.sort_by(rank_order);
        let candidates = ranked.len();
        ranked.truncate(top_n);

        tracing::debug!(
            user_id = %user.id,
            candidates,
            collaborative,
            returned = ranked.len(),
            interest_source = ?scorer.source(),
            "Ranked recommendations"
        );

        Ok(ranked)
    }

    /// Full predicted profile over the catalog
    ///
    /// Rated items keep their own affinity, items with enough collaborative
    /// support get their prediction, everything else gets `unrated_score`.
    pub fn score_catalog(&self, user: &UserProfile, catalog: &[Item]) -> BTreeMap<ItemId, f64> {
        let predictor = Predictor::new(self.store, self.deviations);
        let min_support = self.config.min_support.max(1);

        catalog
            .iter()
            .map(|item| {
                let score = match self.store.affinity(&user.id, &item.id) {
                    Some(affinity) => affinity,
                    None => predictor
                        .predict(&user.id, &item.id)
                        .filter(|p| p.support >= min_support)
                        .map(|p| p.score)
                        .unwrap_or(self.config.unrated_score),
                };
                (item.id.clone(), score)
            })
            .collect()
    }
}

/// Descending score, then ascending item id
fn rank_order(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.item_id.cmp(&b.item_id))
}
