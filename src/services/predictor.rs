use crate::models::{ItemId, UserId};

use super::{deviation::DeviationMatrix, rating_store::RatingStore};

/// Collaborative estimate of a user's affinity for an unseen item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub score: f64,
    /// Total co-rating count behind the estimate
    pub support: u32,
    /// Number of the user's rated items that had a deviation with the candidate
    pub contributors: u32,
}

/// Per-user weighted slope-one predictor
pub struct Predictor<'a> {
    store: &'a RatingStore,
    deviations: &'a DeviationMatrix,
}

impl<'a> Predictor<'a> {
    pub fn new(store: &'a RatingStore, deviations: &'a DeviationMatrix) -> Self {
        Self { store, deviations }
    }

    /// Estimates `user_id`'s affinity for `candidate`
    ///
    /// Every item j the user rated votes `(avgDiff[candidate][j] + rating(j))`
    /// weighted by the pair's co-rater count. Returns `None` when no rated item
    /// shares a co-rater with the candidate.
    pub fn predict(&self, user_id: &UserId, candidate: &ItemId) -> Option<Prediction> {
        let ratings = self.store.user_ratings(user_id)?;

        let mut weighted_sum = 0.0;
        let mut support: u32 = 0;
        let mut contributors: u32 = 0;

        for (item_id, rating) in ratings {
            if let Some(deviation) = self.deviations.deviation(candidate, item_id) {
                weighted_sum += (deviation.average + rating.affinity) * deviation.count as f64;
                support += deviation.count;
                contributors += 1;
            }
        }

        if support == 0 {
            return None;
        }

        Some(Prediction {
            score: weighted_sum / support as f64,
            support,
            contributors,
        })
    }
}
