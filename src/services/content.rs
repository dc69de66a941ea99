use std::collections::{BTreeSet, HashMap};

use crate::models::{Item, ItemId, UserProfile};

use super::rating_store::RatingStore;

/// Where the interest set used for content scoring came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestSource {
    Declared,
    /// Categories of the user's highest-affinity positively rated items
    Inferred,
    None,
}

/// Category-overlap scorer for one user
#[derive(Debug, Clone)]
pub struct ContentScorer {
    interests: BTreeSet<String>,
    source: InterestSource,
}

impl ContentScorer {
    /// Resolves the user's interest set
    ///
    /// Declared interests win. When there are none, the categories of the
    /// `top_k` highest-affinity items the user rated positively are used,
    /// looking categories up in `catalog` (items missing from it contribute
    /// nothing).
    pub fn for_user(
        profile: &UserProfile,
        store: &RatingStore,
        catalog: &[Item],
        top_k: usize,
    ) -> Self {
        if profile.has_declared_interests() {
            return Self {
                interests: profile.interests.clone(),
                source: InterestSource::Declared,
            };
        }

        let interests = inferred_interests(profile, store, catalog, top_k);
        let source = if interests.is_empty() {
            InterestSource::None
        } else {
            InterestSource::Inferred
        };

        Self { interests, source }
    }

    /// Scorer over an explicit interest set
    pub fn from_interests(interests: BTreeSet<String>) -> Self {
        let source = if interests.is_empty() {
            InterestSource::None
        } else {
            InterestSource::Declared
        };
        Self { interests, source }
    }

    /// Coverage of the user's interests by the item's categories, in [0, 1]
    pub fn score(&self, item: &Item) -> f64 {
        category_coverage(&self.interests, &item.categories)
    }

    pub fn interests(&self) -> &BTreeSet<String> {
        &self.interests
    }

    pub fn source(&self) -> InterestSource {
        self.source
    }

    pub fn has_interests(&self) -> bool {
        !self.interests.is_empty()
    }
}

/// `|interests ∩ categories| / |interests|`, or 0 with no interests
///
/// Asymmetric: measures how much of the user's interest set an item covers.
pub fn category_coverage(interests: &BTreeSet<String>, categories: &BTreeSet<String>) -> f64 {
    if interests.is_empty() {
        return 0.0;
    }
    let shared = interests.intersection(categories).count();
    shared as f64 / interests.len() as f64
}

fn inferred_interests(
    profile: &UserProfile,
    store: &RatingStore,
    catalog: &[Item],
    top_k: usize,
) -> BTreeSet<String> {
    let Some(ratings) = store.user_ratings(&profile.id) else {
        return BTreeSet::new();
    };

    let by_id: HashMap<&ItemId, &Item> = catalog.iter().map(|item| (&item.id, item)).collect();

    let mut liked: Vec<(&ItemId, f64)> = ratings
        .iter()
        .filter(|(_, rating)| rating.affinity > 0.0)
        .map(|(id, rating)| (id, rating.affinity))
        .collect();
    liked.sort_by(|(a_id, a), (b_id, b)| b.total_cmp(a).then_with(|| a_id.cmp(b_id)));

    let interests: BTreeSet<String> = liked
        .into_iter()
        .filter_map(|(id, _)| by_id.get(id).copied())
        .take(top_k)
        .flat_map(|item| item.categories.iter().cloned())
        .collect();

    tracing::debug!(
        user_id = %profile.id,
        interests = interests.len(),
        "Inferred interests from rated items"
    );

    interests
}
