use std::collections::HashMap;

use crate::models::ItemId;

use super::rating_store::RatingStore;

/// Average signed affinity difference between two items and the number of
/// users who rated both
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deviation {
    pub average: f64,
    pub count: u32,
}

/// Immutable slope-one deviation snapshot
///
/// Only pairs with at least one co-rater are stored; an absent pair means
/// "no data" and is distinct from a zero deviation.
#[derive(Debug, Clone, Default)]
pub struct DeviationMatrix {
    entries: HashMap<ItemId, HashMap<ItemId, Deviation>>,
    generation: u64,
}

impl DeviationMatrix {
    /// An empty matrix at generation zero
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the matrix from a full rating store snapshot
    ///
    /// Work is O(Σ k_u²) over users. `max_items_per_user` caps k_u to each
    /// user's most recently touched items.
    pub fn build(store: &RatingStore, max_items_per_user: Option<usize>) -> Self {
        let mut sums: HashMap<ItemId, HashMap<ItemId, (f64, u32)>> = HashMap::new();
        let mut truncated_users = 0usize;

        for (user_id, items) in store.users() {
            let rated: Vec<(&ItemId, f64)> = match max_items_per_user {
                Some(limit) if items.len() > limit => {
                    truncated_users += 1;
                    tracing::debug!(
                        user_id = %user_id,
                        rated = items.len(),
                        limit,
                        "Limiting user to most recent items for deviation build"
                    );
                    store.recent_ratings(user_id, limit)
                }
                _ => items.iter().map(|(id, r)| (id, r.affinity)).collect(),
            };

            for (i, (a, rating_a)) in rated.iter().enumerate() {
                for (b, rating_b) in rated.iter().skip(i + 1) {
                    let diff = rating_a - rating_b;
                    accumulate(&mut sums, a, b, diff);
                    accumulate(&mut sums, b, a, -diff);
                }
            }
        }

        let entries: HashMap<ItemId, HashMap<ItemId, Deviation>> = sums
            .into_iter()
            .map(|(a, row)| {
                let row = row
                    .into_iter()
                    .map(|(b, (sum, count))| {
                        (
                            b,
                            Deviation {
                                average: sum / count as f64,
                                count,
                            },
                        )
                    })
                    .collect();
                (a, row)
            })
            .collect();

        let matrix = Self {
            entries,
            generation: store.generation(),
        };

        tracing::info!(
            generation = matrix.generation,
            items = matrix.entries.len(),
            pairs = matrix.pair_count(),
            truncated_users,
            "Deviation matrix built"
        );

        matrix
    }

    /// Deviation of `a` relative to `b`, if any user rated both
    pub fn deviation(&self, a: &ItemId, b: &ItemId) -> Option<Deviation> {
        self.entries.get(a).and_then(|row| row.get(b)).copied()
    }

    /// Number of stored ordered pairs
    pub fn pair_count(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rating store generation this snapshot reflects
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn accumulate(
    sums: &mut HashMap<ItemId, HashMap<ItemId, (f64, u32)>>,
    a: &ItemId,
    b: &ItemId,
    diff: f64,
) {
    let entry = sums
        .entry(a.clone())
        .or_default()
        .entry(b.clone())
        .or_insert((0.0, 0));
    entry.0 += diff;
    entry.1 += 1;
}
