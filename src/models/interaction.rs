use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ItemId, UserId};

/// Kind of engagement a user had with an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    View,
    Like,
    Share,
    Dismiss,
    ExplicitRating,
}

/// An immutable engagement fact delivered by the ingestion collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub kind: InteractionKind,
    /// Multiplier for weighted kinds, or the rating itself for explicit ratings
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub timestamp: DateTime<Utc>,
}

fn default_weight() -> f64 {
    1.0
}

impl Interaction {
    /// Creates an interaction with the default weight of 1.0
    pub fn new(
        user_id: UserId,
        item_id: ItemId,
        kind: InteractionKind,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            item_id,
            kind,
            weight: default_weight(),
            timestamp,
        }
    }

    /// Creates an explicit rating interaction
    pub fn rating(user_id: UserId, item_id: ItemId, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_id,
            item_id,
            kind: InteractionKind::ExplicitRating,
            weight: value,
            timestamp,
        }
    }
}

/// Per-kind affinity contribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionWeights {
    pub view: f64,
    pub like: f64,
    pub share: f64,
    pub dismiss: f64,
}

impl Default for InteractionWeights {
    fn default() -> Self {
        Self {
            view: 1.0,
            like: 3.0,
            share: 4.0,
            dismiss: -2.0,
        }
    }
}

impl InteractionWeights {
    /// Affinity contribution of a single interaction
    pub fn contribution(&self, interaction: &Interaction) -> f64 {
        let kind_weight = match interaction.kind {
            InteractionKind::View => self.view,
            InteractionKind::Like => self.like,
            InteractionKind::Share => self.share,
            InteractionKind::Dismiss => self.dismiss,
            InteractionKind::ExplicitRating => return interaction.weight,
        };
        kind_weight * interaction.weight
    }
}
