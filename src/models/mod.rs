use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod interaction;
pub mod item;
pub mod user_profile;

pub use interaction::{Interaction, InteractionKind, InteractionWeights};
pub use item::Item;
pub use user_profile::UserProfile;

/// Opaque user identifier supplied by the user directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Opaque content item identifier supplied by the catalog
///
/// Ordering is byte-wise on the underlying string and is used as the
/// deterministic tie-break when ranking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId(id.to_string())
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId(id.to_string())
    }
}

/// Where a recommendation's score came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ScoreSource {
    /// Slope-one prediction backed by `support` co-rating users
    Collaborative { support: u32 },
    /// Category-overlap fallback
    Content,
}

/// A single ranked entry returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub score: f64,
    #[serde(flatten)]
    pub source: ScoreSource,
}
