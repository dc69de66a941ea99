use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{ItemId, UserId};

/// A content post in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Owning author or business
    pub author_id: UserId,
    #[serde(default)]
    pub categories: BTreeSet<String>,
}

impl Item {
    /// Creates an item with no categories
    pub fn new(id: ItemId, author_id: UserId) -> Self {
        Self {
            id,
            author_id,
            categories: BTreeSet::new(),
        }
    }

    /// Builder-style helper for tagging an item
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }
}
