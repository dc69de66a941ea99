use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::UserId;

/// The requesting user as supplied by the user directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    /// Declared interest categories (may be empty)
    #[serde(default)]
    pub interests: BTreeSet<String>,
}

impl UserProfile {
    /// Creates a profile with no declared interests
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            interests: BTreeSet::new(),
        }
    }

    /// Adds a declared interest category
    pub fn add_interest(&mut self, category: impl Into<String>) {
        self.interests.insert(category.into());
    }

    /// Builder-style variant of [`add_interest`](Self::add_interest)
    pub fn with_interests<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for category in categories {
            self.add_interest(category);
        }
        self
    }

    pub fn has_declared_interests(&self) -> bool {
        !self.interests.is_empty()
    }
}
