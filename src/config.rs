use serde::Deserialize;

use crate::{
    error::{RankError, RankResult},
    models::InteractionWeights,
};

/// When the deviation matrix is recomputed
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RebuildPolicy {
    /// Rebuild after every recorded interaction
    OnRecord,
    /// Rebuild only on an explicit `rebuild_deviation_matrix` call
    Manual,
}

/// Engine configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Minimum co-rating support before a collaborative score is trusted
    #[serde(default = "default_min_support")]
    pub min_support: u32,

    /// Fail with `UnknownUser` when the user has no interactions
    #[serde(default)]
    pub strict_unknown_user: bool,

    /// Lower affinity clamp
    #[serde(default = "default_affinity_min")]
    pub affinity_min: f64,

    /// Upper affinity clamp
    #[serde(default = "default_affinity_max")]
    pub affinity_max: f64,

    #[serde(default = "default_view_weight")]
    pub view_weight: f64,

    #[serde(default = "default_like_weight")]
    pub like_weight: f64,

    #[serde(default = "default_share_weight")]
    pub share_weight: f64,

    #[serde(default = "default_dismiss_weight")]
    pub dismiss_weight: f64,

    /// Number of top rated items whose categories stand in for empty interests
    #[serde(default = "default_fallback_top_k")]
    pub fallback_top_k: usize,

    /// Per-user cap on items taking part in a deviation build (most recent first)
    #[serde(default)]
    pub max_items_per_user: Option<usize>,

    /// Score given to catalog items with no signal in a full catalog profile
    #[serde(default = "default_unrated_score")]
    pub unrated_score: f64,

    /// Recommendations returned when the caller does not ask for a count
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    #[serde(default = "default_rebuild_policy")]
    pub rebuild_policy: RebuildPolicy,

    /// JSON snapshot read by the binary
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

fn default_min_support() -> u32 {
    1
}

fn default_affinity_min() -> f64 {
    -5.0
}

fn default_affinity_max() -> f64 {
    5.0
}

fn default_view_weight() -> f64 {
    InteractionWeights::default().view
}

fn default_like_weight() -> f64 {
    InteractionWeights::default().like
}

fn default_share_weight() -> f64 {
    InteractionWeights::default().share
}

fn default_dismiss_weight() -> f64 {
    InteractionWeights::default().dismiss
}

fn default_fallback_top_k() -> usize {
    3
}

fn default_unrated_score() -> f64 {
    -1.0
}

fn default_top_n() -> usize {
    10
}

fn default_rebuild_policy() -> RebuildPolicy {
    RebuildPolicy::OnRecord
}

fn default_snapshot_path() -> String {
    "data/snapshot.json".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_support: default_min_support(),
            strict_unknown_user: false,
            affinity_min: default_affinity_min(),
            affinity_max: default_affinity_max(),
            view_weight: default_view_weight(),
            like_weight: default_like_weight(),
            share_weight: default_share_weight(),
            dismiss_weight: default_dismiss_weight(),
            fallback_top_k: default_fallback_top_k(),
            max_items_per_user: None,
            unrated_score: default_unrated_score(),
            default_top_n: default_top_n(),
            rebuild_policy: default_rebuild_policy(),
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects bounds and weights the engine cannot work with
    pub fn validate(&self) -> RankResult<()> {
        if !self.affinity_min.is_finite() || !self.affinity_max.is_finite() {
            return Err(RankError::InvalidConfig(
                "affinity bounds must be finite".to_string(),
            ));
        }
        if self.affinity_min >= self.affinity_max {
            return Err(RankError::InvalidConfig(format!(
                "affinity_min ({}) must be below affinity_max ({})",
                self.affinity_min, self.affinity_max
            )));
        }
        let weights = self.interaction_weights();
        if [weights.view, weights.like, weights.share, weights.dismiss]
            .iter()
            .any(|w| !w.is_finite())
        {
            return Err(RankError::InvalidConfig(
                "interaction weights must be finite".to_string(),
            ));
        }
        if self.max_items_per_user == Some(0) {
            return Err(RankError::InvalidConfig(
                "max_items_per_user must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn interaction_weights(&self) -> InteractionWeights {
        InteractionWeights {
            view: self.view_weight,
            like: self.like_weight,
            share: self.share_weight,
            dismiss: self.dismiss_weight,
        }
    }

    pub fn affinity_bounds(&self) -> (f64, f64) {
        (self.affinity_min, self.affinity_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.affinity_bounds(), (-5.0, 5.0));
        assert_eq!(config.min_support, 1);
        assert_eq!(config.rebuild_policy, RebuildPolicy::OnRecord);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let config = Config {
            affinity_min: 5.0,
            affinity_max: -5.0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(RankError::InvalidConfig(_))));
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        let config = Config {
            like_weight: f64::NAN,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(RankError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_item_cap_rejected() {
        let config = Config {
            max_items_per_user: Some(0),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_from_env_pairs() {
        let vars = vec![
            ("MIN_SUPPORT".to_string(), "3".to_string()),
            ("STRICT_UNKNOWN_USER".to_string(), "true".to_string()),
            ("REBUILD_POLICY".to_string(), "manual".to_string()),
            ("MAX_ITEMS_PER_USER".to_string(), "50".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.min_support, 3);
        assert!(config.strict_unknown_user);
        assert_eq!(config.rebuild_policy, RebuildPolicy::Manual);
        assert_eq!(config.max_items_per_user, Some(50));
        assert_eq!(config.like_weight, 3.0);
    }
}
