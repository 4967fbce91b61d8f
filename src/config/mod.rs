use serde::Deserialize;

use crate::error::{EngineError, Result};

/// Engine configuration, grouped by concern. Every field has a default and
/// can be overridden through `STYLE_`-prefixed environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub learning: LearningConfig,
    pub selection: SelectionConfig,
    pub ranking: RankingConfig,
}

/// Profile fold parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct LearningConfig {
    /// Expected embedding dimensionality. The analysis pipeline contract
    /// is 512; tests shrink this.
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// EMA retention factor. Closer to 1.0 = slower drift.
    #[serde(default = "default_decay")]
    pub decay: f64,

    /// Magnitude of the negative signal from a skip. Skips are weaker
    /// evidence than likes: a skip can mean wrong mood, not wrong style.
    #[serde(default = "default_skip_damping")]
    pub skip_damping: f64,

    /// Positive weight for a favorite, relative to a like's 1.0.
    #[serde(default = "default_favorite_weight")]
    pub favorite_weight: f64,

    /// Magnitude of the negative signal from removing an item.
    #[serde(default = "default_remove_weight")]
    pub remove_weight: f64,
}

/// Candidate pool selection parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
    /// Seconds a decided item stays out of the pool.
    #[serde(default = "default_cool_down_secs")]
    pub cool_down_secs: u64,

    /// Fixed RNG seed for reproducible shuffles. None = entropy-seeded.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

/// Ranking and exploration parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    /// Blend weight of embedding similarity vs vibe affinity.
    #[serde(default = "default_embedding_weight")]
    pub embedding_weight: f64,

    /// Fraction of output slots reserved for exploration picks.
    #[serde(default = "default_exploration_fraction")]
    pub exploration_fraction: f64,
}

// Default value functions
fn default_embedding_dim() -> usize {
    512
}

fn default_decay() -> f64 {
    0.9
}

fn default_skip_damping() -> f64 {
    0.3
}

fn default_favorite_weight() -> f64 {
    1.5
}

fn default_remove_weight() -> f64 {
    1.0
}

fn default_cool_down_secs() -> u64 {
    86400 // 24 hours
}

fn default_embedding_weight() -> f64 {
    0.7
}

fn default_exploration_fraction() -> f64 {
    0.1
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            embedding_dim: default_embedding_dim(),
            decay: default_decay(),
            skip_damping: default_skip_damping(),
            favorite_weight: default_favorite_weight(),
            remove_weight: default_remove_weight(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            cool_down_secs: default_cool_down_secs(),
            rng_seed: None,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            embedding_weight: default_embedding_weight(),
            exploration_fraction: default_exploration_fraction(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            learning: LearningConfig::default(),
            selection: SelectionConfig::default(),
            ranking: RankingConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> std::result::Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        Ok(EngineConfig {
            learning: envy::prefixed("STYLE_").from_env::<LearningConfig>()?,
            selection: envy::prefixed("STYLE_").from_env::<SelectionConfig>()?,
            ranking: envy::prefixed("STYLE_").from_env::<RankingConfig>()?,
        })
    }

    /// Reject parameter combinations the fold and ranker math cannot
    /// handle. Called once at engine construction.
    pub fn validate(&self) -> Result<()> {
        if self.learning.embedding_dim == 0 {
            return Err(EngineError::InvalidConfig(
                "embedding_dim must be at least 1".to_string(),
            ));
        }
        if self.learning.decay <= 0.0 || self.learning.decay >= 1.0 {
            return Err(EngineError::InvalidConfig(format!(
                "decay must be in (0, 1) (got {})",
                self.learning.decay
            )));
        }
        if self.learning.skip_damping <= 0.0 || self.learning.skip_damping >= 1.0 {
            return Err(EngineError::InvalidConfig(format!(
                "skip_damping must be in (0, 1) (got {})",
                self.learning.skip_damping
            )));
        }
        if self.learning.favorite_weight <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "favorite_weight must be positive (got {})",
                self.learning.favorite_weight
            )));
        }
        if self.learning.remove_weight <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "remove_weight must be positive (got {})",
                self.learning.remove_weight
            )));
        }
        if !(0.0..=1.0).contains(&self.ranking.embedding_weight) {
            return Err(EngineError::InvalidConfig(format!(
                "embedding_weight must be in [0, 1] (got {})",
                self.ranking.embedding_weight
            )));
        }
        if !(0.0..1.0).contains(&self.ranking.exploration_fraction) {
            return Err(EngineError::InvalidConfig(format!(
                "exploration_fraction must be in [0, 1) (got {})",
                self.ranking.exploration_fraction
            )));
        }
        Ok(())
    }
}
