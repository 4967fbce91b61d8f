use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::LearningConfig;

/// Moderation and trust flags on a wardrobe item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemFlags {
    /// Item deliberately outside the user's usual style envelope.
    pub unorthodox: bool,
    /// Tagging pipeline output confirmed or corrected by the user.
    pub user_verified: bool,
}

/// A single garment as seen by the engine. Items are written by the external
/// tagging pipeline and read-only here; the engine never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardrobeItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: String,
    pub subcategory: Option<String>,
    /// Dense style embedding. `None` until the analysis pipeline has
    /// processed the item; such items are invisible to selection.
    pub embedding: Option<Vec<f64>>,
    /// Sparse vibe tags with strengths in [0, 1]. Absent tag = 0.
    pub vibes: HashMap<String, f64>,
    pub flags: ItemFlags,
}

impl WardrobeItem {
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}

/// User decision on a presented item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DecisionKind {
    Like,
    Skip,
    Favorite,
    Remove,
}

impl DecisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::Like => "like",
            DecisionKind::Skip => "skip",
            DecisionKind::Favorite => "favorite",
            DecisionKind::Remove => "remove",
        }
    }

    /// Signed learning weight applied to the profile fold. Positive pulls
    /// the centroid toward the item, negative pushes it away.
    pub fn signal_weight(&self, config: &LearningConfig) -> f64 {
        match self {
            DecisionKind::Like => 1.0,
            DecisionKind::Favorite => config.favorite_weight,
            DecisionKind::Skip => -config.skip_damping,
            DecisionKind::Remove => -config.remove_weight,
        }
    }
}

/// One recorded decision, as stored in the interaction log.
///
/// The embedding and vibe tags are snapshotted at decision time so that a
/// later edit or delete of the item never changes what a replay computes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub kind: DecisionKind,
    /// Per-user log position, 1-based. 0 = not yet assigned by the log.
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    /// Unit-normalized embedding snapshot captured at decision time.
    pub embedding: Vec<f64>,
    /// Vibe tag snapshot captured at decision time.
    pub vibes: HashMap<String, f64>,
}

impl InteractionEvent {
    pub fn new(
        user_id: Uuid,
        item_id: Uuid,
        kind: DecisionKind,
        embedding: Vec<f64>,
        vibes: HashMap<String, f64>,
    ) -> Self {
        Self {
            user_id,
            item_id,
            kind,
            sequence: 0, // Will be set by the interaction log
            recorded_at: Utc::now(),
            embedding,
            vibes,
        }
    }
}

/// Evolving per-user style profile. Fully derived state: it can always be
/// discarded and rebuilt by replaying the interaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleProfile {
    pub user_id: Uuid,
    /// Unit-norm style centroid, or the zero vector before any fold.
    pub centroid: Vec<f64>,
    /// Per-tag affinity, each value clamped to [0, 1].
    pub vibe_affinity: HashMap<String, f64>,
    /// Number of events folded into this profile.
    pub event_count: u64,
    /// Log sequence of the last folded event; 0 = nothing folded.
    pub last_sequence: u64,
    pub updated_at: DateTime<Utc>,
}

impl StyleProfile {
    /// Profile with no learned signal yet.
    pub fn cold(user_id: Uuid, embedding_dim: usize) -> Self {
        Self {
            user_id,
            centroid: vec![0.0; embedding_dim],
            vibe_affinity: HashMap::new(),
            event_count: 0,
            last_sequence: 0,
            updated_at: Utc::now(),
        }
    }

    /// A cold profile carries no signal; ranking falls back to the
    /// selector's shuffled order.
    pub fn is_cold(&self) -> bool {
        self.event_count == 0
    }
}

/// Where a ranked item's position came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RankSource {
    /// Scored against the style profile.
    Personalized,
    /// Reserved exploration slot, drawn regardless of score.
    Exploration,
    /// Cold profile; selector order passed through unscored.
    ColdStart,
}

impl RankSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankSource::Personalized => "personalized",
            RankSource::Exploration => "exploration",
            RankSource::ColdStart => "cold_start",
        }
    }
}

/// An item in its final surfaced position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedItem {
    pub item: WardrobeItem,
    /// Blended relevance score; 0 for cold-start passthrough.
    pub score: f64,
    pub source: RankSource,
}

/// Counters for one pool selection pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionStats {
    pub eligible_count: usize,
    pub session_excluded: usize,
    pub cooldown_excluded: usize,
    pub pool_size: usize,
}
