// ============================================
// Recommendation Ranker
// ============================================
//
// Orders the selected pool by affinity to the user's style profile,
// then blends in exploration picks so the profile never locks the user
// into one corner of their wardrobe.
//
// Warm scoring:
//   score = w * cosine(centroid, embedding) + (1 - w) * vibe_dot
//
// Exploration: floor(n * fraction) output slots are drawn uniformly
// over the output positions; each takes a uniformly random remaining
// item regardless of score. A cold profile skips scoring entirely and
// passes the selector's shuffled order through.

use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

use crate::config::RankingConfig;
use crate::models::{RankSource, RankedItem, StyleProfile, WardrobeItem};
use crate::utils::{cosine_similarity, vibe_dot};

pub struct RecommendationRanker {
    config: RankingConfig,
}

impl RecommendationRanker {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    /// Rank a selected pool against the profile. The pool's order is the
    /// selector's shuffle; it survives only for a cold profile.
    pub fn rank(
        &self,
        pool: Vec<WardrobeItem>,
        profile: &StyleProfile,
        rng: &mut StdRng,
    ) -> Vec<RankedItem> {
        if pool.is_empty() {
            return Vec::new();
        }

        if profile.is_cold() {
            debug!(
                user_id = %profile.user_id,
                pool_size = pool.len(),
                "Cold profile, passing selector order through"
            );
            return pool
                .into_iter()
                .map(|item| RankedItem {
                    item,
                    score: 0.0,
                    source: RankSource::ColdStart,
                })
                .collect();
        }

        let centroid = ArrayView1::from(profile.centroid.as_slice());
        let mut scored: Vec<(WardrobeItem, f64)> = pool
            .into_iter()
            .map(|item| {
                let embed_sim = item
                    .embedding
                    .as_deref()
                    .map(|e| cosine_similarity(centroid, ArrayView1::from(e)))
                    .unwrap_or(0.0);
                let vibe_sim = vibe_dot(&item.vibes, &profile.vibe_affinity);
                let score = self.config.embedding_weight * embed_sim
                    + (1.0 - self.config.embedding_weight) * vibe_sim;
                (item, score)
            })
            .collect();

        // Descending score; ties fall back to item id so equal-scored
        // pools rank the same way on every replay.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });

        let n = scored.len();
        let slots = (n as f64 * self.config.exploration_fraction).floor() as usize;
        let exploration_slots: HashSet<usize> =
            rand::seq::index::sample(rng, n, slots).into_iter().collect();

        let mut ranked = Vec::with_capacity(n);
        for position in 0..n {
            if exploration_slots.contains(&position) {
                let pick = rng.gen_range(0..scored.len());
                let (item, score) = scored.remove(pick);
                ranked.push(RankedItem {
                    item,
                    score,
                    source: RankSource::Exploration,
                });
            } else {
                let (item, score) = scored.remove(0);
                ranked.push(RankedItem {
                    item,
                    score,
                    source: RankSource::Personalized,
                });
            }
        }

        debug!(
            user_id = %profile.user_id,
            pool_size = n,
            exploration_slots = slots,
            "Pool ranked"
        );

        ranked
    }
}
