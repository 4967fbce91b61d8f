// ============================================
// Profile Aggregator
// ============================================
//
// Folds interaction events into per-user style profiles.
//
// Centroid update (per event, in log order):
//   centroid' = normalize(centroid * decay + sign * v * (1 - decay))
//
// Vibe affinity update (per tag present on the event snapshot):
//   affinity' = clamp(affinity * decay + sign * strength * (1 - decay), 0, 1)
//
// sign: like +1.0, favorite +favorite_weight, skip -skip_damping,
// remove -remove_weight.
//
// Profiles are derived state. The interaction log stays authoritative;
// rebuild() discards the stored profile and replays the log from cold.

use dashmap::DashMap;
use ndarray::Array1;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::LearningConfig;
use crate::error::{EngineError, Result};
use crate::models::{InteractionEvent, StyleProfile};
use crate::utils::{is_valid_embedding, l2_normalize};

/// Per-user profile store with the event fold.
pub struct ProfileAggregator {
    profiles: DashMap<Uuid, StyleProfile>,
    config: LearningConfig,
}

impl ProfileAggregator {
    pub fn new(config: LearningConfig) -> Self {
        Self {
            profiles: DashMap::new(),
            config,
        }
    }

    /// Fold one event into the user's profile. The update runs under the
    /// profile's map entry lock; callers serialize folds per user so
    /// events arrive in log order.
    pub fn fold(&self, user_id: Uuid, event: &InteractionEvent) -> Result<StyleProfile> {
        let mut entry = self
            .profiles
            .entry(user_id)
            .or_insert_with(|| StyleProfile::cold(user_id, self.config.embedding_dim));

        self.apply_event(entry.value_mut(), event)?;

        debug!(
            user_id = %user_id,
            sequence = event.sequence,
            kind = event.kind.as_str(),
            event_count = entry.event_count,
            "Folded decision into profile"
        );

        Ok(entry.clone())
    }

    /// Atomic copy-on-read snapshot. Never blocks on a pending fold for
    /// another user; may briefly block on a fold for the same user.
    pub fn snapshot(&self, user_id: Uuid) -> Option<StyleProfile> {
        self.profiles.get(&user_id).map(|entry| entry.clone())
    }

    /// Seed the in-memory state from an externally persisted snapshot.
    pub fn insert_snapshot(&self, profile: StyleProfile) {
        self.profiles.insert(profile.user_id, profile);
    }

    /// Replay the full event stream from cold and atomically replace the
    /// stored profile. Events that fail the embedding sanity check are
    /// skipped and counted; the sequence cursor still advances past them
    /// so the rest of the stream folds cleanly.
    ///
    /// Returns the rebuilt profile and the number of skipped events.
    pub fn rebuild(
        &self,
        user_id: Uuid,
        events: &[InteractionEvent],
    ) -> Result<(StyleProfile, usize)> {
        let mut profile = StyleProfile::cold(user_id, self.config.embedding_dim);
        let mut skipped = 0usize;

        for event in events {
            if !is_valid_embedding(&event.embedding, self.config.embedding_dim) {
                warn!(
                    user_id = %user_id,
                    item_id = %event.item_id,
                    sequence = event.sequence,
                    "Skipping event with invalid embedding during rebuild"
                );
                skipped += 1;
                profile.last_sequence = event.sequence;
                continue;
            }
            self.apply_event(&mut profile, event)?;
        }

        self.profiles.insert(user_id, profile.clone());

        info!(
            user_id = %user_id,
            event_count = profile.event_count,
            skipped = skipped,
            "Profile rebuilt from log"
        );

        Ok((profile, skipped))
    }

    /// The fold itself. Validates before touching the profile, so a
    /// rejected event leaves it unchanged.
    fn apply_event(&self, profile: &mut StyleProfile, event: &InteractionEvent) -> Result<()> {
        if !is_valid_embedding(&event.embedding, self.config.embedding_dim) {
            return Err(EngineError::InvalidEmbedding(format!(
                "expected {} finite dims, got {}",
                self.config.embedding_dim,
                event.embedding.len()
            )));
        }
        if event.sequence != profile.last_sequence + 1 {
            return Err(EngineError::ProfileConflict(format!(
                "expected sequence {} but got {}",
                profile.last_sequence + 1,
                event.sequence
            )));
        }

        let sign = event.kind.signal_weight(&self.config);
        let decay = self.config.decay;

        let mut v = Array1::from_vec(event.embedding.clone());
        l2_normalize(&mut v);

        let mut centroid = Array1::from_vec(profile.centroid.clone());
        centroid = &centroid * decay + &v * (sign * (1.0 - decay));
        l2_normalize(&mut centroid);
        profile.centroid = centroid.to_vec();

        for (tag, strength) in &event.vibes {
            if !strength.is_finite() {
                continue;
            }
            let current = profile.vibe_affinity.get(tag).copied().unwrap_or(0.0);
            let next = (current * decay + sign * strength * (1.0 - decay)).clamp(0.0, 1.0);
            profile.vibe_affinity.insert(tag.clone(), next);
        }

        profile.event_count += 1;
        profile.last_sequence = event.sequence;
        profile.updated_at = event.recorded_at;

        Ok(())
    }
}
