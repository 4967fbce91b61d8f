// ============================================
// Style Engine
// ============================================
//
// Facade over the full pipeline: decisions flow in through
// record_decision (append to the log, fold into the profile), candidate
// pools flow out through next_candidate_pool (select, rank, mark shown).
//
// Concurrency contract: one writer per user. Appends and folds for a
// user are serialized behind a per-user mutex; reads take copy-on-read
// profile snapshots and never touch that lock. Distinct users never
// contend. The engine spawns no tasks and performs no I/O of its own;
// all storage sits behind the EmbeddingStore and InteractionLog traits.

use chrono::Utc;
use dashmap::DashMap;
use ndarray::Array1;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::models::{DecisionKind, InteractionEvent, RankedItem, StyleProfile};
use crate::services::{
    CandidateSelector, EmbeddingStore, InteractionLog, ProfileAggregator, RecommendationRanker,
    SessionRegistry,
};
use crate::utils::{is_valid_embedding, l2_normalize};

pub struct StyleEngine<S: EmbeddingStore, L: InteractionLog> {
    store: Arc<S>,
    log: Arc<L>,
    profiles: ProfileAggregator,
    sessions: SessionRegistry,
    selector: CandidateSelector,
    ranker: RecommendationRanker,
    /// Per-user write serialization for the append+fold section.
    write_locks: DashMap<Uuid, Arc<Mutex<()>>>,
    config: EngineConfig,
}

impl<S: EmbeddingStore, L: InteractionLog> StyleEngine<S, L> {
    pub fn new(store: Arc<S>, log: Arc<L>, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            store,
            log,
            profiles: ProfileAggregator::new(config.learning.clone()),
            sessions: SessionRegistry::new(),
            selector: CandidateSelector::new(config.selection.clone()),
            ranker: RecommendationRanker::new(config.ranking.clone()),
            write_locks: DashMap::new(),
            config,
        })
    }

    /// Build the next candidate pool for a presentation session.
    ///
    /// Fetches the eligible wardrobe and decision history, filters and
    /// shuffles them, ranks against the current profile snapshot, and
    /// marks the head of the returned pool as shown (the caller presents
    /// the top item). An empty pool is the session's terminal state and
    /// comes back as `PoolExhausted`.
    pub async fn next_candidate_pool(
        &self,
        user_id: Uuid,
        session_id: &str,
    ) -> Result<Vec<RankedItem>> {
        self.sessions
            .get_or_create(session_id, user_id, self.config.selection.rng_seed)?;

        let (eligible, events) = futures::try_join!(
            self.store.list_eligible(user_id),
            self.log.stream_for_user(user_id),
        )?;

        let shown = self.sessions.shown_items(session_id);
        let mut rng = self.sessions.fork_rng(session_id)?;
        let (pool, stats) = self
            .selector
            .select(eligible, &events, &shown, &mut rng, Utc::now());

        if pool.is_empty() {
            info!(
                user_id = %user_id,
                session_id = session_id,
                eligible = stats.eligible_count,
                session_excluded = stats.session_excluded,
                cooldown_excluded = stats.cooldown_excluded,
                "Candidate pool exhausted"
            );
            return Err(EngineError::PoolExhausted);
        }

        let profile = self
            .profiles
            .snapshot(user_id)
            .unwrap_or_else(|| StyleProfile::cold(user_id, self.config.learning.embedding_dim));
        let ranked = self.ranker.rank(pool, &profile, &mut rng);

        if let Some(head) = ranked.first() {
            self.sessions.mark_shown(session_id, head.item.id);
        }

        info!(
            user_id = %user_id,
            session_id = session_id,
            pool_size = ranked.len(),
            eligible = stats.eligible_count,
            cooldown_excluded = stats.cooldown_excluded,
            "Candidate pool ready"
        );

        Ok(ranked)
    }

    /// Record one decision: validate the item's embedding, snapshot it
    /// together with the vibe tags, append to the log, fold into the
    /// profile. Append and fold run under the user's write lock.
    pub async fn record_decision(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        kind: DecisionKind,
    ) -> Result<()> {
        let item = self.store.get_item(item_id).await?;

        let embedding = item.embedding.as_ref().ok_or_else(|| {
            EngineError::InvalidEmbedding(format!("item {} has not been analyzed yet", item_id))
        })?;
        if !is_valid_embedding(embedding, self.config.learning.embedding_dim) {
            return Err(EngineError::InvalidEmbedding(format!(
                "item {}: expected {} finite dims, got {}",
                item_id,
                self.config.learning.embedding_dim,
                embedding.len()
            )));
        }

        let mut snapshot = Array1::from_vec(embedding.clone());
        l2_normalize(&mut snapshot);
        let event =
            InteractionEvent::new(user_id, item_id, kind, snapshot.to_vec(), item.vibes.clone());

        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let stored = self.log.append(event).await?;
        let profile = self.profiles.fold(user_id, &stored)?;

        info!(
            user_id = %user_id,
            item_id = %item_id,
            kind = kind.as_str(),
            sequence = stored.sequence,
            event_count = profile.event_count,
            "Decision recorded"
        );

        Ok(())
    }

    /// Discard the in-memory profile and recompute it from the full log.
    /// Runs under the user's write lock so no fold interleaves with the
    /// replay.
    pub async fn rebuild_profile(&self, user_id: Uuid) -> Result<StyleProfile> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let events = self.log.stream_for_user(user_id).await?;
        let (profile, _skipped) = self.profiles.rebuild(user_id, &events)?;

        Ok(profile)
    }

    /// Copy-on-read snapshot of the user's profile. None = no decision
    /// has ever been folded and no snapshot was seeded.
    pub fn profile(&self, user_id: Uuid) -> Option<StyleProfile> {
        self.profiles.snapshot(user_id)
    }

    /// Seed the in-memory profile from an externally persisted snapshot.
    /// The snapshot's last_sequence must match the log, otherwise the
    /// next fold reports a conflict and the caller should rebuild.
    pub fn seed_profile(&self, profile: StyleProfile) {
        self.profiles.insert_snapshot(profile);
    }

    /// Drop a presentation session and its shown-item set.
    pub fn end_session(&self, session_id: &str) {
        self.sessions.end_session(session_id);
    }

    fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.write_locks.entry(user_id).or_default().clone()
    }
}
