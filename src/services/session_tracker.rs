// ============================================
// Session Tracker
// ============================================
//
// Tracks one presentation run (the user flipping through candidates).
// Sessions are ephemeral in-memory state: they hold the shown-item set
// and the RNG stream for this run, are never persisted, and vanish on
// end_session or process exit. A session id belongs to exactly one user.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EngineError, Result};

pub struct PresentationSession {
    pub session_id: String,
    pub user_id: Uuid,
    /// Items already surfaced to the user in this run.
    pub shown: HashSet<Uuid>,
    /// Session RNG stream; forked once per pool request.
    rng: StdRng,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl PresentationSession {
    fn new(session_id: &str, user_id: Uuid, seed: Option<u64>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.to_string(),
            user_id,
            shown: HashSet::new(),
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
            started_at: now,
            last_activity: now,
        }
    }
}

/// In-memory registry of live presentation sessions.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, PresentationSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure the session exists and is bound to this user. A session id
    /// reused by a different user is rejected.
    pub fn get_or_create(&self, session_id: &str, user_id: Uuid, seed: Option<u64>) -> Result<()> {
        let entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(session_id = session_id, user_id = %user_id, "Session started");
                PresentationSession::new(session_id, user_id, seed)
            });

        if entry.user_id != user_id {
            return Err(EngineError::ProfileConflict(format!(
                "session {} belongs to another user",
                session_id
            )));
        }
        Ok(())
    }

    /// Fork a request-scoped RNG off the session stream. Advances the
    /// session RNG, so consecutive requests shuffle differently while the
    /// whole session stays reproducible from one seed.
    pub fn fork_rng(&self, session_id: &str) -> Result<StdRng> {
        let mut entry = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| EngineError::ProfileConflict(format!("unknown session {}", session_id)))?;

        entry.last_activity = Utc::now();
        let child_seed = entry.rng.gen::<u64>();
        Ok(StdRng::seed_from_u64(child_seed))
    }

    /// Copy of the session's shown-item set. An unknown session has shown
    /// nothing.
    pub fn shown_items(&self, session_id: &str) -> HashSet<Uuid> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.shown.clone())
            .unwrap_or_default()
    }

    /// Record that an item was surfaced. A session that ended mid-request
    /// has nothing left to record against.
    pub fn mark_shown(&self, session_id: &str, item_id: Uuid) {
        if let Some(mut entry) = self.sessions.get_mut(session_id) {
            entry.shown.insert(item_id);
            entry.last_activity = Utc::now();
        }
    }

    /// Drop the session and its shown-set.
    pub fn end_session(&self, session_id: &str) {
        if let Some((_, session)) = self.sessions.remove(session_id) {
            info!(
                session_id = session_id,
                user_id = %session.user_id,
                shown_count = session.shown.len(),
                "Session ended"
            );
        }
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}
