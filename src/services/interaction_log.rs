// ============================================
// Interaction Log
// ============================================
//
// Append-only record of every decision a user makes. The log is the
// source of truth for profile state: profiles are folds over it and can
// always be rebuilt by replaying it. There is no delete or update API;
// a correction is a new event.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::models::InteractionEvent;

#[async_trait]
pub trait InteractionLog: Send + Sync {
    /// Append one event, assigning it the next per-user sequence number
    /// (1-based). Returns the stored event with its sequence set.
    async fn append(&self, event: InteractionEvent) -> Result<InteractionEvent>;

    /// Full replay stream for a user, in sequence order.
    async fn stream_for_user(&self, user_id: Uuid) -> Result<Vec<InteractionEvent>>;
}

/// In-memory log used by tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryInteractionLog {
    events: DashMap<Uuid, Vec<InteractionEvent>>,
}

impl InMemoryInteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_count(&self, user_id: Uuid) -> usize {
        self.events.get(&user_id).map_or(0, |log| log.len())
    }
}

#[async_trait]
impl InteractionLog for InMemoryInteractionLog {
    async fn append(&self, mut event: InteractionEvent) -> Result<InteractionEvent> {
        let mut log = self.events.entry(event.user_id).or_default();

        if let Some(last) = log.last() {
            // Client clocks drift. The event keeps its timestamp but its
            // position in the fold is its sequence, never its clock.
            if event.recorded_at < last.recorded_at {
                debug!(
                    user_id = %event.user_id,
                    item_id = %event.item_id,
                    "Out-of-order timestamp accepted; fold order follows the log"
                );
            }
        }

        event.sequence = log.len() as u64 + 1;
        log.push(event.clone());

        Ok(event)
    }

    async fn stream_for_user(&self, user_id: Uuid) -> Result<Vec<InteractionEvent>> {
        Ok(self
            .events
            .get(&user_id)
            .map(|log| log.clone())
            .unwrap_or_default())
    }
}
