// ============================================
// Candidate Selector
// ============================================
//
// Narrows the eligible wardrobe down to the pool a session may surface:
// drops items already shown in this session, drops items still inside
// the decision cool-down window, then shuffles what survives so the
// presentation order carries no accidental bias from storage order.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use crate::config::SelectionConfig;
use crate::models::{InteractionEvent, SelectionStats, WardrobeItem};

pub struct CandidateSelector {
    config: SelectionConfig,
}

impl CandidateSelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    /// Filter and shuffle the candidate pool for one request.
    ///
    /// `events` is the user's decision history; any decision inside the
    /// cool-down window excludes its item, and the item re-enters once
    /// the window has passed.
    pub fn select(
        &self,
        eligible: Vec<WardrobeItem>,
        events: &[InteractionEvent],
        shown: &HashSet<Uuid>,
        rng: &mut StdRng,
        now: DateTime<Utc>,
    ) -> (Vec<WardrobeItem>, SelectionStats) {
        let mut stats = SelectionStats {
            eligible_count: eligible.len(),
            ..Default::default()
        };

        let cooling = self.cooling_items(events, now);

        let mut pool: Vec<WardrobeItem> = Vec::with_capacity(eligible.len());
        for item in eligible {
            if shown.contains(&item.id) {
                stats.session_excluded += 1;
                continue;
            }
            if cooling.contains(&item.id) {
                stats.cooldown_excluded += 1;
                continue;
            }
            pool.push(item);
        }

        // Canonical order before the shuffle, so the outcome depends only
        // on the RNG stream and never on store iteration order.
        pool.sort_by(|a, b| a.id.cmp(&b.id));
        pool.shuffle(rng);
        stats.pool_size = pool.len();

        debug!(
            eligible = stats.eligible_count,
            session_excluded = stats.session_excluded,
            cooldown_excluded = stats.cooldown_excluded,
            pool_size = stats.pool_size,
            "Candidate pool selected"
        );

        (pool, stats)
    }

    /// Items with any decision recorded inside the cool-down window.
    fn cooling_items(&self, events: &[InteractionEvent], now: DateTime<Utc>) -> HashSet<Uuid> {
        let window = Duration::seconds(self.config.cool_down_secs as i64);
        events
            .iter()
            .filter(|event| now.signed_duration_since(event.recorded_at) < window)
            .map(|event| event.item_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DecisionKind, ItemFlags};
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn item(owner_id: Uuid) -> WardrobeItem {
        WardrobeItem {
            id: Uuid::new_v4(),
            owner_id,
            category: "top".to_string(),
            subcategory: None,
            embedding: Some(vec![1.0, 0.0]),
            vibes: HashMap::new(),
            flags: ItemFlags::default(),
        }
    }

    fn decision_at(user_id: Uuid, item_id: Uuid, recorded_at: DateTime<Utc>) -> InteractionEvent {
        let mut event = InteractionEvent::new(
            user_id,
            item_id,
            DecisionKind::Like,
            vec![1.0, 0.0],
            HashMap::new(),
        );
        event.recorded_at = recorded_at;
        event
    }

    #[test]
    fn test_excludes_items_shown_this_session() {
        let selector = CandidateSelector::new(SelectionConfig::default());
        let user_id = Uuid::new_v4();
        let items: Vec<WardrobeItem> = (0..4).map(|_| item(user_id)).collect();

        let mut shown = HashSet::new();
        shown.insert(items[0].id);
        shown.insert(items[2].id);

        let mut rng = StdRng::seed_from_u64(1);
        let (pool, stats) = selector.select(items.clone(), &[], &shown, &mut rng, Utc::now());

        assert_eq!(stats.session_excluded, 2);
        assert_eq!(pool.len(), 2);
        assert!(pool.iter().all(|i| !shown.contains(&i.id)));
    }

    #[test]
    fn test_excludes_recent_decision_until_window_passes() {
        let selector = CandidateSelector::new(SelectionConfig {
            cool_down_secs: 86400,
            rng_seed: None,
        });
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let fresh = item(user_id);
        let stale = item(user_id);
        let events = vec![
            decision_at(user_id, fresh.id, now - Duration::hours(1)),
            decision_at(user_id, stale.id, now - Duration::hours(25)),
        ];

        let mut rng = StdRng::seed_from_u64(1);
        let (pool, stats) = selector.select(
            vec![fresh.clone(), stale.clone()],
            &events,
            &HashSet::new(),
            &mut rng,
            now,
        );

        assert_eq!(stats.cooldown_excluded, 1);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, stale.id);
    }

    #[test]
    fn test_any_decision_kind_triggers_cooldown() {
        let selector = CandidateSelector::new(SelectionConfig::default());
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let skipped = item(user_id);

        let mut event = decision_at(user_id, skipped.id, now - Duration::minutes(5));
        event.kind = DecisionKind::Skip;

        let mut rng = StdRng::seed_from_u64(1);
        let (pool, _) = selector.select(vec![skipped], &[event], &HashSet::new(), &mut rng, now);

        assert!(pool.is_empty());
    }

    #[test]
    fn test_shuffle_is_reproducible_for_one_seed() {
        let selector = CandidateSelector::new(SelectionConfig::default());
        let user_id = Uuid::new_v4();
        let items: Vec<WardrobeItem> = (0..12).map(|_| item(user_id)).collect();

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let (pool_a, _) =
            selector.select(items.clone(), &[], &HashSet::new(), &mut rng_a, Utc::now());
        let (pool_b, _) = selector.select(items, &[], &HashSet::new(), &mut rng_b, Utc::now());

        let ids_a: Vec<Uuid> = pool_a.iter().map(|i| i.id).collect();
        let ids_b: Vec<Uuid> = pool_b.iter().map(|i| i.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_shuffle_ignores_input_order() {
        let selector = CandidateSelector::new(SelectionConfig::default());
        let user_id = Uuid::new_v4();
        let items: Vec<WardrobeItem> = (0..8).map(|_| item(user_id)).collect();
        let mut reversed = items.clone();
        reversed.reverse();

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let (pool_a, _) = selector.select(items, &[], &HashSet::new(), &mut rng_a, Utc::now());
        let (pool_b, _) = selector.select(reversed, &[], &HashSet::new(), &mut rng_b, Utc::now());

        let ids_a: Vec<Uuid> = pool_a.iter().map(|i| i.id).collect();
        let ids_b: Vec<Uuid> = pool_b.iter().map(|i| i.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_shuffle_keeps_the_same_items() {
        let selector = CandidateSelector::new(SelectionConfig::default());
        let user_id = Uuid::new_v4();
        let items: Vec<WardrobeItem> = (0..16).map(|_| item(user_id)).collect();
        let input_ids: HashSet<Uuid> = items.iter().map(|i| i.id).collect();

        let mut rng = StdRng::seed_from_u64(7);
        let (pool, stats) = selector.select(items, &[], &HashSet::new(), &mut rng, Utc::now());

        let output_ids: HashSet<Uuid> = pool.iter().map(|i| i.id).collect();
        assert_eq!(input_ids, output_ids);
        assert_eq!(stats.pool_size, 16);
    }

    #[test]
    fn test_empty_wardrobe_selects_nothing() {
        let selector = CandidateSelector::new(SelectionConfig::default());

        let mut rng = StdRng::seed_from_u64(1);
        let (pool, stats) = selector.select(Vec::new(), &[], &HashSet::new(), &mut rng, Utc::now());

        assert!(pool.is_empty());
        assert_eq!(stats.eligible_count, 0);
        assert_eq!(stats.pool_size, 0);
    }
}
