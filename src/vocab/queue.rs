//! Session queue construction
//!
//! Selects at most `goal` distinct cards for one study session: every
//! due card first, then fresh cards that are not yet due, then the
//! rest, shuffled so repeated sessions do not replay storage order.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use super::models::Card;

/// Build the ordered card list for one session.
///
/// The randomness source is injected so tests can seed it; production
/// callers pass a thread RNG. Returns fewer than `goal` cards when the
/// deck is small; callers shrink their goal to the returned length.
pub fn build_queue<R: Rng + ?Sized>(
    cards: &[Card],
    goal: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Card> {
    let (due, not_due): (Vec<&Card>, Vec<&Card>) =
        cards.iter().partition(|card| card.srs.is_due(now));

    let mut candidates = due;

    // Top up with not-yet-due cards, fresh ones first.
    if candidates.len() < goal {
        let mut seen: HashSet<Uuid> = candidates.iter().map(|card| card.id).collect();
        let fresh = not_due.iter().copied().filter(|card| card.is_fresh());
        let seasoned = not_due.iter().copied().filter(|card| !card.is_fresh());
        for card in fresh.chain(seasoned) {
            if candidates.len() >= goal {
                break;
            }
            if seen.insert(card.id) {
                candidates.push(card);
            }
        }
    }

    candidates.shuffle(rng);
    candidates.truncate(goal);
    candidates.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::models::ReviewState;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn card(deck_id: Uuid, due_offset_days: i64, reps: u32, now: DateTime<Utc>) -> Card {
        Card {
            id: Uuid::new_v4(),
            deck_id,
            english: "test".to_string(),
            german: "Test".to_string(),
            article: None,
            plural: None,
            example: None,
            notes: None,
            created_at: now,
            srs: ReviewState {
                due: now + Duration::days(due_offset_days),
                interval_days: 1.0,
                ease: 2.3,
                reps,
                lapses: 0,
            },
        }
    }

    #[test]
    fn test_queue_length_is_min_of_goal_and_deck() {
        let now = Utc::now();
        let deck_id = Uuid::new_v4();
        let cards: Vec<Card> = (0..5).map(|_| card(deck_id, -1, 1, now)).collect();
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(build_queue(&cards, 3, now, &mut rng).len(), 3);
        assert_eq!(build_queue(&cards, 5, now, &mut rng).len(), 5);
        assert_eq!(build_queue(&cards, 20, now, &mut rng).len(), 5);
    }

    #[test]
    fn test_queue_has_no_duplicates() {
        let now = Utc::now();
        let deck_id = Uuid::new_v4();
        let mut cards: Vec<Card> = (0..4).map(|_| card(deck_id, -1, 2, now)).collect();
        cards.extend((0..4).map(|_| card(deck_id, 3, 0, now)));
        cards.extend((0..4).map(|_| card(deck_id, 3, 2, now)));
        let mut rng = StdRng::seed_from_u64(7);

        let queue = build_queue(&cards, 10, now, &mut rng);
        let ids: HashSet<Uuid> = queue.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), queue.len());
        assert_eq!(queue.len(), 10);
    }

    #[test]
    fn test_same_seed_same_order() {
        let now = Utc::now();
        let deck_id = Uuid::new_v4();
        let cards: Vec<Card> = (0..12).map(|_| card(deck_id, -1, 1, now)).collect();

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let queue_a = build_queue(&cards, 8, now, &mut rng_a);
        let queue_b = build_queue(&cards, 8, now, &mut rng_b);

        let ids_a: Vec<Uuid> = queue_a.iter().map(|c| c.id).collect();
        let ids_b: Vec<Uuid> = queue_b.iter().map(|c| c.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_due_cards_fill_queue_before_others() {
        let now = Utc::now();
        let deck_id = Uuid::new_v4();
        let mut cards: Vec<Card> = (0..6).map(|_| card(deck_id, -2, 1, now)).collect();
        let due_ids: HashSet<Uuid> = cards.iter().map(|c| c.id).collect();
        cards.extend((0..6).map(|_| card(deck_id, 5, 0, now)));
        let mut rng = StdRng::seed_from_u64(1);

        // Due count (6) >= goal (4): only due cards may appear.
        let queue = build_queue(&cards, 4, now, &mut rng);
        assert_eq!(queue.len(), 4);
        assert!(queue.iter().all(|c| due_ids.contains(&c.id)));
    }

    #[test]
    fn test_fresh_cards_top_up_before_seasoned() {
        let now = Utc::now();
        let deck_id = Uuid::new_v4();
        let due = card(deck_id, -1, 1, now);
        let fresh_not_due = card(deck_id, 2, 0, now);
        let seasoned_not_due = card(deck_id, 2, 3, now);
        let cards = vec![seasoned_not_due.clone(), due.clone(), fresh_not_due.clone()];
        let mut rng = StdRng::seed_from_u64(9);

        let queue = build_queue(&cards, 2, now, &mut rng);
        let ids: HashSet<Uuid> = queue.iter().map(|c| c.id).collect();
        assert!(ids.contains(&due.id));
        assert!(ids.contains(&fresh_not_due.id));
        assert!(!ids.contains(&seasoned_not_due.id));
    }

    #[test]
    fn test_empty_input_gives_empty_queue() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(build_queue(&[], 5, now, &mut rng).is_empty());
    }
}
