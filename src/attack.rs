/**
 * ShillReco
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::stats::RatingStore;
use crate::types::Rating;

/// Simulates a push attack by a single fake user. The attacker gives `extreme_rating` to the
/// target item and to `n_push_items` other items, drawn without replacement from all remaining
/// items with a random generator seeded by `seed`. If there are not enough other items, the
/// attacker rates all of them. The attacker id must not belong to an existing user.
///
/// Returns a new store, the original store remains unchanged.
pub fn simulate_attack(
    store: &RatingStore,
    attacker: u32,
    target_item: u32,
    n_push_items: usize,
    extreme_rating: f64,
    seed: u64,
) -> RatingStore {

    if store.user_index(attacker).is_some() {
        warn!(attacker, "attacker id collides with an existing user");
    }

    let candidate_items: Vec<u32> = store.item_ids().iter()
        .cloned()
        .filter(|item| *item != target_item)
        .collect();

    let push_items: Vec<u32> = if candidate_items.len() > n_push_items {
        let mut rng = StdRng::seed_from_u64(seed);
        candidate_items.choose_multiple(&mut rng, n_push_items).cloned().collect()
    } else {
        candidate_items
    };

    info!(attacker, target_item, num_push_items = push_items.len(), "injecting push attack");

    let attack = std::iter::once(target_item)
        .chain(push_items.into_iter())
        .map(|item| Rating::new(attacker, item, extreme_rating));

    store.with_ratings(attack)
}


#[cfg(test)]
mod tests {

    use crate::attack;
    use crate::stats::RatingStore;
    use crate::types::Rating;

    fn mean_of(store: &RatingStore, item: u32) -> f64 {
        store.item_stats().iter()
            .find(|item_stats| item_stats.item == item)
            .map(|item_stats| item_stats.mean)
            .unwrap()
    }

    fn catalog_store(num_users: u32, num_items: u32) -> RatingStore {
        let mut ratings = Vec::new();
        for user in 1..=num_users {
            for item in 1..=num_items {
                if (user + item) % 3 != 0 {
                    ratings.push(Rating::new(user, item, 1.0 + ((user * item) % 5) as f64));
                }
            }
        }
        RatingStore::from(ratings)
    }

    #[test]
    fn pushes_the_target_and_sampled_items() {
        let store = catalog_store(20, 30);
        let attacker = store.max_user_id().unwrap() + 1;

        let attacked = attack::simulate_attack(&store, attacker, 7, 10, 5.0, 42);

        let injected: Vec<Rating> = attacked.ratings().iter()
            .filter(|rating| rating.user == attacker)
            .cloned()
            .collect();

        assert_eq!(injected.len(), 11);
        assert!(injected.iter().all(|rating| rating.rating == 5.0));
        assert_eq!(injected.iter().filter(|rating| rating.item == 7).count(), 1);

        let mut pushed: Vec<u32> = injected.iter().map(|rating| rating.item).collect();
        pushed.sort();
        pushed.dedup();
        assert_eq!(pushed.len(), 11);

        assert_eq!(attacked.num_ratings(), store.num_ratings() + 11);
        assert!(mean_of(&attacked, 7) >= mean_of(&store, 7));
    }

    #[test]
    fn attack_is_reproducible() {
        let store = catalog_store(20, 30);

        let first = attack::simulate_attack(&store, 21, 3, 5, 5.0, 42);
        let second = attack::simulate_attack(&store, 21, 3, 5, 5.0, 42);

        assert_eq!(first.ratings(), second.ratings());
    }

    #[test]
    fn pushes_all_items_if_there_are_too_few() {
        // Three users, item 1 of the catalog is unrated, so only items 2 and 3 can be pushed
        let store = RatingStore::from(vec![
            Rating::new(1, 2, 3.0),
            Rating::new(1, 4, 1.0),
            Rating::new(2, 3, 4.0),
            Rating::new(2, 4, 2.0),
            Rating::new(3, 2, 2.0),
            Rating::new(3, 3, 5.0),
        ]);

        let attacked = attack::simulate_attack(&store, 4, 4, 10, 5.0, 42);

        assert_eq!(attacked.num_ratings(), store.num_ratings() + 3);
        assert_eq!(&attacked.ratings()[6..], &[
            Rating::new(4, 4, 5.0),
            Rating::new(4, 2, 5.0),
            Rating::new(4, 3, 5.0),
        ]);

        assert_eq!(store.num_ratings(), 6);
        assert_eq!(store.user_index(4), None);
    }
}
