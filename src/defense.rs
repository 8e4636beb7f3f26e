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

use tracing::info;

use crate::stats::RatingStore;
use crate::types::Rating;
use crate::utils;

/// Users whose ratings spread less than this are left untouched.
pub const MIN_STD_DEV: f64 = 1e-6;

/// Clips the ratings of every user to `[mean - tau * std_dev, mean + tau * std_dev]`, computed
/// from that user's own ratings with the population standard deviation. Users with (almost)
/// identical ratings pass through unmodified. This includes a push attacker, whose injected
/// ratings all carry the same extreme value.
///
/// Returns a new store, with the observations grouped by user in ascending user id order.
pub fn apply_defense(store: &RatingStore, tau: f64) -> RatingStore {

    let mut defended: Vec<Rating> = Vec::with_capacity(store.num_ratings());
    let mut num_clipped: usize = 0;

    for (_, ratings) in store.ratings_by_user() {

        let values: Vec<f64> = ratings.iter().map(|rating| rating.rating).collect();
        let mean = utils::mean(&values);
        let std_dev = utils::std_dev(&values, mean);

        if std_dev < MIN_STD_DEV {
            defended.extend(ratings);
            continue;
        }

        let lower = mean - tau * std_dev;
        let upper = mean + tau * std_dev;

        for rating in ratings {
            let clipped = rating.rating.max(lower).min(upper);
            if clipped != rating.rating {
                num_clipped += 1;
            }
            defended.push(Rating { rating: clipped, ..rating });
        }
    }

    info!(tau, num_clipped, "clipped outlier ratings");

    RatingStore::from(defended)
}
