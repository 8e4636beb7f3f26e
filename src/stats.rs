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

use crate::types;
use crate::types::{IdIndex, Rating};

/// An immutable collection of rating observations together with dictionaries that map the raw user
/// and item identifiers to consecutive, 0-based indices. The indices are assigned by sorting the
/// distinct identifiers in ascending order, so two stores with the same id sets agree on them.
#[derive(Clone, Debug)]
pub struct RatingStore {
    ratings: Vec<Rating>,
    user_ids: Vec<u32>,
    item_ids: Vec<u32>,
    user_dict: IdIndex,
    item_dict: IdIndex,
}

/// Mean rating and support of a single item.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ItemStats {
    pub item: u32,
    pub mean: f64,
    pub count: usize,
}

impl RatingStore {

    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_ids.len()
    }

    pub fn num_ratings(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// All observations, in insertion order.
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Distinct user ids in ascending order; the position of an id is its index.
    pub fn user_ids(&self) -> &[u32] {
        &self.user_ids
    }

    /// Distinct item ids in ascending order; the position of an id is its index.
    pub fn item_ids(&self) -> &[u32] {
        &self.item_ids
    }

    pub fn user_index(&self, user: u32) -> Option<usize> {
        self.user_dict.get(&user).cloned()
    }

    pub fn item_index(&self, item: u32) -> Option<usize> {
        self.item_dict.get(&item).cloned()
    }

    pub fn user_id(&self, user_index: usize) -> u32 {
        self.user_ids[user_index]
    }

    pub fn item_id(&self, item_index: usize) -> u32 {
        self.item_ids[item_index]
    }

    pub fn max_user_id(&self) -> Option<u32> {
        self.user_ids.last().cloned()
    }

    /// Derives a new store holding all observations of this one followed by `additional`. The
    /// parent store stays untouched.
    pub fn with_ratings<I>(&self, additional: I) -> RatingStore
        where I: IntoIterator<Item=Rating> {

        let mut ratings = self.ratings.clone();
        ratings.extend(additional);

        RatingStore::from(ratings)
    }

    /// Groups the observations by user. Users appear in ascending id order, the observations of a
    /// user keep their insertion order.
    pub fn ratings_by_user(&self) -> Vec<(u32, Vec<Rating>)> {

        let mut groups: Vec<Vec<Rating>> = vec![Vec::new(); self.num_users()];

        for rating in self.ratings.iter() {
            let user_index = self.user_dict[&rating.user];
            groups[user_index].push(*rating);
        }

        self.user_ids.iter().cloned().zip(groups.into_iter()).collect()
    }

    /// Mean rating and number of observations per item, in ascending item id order.
    pub fn item_stats(&self) -> Vec<ItemStats> {

        let mut sums = vec![0.0_f64; self.num_items()];
        let mut counts = vec![0_usize; self.num_items()];

        for rating in self.ratings.iter() {
            let item_index = self.item_dict[&rating.item];
            sums[item_index] += rating.rating;
            counts[item_index] += 1;
        }

        self.item_ids.iter()
            .enumerate()
            .map(|(item_index, item)| {
                let count = counts[item_index];
                ItemStats { item: *item, mean: sums[item_index] / count as f64, count }
            })
            .collect()
    }
}

impl From<Vec<Rating>> for RatingStore {

    fn from(ratings: Vec<Rating>) -> Self {

        let mut user_ids: Vec<u32> = ratings.iter().map(|rating| rating.user).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let mut item_ids: Vec<u32> = ratings.iter().map(|rating| rating.item).collect();
        item_ids.sort_unstable();
        item_ids.dedup();

        let user_dict = dictionary(&user_ids);
        let item_dict = dictionary(&item_ids);

        RatingStore { ratings, user_ids, item_ids, user_dict, item_dict }
    }
}

fn dictionary(sorted_ids: &[u32]) -> IdIndex {
    let mut dict = types::new_index(sorted_ids.len());
    for (index, id) in sorted_ids.iter().enumerate() {
        dict.insert(*id, index);
    }
    dict
}
