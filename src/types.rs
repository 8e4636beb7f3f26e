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

use fnv::FnvHashMap;
use ndarray::Array2;
use serde_derive::Serialize;

/// Dense real matrix, used for both the user x item ratings and the item x item similarities.
pub type DenseMatrix = Array2<f64>;

/// Maps raw identifiers to their dense, 0-based rank.
pub type IdIndex = FnvHashMap<u32, usize>;

/// A single observed rating. A rating of zero cannot be told apart from "unrated" once it is
/// written into the dense rating matrix.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rating {
    pub user: u32,
    pub item: u32,
    pub rating: f64,
}

impl Rating {
    pub fn new(user: u32, item: u32, rating: f64) -> Self {
        Rating { user, item, rating }
    }
}

/// A recommended item, enriched with its title and poster. Field names are used in JSON.
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct RecEntry {
    pub item_id: u32,
    pub title: String,
    pub poster_url: String,
    pub score: f64,
}

pub fn new_index(capacity: usize) -> IdIndex {
    FnvHashMap::with_capacity_and_hasher(capacity, Default::default())
}
