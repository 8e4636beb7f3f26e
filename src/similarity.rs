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

use std::time::Instant;

use ndarray::Axis;
use tracing::info;

use crate::errors::DataError;
use crate::stats::RatingStore;
use crate::types::DenseMatrix;
use crate::utils;

/// Stands in for the norm of an item nobody rated (with a non-zero rating).
pub const NORM_EPSILON: f64 = 1e-8;

/// The dense user x item rating matrix of a store together with the item x item cosine
/// similarities computed from it.
#[derive(Clone, Debug)]
pub struct SimilarityEngine {
    ratings: DenseMatrix,
    similarities: DenseMatrix,
}

impl SimilarityEngine {

    pub fn build(store: &RatingStore) -> Result<Self, DataError> {

        let start = Instant::now();

        let ratings = rating_matrix(store)?;
        let similarities = cosine_similarities(&ratings);

        info!(
            num_users = store.num_users(),
            num_items = store.num_items(),
            duration_ms = utils::to_millis(start.elapsed()),
            "computed item similarities"
        );

        Ok(SimilarityEngine { ratings, similarities })
    }

    /// Shape `(num_users, num_items)`, zero means unrated.
    pub fn ratings(&self) -> &DenseMatrix {
        &self.ratings
    }

    /// Shape `(num_items, num_items)`, symmetric with entries in `[-1, 1]`.
    pub fn similarities(&self) -> &DenseMatrix {
        &self.similarities
    }
}

/// Scatters the observations of a store into a dense matrix, indexed by the store's user and item
/// indices. Later observations for the same pair overwrite earlier ones.
pub fn rating_matrix(store: &RatingStore) -> Result<DenseMatrix, DataError> {

    let mut ratings = DenseMatrix::zeros((store.num_users(), store.num_items()));

    for rating in store.ratings() {
        let user_index = store.user_index(rating.user)
            .ok_or(DataError::UnknownUser(rating.user))?;
        let item_index = store.item_index(rating.item)
            .ok_or(DataError::UnknownItem(rating.item))?;

        ratings[[user_index, item_index]] = rating.rating;
    }

    Ok(ratings)
}

/// Cosine similarity between all pairs of columns of `ratings`, computed from the gram matrix
/// `ratings^T * ratings`. Unrated entries take part as zeros.
pub fn cosine_similarities(ratings: &DenseMatrix) -> DenseMatrix {

    let norms = ratings.map_axis(Axis(0), |column| {
        let norm = column.dot(&column).sqrt();
        if norm == 0.0 { NORM_EPSILON } else { norm }
    });

    let mut similarities = ratings.t().dot(ratings);
    let num_items = similarities.nrows();

    // Only the upper triangle is normalized and then mirrored, which keeps the result exactly
    // symmetric regardless of how the matrix product was blocked.
    for i in 0..num_items {
        for j in i..num_items {
            let similarity = (similarities[[i, j]] / (norms[i] * norms[j])).clamp(-1.0, 1.0);
            similarities[[i, j]] = similarity;
            similarities[[j, i]] = similarity;
        }
    }

    similarities
}
