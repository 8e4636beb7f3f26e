use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use ndarray::Axis;

use crate::catalog::Catalog;
use crate::errors::DataError;
use crate::similarity::SimilarityEngine;
use crate::stats::RatingStore;
use crate::types::{DenseMatrix, RecEntry};

/// Keeps the predicted score finite if all similarities to the rated items are tiny.
pub const SCORE_EPSILON: f64 = 1e-8;

/// An item with its predicted score (or mean rating, for the popularity fallback).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ScoredItem {
    pub item: u32,
    pub score: f64,
}

/// Ordering for our max-heap of the top-k items: the "greatest" item is the worst one, which has
/// the lowest score, or for equal scores the larger item id. Note that we must use a special
/// implementation here as there is no total order on floating point numbers.
fn cmp_reverse(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    let by_score = match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        Some(Ordering::Equal) => Ordering::Equal,
        None => Ordering::Equal
    };

    by_score.then_with(|| scored_item_a.item.cmp(&scored_item_b.item))
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}

/// Item-item collaborative filtering over a single rating store. Everything is computed once at
/// construction, afterwards the model is read-only and can be shared between threads.
pub struct RecommenderModel {
    store: RatingStore,
    engine: SimilarityEngine,
    popular: Vec<ScoredItem>,
    catalog: Arc<Catalog>,
}

impl RecommenderModel {

    pub fn build(
        store: RatingStore,
        catalog: Arc<Catalog>,
        popularity_min_support: usize,
    ) -> Result<Self, DataError> {

        let engine = SimilarityEngine::build(&store)?;
        let popular = popular_items(&store, popularity_min_support);

        Ok(RecommenderModel { store, engine, popular, catalog })
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    pub fn similarities(&self) -> &DenseMatrix {
        self.engine.similarities()
    }

    /// The `top_k` most popular items, scored by their mean rating.
    pub fn popular(&self, top_k: usize) -> Vec<ScoredItem> {
        self.popular.iter().take(top_k).cloned().collect()
    }

    /// Recommendations for a user, enriched with titles and posters.
    pub fn recommend(&self, user: u32, top_k: usize) -> Vec<RecEntry> {
        self.ranked(user, top_k)
            .into_iter()
            .map(|scored_item| self.catalog.entry(scored_item.item, scored_item.score))
            .collect()
    }

    /// The `top_k` unrated items with the highest strictly positive predicted score, best first.
    /// Unknown users, users without ratings and users without any candidate get the popularity
    /// fallback instead.
    pub fn ranked(&self, user: u32, top_k: usize) -> Vec<ScoredItem> {

        let user_index = match self.store.user_index(user) {
            Some(user_index) => user_index,
            None => return self.popular(top_k),
        };

        let user_ratings = self.engine.ratings().row(user_index);

        let rated: Vec<usize> = user_ratings.iter()
            .enumerate()
            .filter(|(_, rating)| **rating > 0.0)
            .map(|(item_index, _)| item_index)
            .collect();

        if rated.is_empty() {
            return self.popular(top_k);
        }

        // Similarities of every item to the rated items, shape (num_items, num_rated)
        let similarities_to_rated = self.engine.similarities().select(Axis(1), &rated);
        let ratings_of_rated = user_ratings.select(Axis(0), &rated);

        let numerators = similarities_to_rated.dot(&ratings_of_rated);
        let denominators = similarities_to_rated.mapv(f64::abs).sum_axis(Axis(1));

        let mut heap = BinaryHeap::with_capacity(top_k);
        let mut num_candidates = 0;

        for (item_index, similarities) in similarities_to_rated.outer_iter().enumerate() {

            if user_ratings[item_index] > 0.0 {
                continue;
            }

            if similarities.iter().all(|similarity| *similarity == 0.0) {
                continue;
            }

            let score = numerators[item_index] / (denominators[item_index] + SCORE_EPSILON);

            if score <= 0.0 {
                continue;
            }

            num_candidates += 1;

            let scored_item = ScoredItem { item: self.store.item_id(item_index), score };

            if heap.len() < top_k {
                heap.push(scored_item);
            } else if let Some(mut top) = heap.peek_mut() {
                if scored_item < *top {
                    *top = scored_item;
                }
            }
        }

        if num_candidates == 0 {
            return self.popular(top_k);
        }

        heap.into_sorted_vec()
    }
}

/// Items ordered by mean rating and then by number of ratings, both descending, with ties broken
/// by ascending item id. Only items with at least `min_support` ratings take part, unless there
/// are none, in which case all items do.
fn popular_items(store: &RatingStore, min_support: usize) -> Vec<ScoredItem> {

    let stats = store.item_stats();

    let mut candidates: Vec<_> = stats.iter()
        .filter(|item_stats| item_stats.count >= min_support)
        .cloned()
        .collect();

    if candidates.is_empty() {
        candidates = stats;
    }

    candidates.sort_by(|a, b| {
        b.mean.partial_cmp(&a.mean)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.item.cmp(&b.item))
    });

    candidates.into_iter()
        .map(|item_stats| ScoredItem { item: item_stats.item, score: item_stats.mean })
        .collect()
}
