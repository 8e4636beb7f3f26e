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

use crate::errors::ConfigError;

/// All constants of the baseline / attack / defense experiment.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioConfig {
    /// Seed for choosing the target item and the attacker's push items.
    pub seed: u64,
    /// Minimum number of ratings an item needs to qualify as attack target.
    pub target_min_ratings: usize,
    /// Number of items besides the target that the attacker rates.
    pub n_push_items: usize,
    /// Rating the attacker gives to all of its items.
    pub extreme_rating: f64,
    /// Width of the per-user clipping interval, in standard deviations.
    pub tau: f64,
    /// Minimum number of ratings for an item to be part of the popularity fallback.
    pub popularity_min_support: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            seed: 42,
            target_min_ratings: 50,
            n_push_items: 10,
            extreme_rating: 5.0,
            tau: 1.5,
            popularity_min_support: 20,
        }
    }
}

impl ScenarioConfig {

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tau.is_finite() || self.tau < 0.0 {
            return Err(ConfigError::InvalidTau(self.tau));
        }

        if !self.extreme_rating.is_finite() || self.extreme_rating <= 0.0 {
            return Err(ConfigError::InvalidExtremeRating(self.extreme_rating));
        }

        if self.popularity_min_support == 0 {
            return Err(ConfigError::Zero("popularity_min_support"));
        }

        Ok(())
    }
}
