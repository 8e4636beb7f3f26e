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

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_derive::Serialize;
use tracing::info;

use crate::attack;
use crate::catalog::Catalog;
use crate::config::ScenarioConfig;
use crate::defense;
use crate::errors::{DataError, Error};
use crate::recommend::RecommenderModel;
use crate::stats::RatingStore;
use crate::types::{Rating, RecEntry};

/// The three datasets the models are trained on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Baseline,
    Attack,
    Defense,
}

impl Scenario {

    pub const ALL: [Scenario; 3] = [Scenario::Baseline, Scenario::Attack, Scenario::Defense];

    /// Case-insensitive and ignoring surrounding whitespace, unrecognized names fall back to the
    /// baseline.
    pub fn parse(name: &str) -> Scenario {
        match name.trim().to_lowercase().as_str() {
            "attack" => Scenario::Attack,
            "defense" => Scenario::Defense,
            _ => Scenario::Baseline,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Baseline => "baseline",
            Scenario::Attack => "attack",
            Scenario::Defense => "defense",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Recommendations for the same user from all three models. Field names are used in JSON.
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct Comparison {
    pub user_id: u32,
    pub top_k: usize,
    pub baseline: Vec<RecEntry>,
    pub attack: Vec<RecEntry>,
    pub defense: Vec<RecEntry>,
}

/// Owns a baseline model, a model trained under a push attack by a fake user, and a model trained
/// on the attacked ratings after outlier clipping. All of them are built once, there is no way to
/// rebuild them afterwards.
pub struct Scenarios {
    baseline: RecommenderModel,
    attack: RecommenderModel,
    defense: RecommenderModel,
    attacker_id: u32,
    target_item_id: u32,
    catalog: Arc<Catalog>,
}

impl Scenarios {

    pub fn build(
        ratings: Vec<Rating>,
        catalog: Catalog,
        config: &ScenarioConfig,
    ) -> Result<Self, Error> {

        config.validate()?;

        let catalog = Arc::new(catalog);
        let base_store = RatingStore::from(ratings);

        let attacker_id = base_store.max_user_id()
            .ok_or_else(|| DataError::Empty(String::from("ratings")))?
            .checked_add(1)
            .ok_or(DataError::NoFreeUserId)?;

        let target_item_id = choose_target(&base_store, config.target_min_ratings, config.seed)
            .ok_or_else(|| DataError::Empty(String::from("ratings")))?;

        info!(
            attacker_id,
            target_item_id,
            target_title = catalog.title(target_item_id),
            "chose attacker and target"
        );

        let attack_store = attack::simulate_attack(
            &base_store,
            attacker_id,
            target_item_id,
            config.n_push_items,
            config.extreme_rating,
            config.seed,
        );

        let defense_store = defense::apply_defense(&attack_store, config.tau);

        let support = config.popularity_min_support;

        let baseline = RecommenderModel::build(base_store, Arc::clone(&catalog), support)?;
        let attack = RecommenderModel::build(attack_store, Arc::clone(&catalog), support)?;
        let defense = RecommenderModel::build(defense_store, Arc::clone(&catalog), support)?;

        Ok(Scenarios { baseline, attack, defense, attacker_id, target_item_id, catalog })
    }

    pub fn attacker_id(&self) -> u32 {
        self.attacker_id
    }

    pub fn target_item_id(&self) -> u32 {
        self.target_item_id
    }

    pub fn title(&self, item: u32) -> &str {
        self.catalog.title(item)
    }

    pub fn model(&self, scenario: Scenario) -> &RecommenderModel {
        match scenario {
            Scenario::Baseline => &self.baseline,
            Scenario::Attack => &self.attack,
            Scenario::Defense => &self.defense,
        }
    }

    pub fn store(&self, scenario: Scenario) -> &RatingStore {
        self.model(scenario).store()
    }

    /// Dispatches by scenario name, see `Scenario::parse`.
    pub fn recommend(&self, scenario: &str, user: u32, top_k: usize) -> Vec<RecEntry> {
        self.model(Scenario::parse(scenario)).recommend(user, top_k)
    }

    pub fn compare(&self, user: u32, top_k: usize) -> Comparison {
        Comparison {
            user_id: user,
            top_k,
            baseline: self.baseline.recommend(user, top_k),
            attack: self.attack.recommend(user, top_k),
            defense: self.defense.recommend(user, top_k),
        }
    }
}

/// Seeded random choice among the items with at least `min_ratings` ratings, or among all items
/// if no item has that many.
pub fn choose_target(store: &RatingStore, min_ratings: usize, seed: u64) -> Option<u32> {

    let stats = store.item_stats();

    let mut candidates: Vec<u32> = stats.iter()
        .filter(|item_stats| item_stats.count >= min_ratings)
        .map(|item_stats| item_stats.item)
        .collect();

    if candidates.is_empty() {
        candidates = stats.iter().map(|item_stats| item_stats.item).collect();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    candidates.choose(&mut rng).cloned()
}


#[cfg(test)]
mod tests {

    use crate::catalog::{Catalog, TitleTable};
    use crate::config::ScenarioConfig;
    use crate::errors::{ConfigError, DataError, Error};
    use crate::scenario::{self, Scenario, Scenarios};
    use crate::stats::RatingStore;
    use crate::types::Rating;

    fn ratings() -> Vec<Rating> {
        let mut ratings = Vec::new();
        for user in 1..=30_u32 {
            for item in 1..=12_u32 {
                if (user * 3 + item * 7) % 5 < 3 {
                    ratings.push(Rating::new(user, item, 1.0 + ((user + item * item) % 5) as f64));
                }
            }
        }
        ratings
    }

    fn config() -> ScenarioConfig {
        ScenarioConfig { target_min_ratings: 10, n_push_items: 4, ..Default::default() }
    }

    fn scenarios() -> Scenarios {
        let titles: TitleTable = (1..=12_u32)
            .map(|item| (item, format!("Movie {} (1995)", item)))
            .collect();

        Scenarios::build(ratings(), Catalog::without_posters(titles), &config()).unwrap()
    }

    #[test]
    fn parses_scenario_names() {
        assert_eq!(Scenario::parse("attack"), Scenario::Attack);
        assert_eq!(Scenario::parse("DEFENSE"), Scenario::Defense);
        assert_eq!(Scenario::parse("Baseline"), Scenario::Baseline);
        assert_eq!(Scenario::parse("something else"), Scenario::Baseline);
        assert_eq!(Scenario::parse(""), Scenario::Baseline);
        assert_eq!(Scenario::parse("  Attack\n"), Scenario::Attack);
        assert_eq!(Scenario::Defense.to_string(), "defense");
    }

    #[test]
    fn chains_attack_and_defense() {
        let scenarios = scenarios();

        assert_eq!(scenarios.attacker_id(), 31);

        let target = scenarios.target_item_id();
        let baseline = scenarios.store(Scenario::Baseline);
        let attacked = scenarios.store(Scenario::Attack);
        let defended = scenarios.store(Scenario::Defense);

        let target_stats = baseline.item_stats().into_iter()
            .find(|item_stats| item_stats.item == target)
            .unwrap();
        assert!(target_stats.count >= 10);

        assert_eq!(baseline.user_index(31), None);
        assert_eq!(attacked.num_ratings(), baseline.num_ratings() + 5);
        assert_eq!(defended.num_ratings(), attacked.num_ratings());

        // The attacker's ratings have no spread, so the defense leaves them alone
        let attacker_ratings: Vec<Rating> = defended.ratings().iter()
            .filter(|rating| rating.user == 31)
            .cloned()
            .collect();
        assert_eq!(attacker_ratings.len(), 5);
        assert!(attacker_ratings.iter().all(|rating| rating.rating == 5.0));
        assert!(attacker_ratings.iter().any(|rating| rating.item == target));
    }

    #[test]
    fn dispatches_by_name() {
        let scenarios = scenarios();

        assert_eq!(scenarios.recommend("ATTACK", 1, 5), scenarios.model(Scenario::Attack).recommend(1, 5));
        assert_eq!(scenarios.recommend("nonsense", 1, 5), scenarios.model(Scenario::Baseline).recommend(1, 5));

        let comparison = scenarios.compare(2, 3);
        assert_eq!(comparison.user_id, 2);
        assert_eq!(comparison.top_k, 3);
        assert_eq!(comparison.defense, scenarios.recommend("defense", 2, 3));
        assert!(comparison.baseline.len() <= 3);
    }

    #[test]
    fn build_is_deterministic() {
        let first = scenarios();
        let second = scenarios();

        assert_eq!(first.target_item_id(), second.target_item_id());

        for scenario in Scenario::ALL.iter() {
            assert_eq!(first.store(*scenario).ratings(), second.store(*scenario).ratings());
            assert_eq!(first.model(*scenario).similarities(), second.model(*scenario).similarities());
        }
    }

    #[test]
    fn target_falls_back_to_all_items() {
        let store = RatingStore::from(vec![Rating::new(1, 5, 3.0), Rating::new(2, 5, 4.0)]);

        assert_eq!(scenario::choose_target(&store, 50, 42), Some(5));
        assert_eq!(scenario::choose_target(&RatingStore::from(Vec::new()), 50, 42), None);
    }

    #[test]
    fn refuses_invalid_settings_and_empty_data() {
        let invalid = ScenarioConfig { tau: -0.5, ..Default::default() };
        let catalog = Catalog::without_posters(TitleTable::default());

        match Scenarios::build(ratings(), catalog, &invalid) {
            Err(Error::Config(ConfigError::InvalidTau(_))) => {},
            _ => panic!("expected an invalid tau to be rejected"),
        }

        let catalog = Catalog::without_posters(TitleTable::default());

        match Scenarios::build(Vec::new(), catalog, &ScenarioConfig::default()) {
            Err(Error::Data(DataError::Empty(_))) => {},
            _ => panic!("expected empty ratings to be rejected"),
        }
    }
}
