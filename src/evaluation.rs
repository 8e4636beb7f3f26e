use std::sync::Mutex;
use std::time::Instant;

use scoped_pool::Pool;
use serde_derive::Serialize;
use tracing::info;

use crate::recommend::ScoredItem;
use crate::scenario::{Scenario, Scenarios};
use crate::utils;

/// How often the target item made it into the top-k of the evaluated users. Field names are used
/// in JSON.
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct ScenarioSummary {
    pub scenario: Scenario,
    pub k: usize,
    pub num_users: usize,
    pub hits: usize,
    pub hit_rate: f64,
    /// Mean 1-based rank of the target over the users it was recommended to.
    pub mean_rank: Option<f64>,
}

/// Position of the target item in the recommendations of a single user.
#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct TargetPosition {
    pub scenario: Scenario,
    pub user_id: u32,
    pub rank: Option<usize>,
    pub score: Option<f64>,
}

#[derive(Default)]
struct Tally {
    hits: usize,
    rank_sum: usize,
}

/// 1-based rank and score of `target` in a ranked list, if it appears at all.
pub fn target_rank(ranked: &[ScoredItem], target: u32) -> Option<(usize, f64)> {
    ranked.iter()
        .position(|scored_item| scored_item.item == target)
        .map(|position| (position + 1, ranked[position].score))
}

/// Where the target ends up for a single user, in each scenario.
pub fn inspect(scenarios: &Scenarios, user: u32, k: usize) -> Vec<TargetPosition> {
    Scenario::ALL.iter()
        .map(|scenario| {
            let ranked = scenarios.model(*scenario).ranked(user, k);
            let position = target_rank(&ranked, scenarios.target_item_id());

            TargetPosition {
                scenario: *scenario,
                user_id: user,
                rank: position.map(|(rank, _)| rank),
                score: position.map(|(_, score)| score),
            }
        })
        .collect()
}

/// Computes Hit@k and the mean rank of the target item for every scenario over the given users.
/// Users are scored in parallel, the result does not depend on the number of threads.
pub fn evaluate(
    scenarios: &Scenarios,
    users: &[u32],
    k: usize,
    num_threads: usize,
) -> Vec<ScenarioSummary> {

    let start = Instant::now();
    let pool = Pool::new(num_threads.max(1));

    let tallies: Vec<Mutex<Tally>> = Scenario::ALL.iter()
        .map(|_| Mutex::new(Tally::default()))
        .collect();

    let target = scenarios.target_item_id();

    pool.scoped(|scope| {
        for user in users.iter() {

            let reference_to_tallies = &tallies;

            scope.execute(move || {
                for (index, scenario) in Scenario::ALL.iter().enumerate() {
                    let ranked = scenarios.model(*scenario).ranked(*user, k);

                    if let Some((rank, _)) = target_rank(&ranked, target) {
                        let mut tally = reference_to_tallies[index].lock().unwrap();
                        tally.hits += 1;
                        tally.rank_sum += rank;
                    }
                }
            });
        }
    });

    pool.shutdown();

    info!(
        num_users = users.len(),
        k,
        duration_ms = utils::to_millis(start.elapsed()),
        "evaluated scenarios"
    );

    Scenario::ALL.iter()
        .zip(tallies.into_iter())
        .map(|(scenario, tally)| {
            let tally = tally.into_inner().unwrap();

            let hit_rate = if users.is_empty() {
                0.0
            } else {
                tally.hits as f64 / users.len() as f64
            };

            let mean_rank = if tally.hits > 0 {
                Some(tally.rank_sum as f64 / tally.hits as f64)
            } else {
                None
            };

            ScenarioSummary {
                scenario: *scenario,
                k,
                num_users: users.len(),
                hits: tally.hits,
                hit_rate,
                mean_rank,
            }
        })
        .collect()
}


#[cfg(test)]
mod tests {

    use crate::catalog::{Catalog, TitleTable};
    use crate::config::ScenarioConfig;
    use crate::evaluation;
    use crate::recommend::ScoredItem;
    use crate::scenario::{Scenario, Scenarios};
    use crate::types::Rating;

    fn scenarios() -> Scenarios {
        let mut ratings = Vec::new();
        for user in 1..=40_u32 {
            for item in 1..=15_u32 {
                if (user * 7 + item * 11) % 6 < 3 {
                    ratings.push(Rating::new(user, item, 1.0 + ((user * 3 + item) % 5) as f64));
                }
            }
        }

        let config = ScenarioConfig { target_min_ratings: 5, n_push_items: 6, ..Default::default() };

        Scenarios::build(ratings, Catalog::without_posters(TitleTable::default()), &config)
            .unwrap()
    }

    #[test]
    fn rank_of_target() {
        let ranked = vec![
            ScoredItem { item: 4, score: 4.5 },
            ScoredItem { item: 9, score: 3.0 },
        ];

        assert_eq!(evaluation::target_rank(&ranked, 9), Some((2, 3.0)));
        assert_eq!(evaluation::target_rank(&ranked, 5), None);
        assert_eq!(evaluation::target_rank(&[], 5), None);
    }

    #[test]
    fn summaries_agree_with_single_user_inspection() {
        let scenarios = scenarios();
        let users: Vec<u32> = (1..=40).collect();

        let summaries = evaluation::evaluate(&scenarios, &users, 5, 3);

        assert_eq!(summaries.len(), 3);

        for (summary, scenario) in summaries.iter().zip(Scenario::ALL.iter()) {
            assert_eq!(summary.scenario, *scenario);
            assert_eq!(summary.num_users, 40);

            let ranks: Vec<usize> = users.iter()
                .flat_map(|user| evaluation::inspect(&scenarios, *user, 5))
                .filter(|position| position.scenario == *scenario)
                .filter_map(|position| position.rank)
                .collect();

            assert_eq!(summary.hits, ranks.len());
            assert!((summary.hit_rate - ranks.len() as f64 / 40.0).abs() < 1e-12);

            match summary.mean_rank {
                Some(mean_rank) => {
                    let expected = ranks.iter().sum::<usize>() as f64 / ranks.len() as f64;
                    assert!((mean_rank - expected).abs() < 1e-12);
                },
                None => assert!(ranks.is_empty()),
            }
        }
    }

    #[test]
    fn thread_count_does_not_matter() {
        let scenarios = scenarios();
        let users: Vec<u32> = (1..=40).collect();

        assert_eq!(
            evaluation::evaluate(&scenarios, &users, 10, 1),
            evaluation::evaluate(&scenarios, &users, 10, 4)
        );
    }

    #[test]
    fn no_users_no_hits() {
        let summaries = evaluation::evaluate(&scenarios(), &[], 10, 2);

        assert!(summaries.iter().all(|summary| summary.hits == 0 && summary.mean_rank.is_none()));
        assert!(summaries.iter().all(|summary| summary.hit_rate == 0.0));
    }
}
