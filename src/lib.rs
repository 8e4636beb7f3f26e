//! Item-to-item collaborative filtering under a push ("shilling") attack.
//!
//! From a single table of ratings we build three comparable models: a baseline, a model trained
//! after a fake user pushed a target item, and a model trained on the attacked ratings after
//! clipping every user's outlier ratings.

use tracing::info;

pub mod types;
pub mod errors;
pub mod config;
pub mod utils;
pub mod stats;
pub mod io;
pub mod catalog;
pub mod poster;
pub mod similarity;
pub mod recommend;
pub mod attack;
pub mod defense;
pub mod scenario;
pub mod evaluation;


use catalog::Catalog;
use config::ScenarioConfig;
use errors::Error;
use poster::PosterLookup;
use scenario::Scenarios;

pub use types::{Rating, RecEntry};

/// Reads ratings and titles from disk and builds all three scenarios. Missing or malformed input
/// files are fatal, there is nothing to serve without them.
pub fn scenarios_from_files(
    ratings_path: &str,
    titles_path: &str,
    posters: Box<dyn PosterLookup>,
    config: &ScenarioConfig,
) -> Result<Scenarios, Error> {

    let ratings = io::read_ratings(ratings_path)?;
    let titles = io::read_titles(titles_path)?;

    let scenarios = Scenarios::build(ratings, Catalog::new(titles, posters), config)?;

    info!(
        attacker_id = scenarios.attacker_id(),
        target_item_id = scenarios.target_item_id(),
        "built baseline, attack and defense models"
    );

    Ok(scenarios)
}
