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

use std::env;
use std::error::Error;

use getopts::{Matches, Options};
use tracing_subscriber::EnvFilter;

use shillreco::config::ScenarioConfig;
use shillreco::evaluation;
use shillreco::io;
use shillreco::poster;
use shillreco::scenario::Scenario;

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("r", "ratings", "Ratings file (optional, defaults to u.data). Tab-separated \
        user, item, rating and timestamp per line.", "PATH");
    opts.optopt("t", "titles", "Titles file (optional, defaults to u.item). Pipe-separated, \
        starting with item id and title.", "PATH");
    opts.optopt("k", "top-k", "Length of the recommendation lists to evaluate (optional, \
        defaults to 10).", "NUMBER");
    opts.optopt("u", "num-users", "Number of users to evaluate, the users with the smallest ids \
        are used (optional, defaults to 200).", "NUMBER");
    opts.optopt("", "inspect", "Comma-separated user ids to show the target's rank for \
        (optional, defaults to 1,10,50,100,150).", "IDS");
    opts.optopt("", "tau", "Width of the clipping interval in standard deviations (optional, \
        defaults to 1.5).", "NUMBER");
    opts.optopt("", "push-items", "Number of items the attacker rates besides the target \
        (optional, defaults to 10).", "NUMBER");
    opts.optopt("", "seed", "Seed for choosing target and push items (optional, defaults to \
        42).", "NUMBER");
    opts.optflag("", "json", "Print the summaries as JSON, one object per line");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    let settings = match Settings::parse(&matches) {
        Ok(settings) => settings,
        Err(hint) => return print_usage_and_exit(&program, opts, Some(&hint)),
    };

    init_logging();

    if let Err(failure) = run_experiment(settings) {
        eprintln!("{}", failure);
        std::process::exit(1);
    }
}

struct Settings {
    ratings_path: String,
    titles_path: String,
    k: usize,
    num_users: usize,
    inspected_users: Vec<u32>,
    json: bool,
    config: ScenarioConfig,
}

impl Settings {

    fn parse(matches: &Matches) -> Result<Self, String> {

        let defaults = ScenarioConfig::default();

        let config = ScenarioConfig {
            tau: option(matches, "tau", defaults.tau)?,
            n_push_items: option(matches, "push-items", defaults.n_push_items)?,
            seed: option(matches, "seed", defaults.seed)?,
            ..defaults
        };

        let inspected_users = match matches.opt_str("inspect") {
            Some(ids) => parse_ids(&ids)?,
            None => vec![1, 10, 50, 100, 150],
        };

        Ok(Settings {
            ratings_path: matches.opt_str("r").unwrap_or_else(|| String::from("u.data")),
            titles_path: matches.opt_str("t").unwrap_or_else(|| String::from("u.item")),
            k: option(matches, "k", 10)?,
            num_users: option(matches, "u", 200)?,
            inspected_users,
            json: matches.opt_present("json"),
            config,
        })
    }
}

fn option<T>(matches: &Matches, name: &str, default: T) -> Result<T, String>
    where T: std::str::FromStr, T::Err: std::fmt::Display {

    matches.opt_get_default(name, default)
        .map_err(|failure| format!("Problem with option '{}': {}", name, failure))
}

fn parse_ids(ids: &str) -> Result<Vec<u32>, String> {
    ids.split(',')
        .filter(|id| !id.trim().is_empty())
        .map(|id| id.trim().parse().map_err(|_| format!("Invalid user id '{}'", id)))
        .collect()
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));

    let code = exit_code(hint);
    if code != 0 {
        std::process::exit(code);
    }
}

/// Asking for help succeeds, invalid or missing options do not.
fn exit_code(hint: Option<&str>) -> i32 {
    match hint {
        Some(_) => 1,
        None => 0,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_experiment(settings: Settings) -> Result<(), Box<dyn Error>> {

    // Posters are never shown here, the experiment only looks at ranks
    let scenarios = shillreco::scenarios_from_files(
        &settings.ratings_path,
        &settings.titles_path,
        Box::new(poster::NoPosters),
        &settings.config,
    )?;

    let target = scenarios.target_item_id();
    let title = match scenarios.title(target) {
        "" => "Unknown title",
        title => title,
    };

    println!("=== Attack experiment ===");
    println!("Target item ID : {}", target);
    println!("Target title   : {}", title);
    println!("Attacker ID    : {}", scenarios.attacker_id());
    println!();

    for user in settings.inspected_users.iter() {
        println!("--- User {} ---", user);

        for position in evaluation::inspect(&scenarios, *user, 50) {
            match (position.rank, position.score) {
                (Some(rank), Some(score)) =>
                    println!("{:<9}: rank={}, score={:.4}", position.scenario, rank, score),
                _ => println!("{:<9}: not in top 50", position.scenario),
            }
        }
        println!();
    }

    let users: Vec<u32> = scenarios.store(Scenario::Baseline)
        .user_ids()
        .iter()
        .take(settings.num_users)
        .cloned()
        .collect();

    println!("Using top-k = {}, {} users", settings.k, users.len());

    let summaries = evaluation::evaluate(&scenarios, &users, settings.k, num_cpus::get());

    if settings.json {
        io::write_json_lines(&summaries, None)?;
        return Ok(());
    }

    for summary in summaries.iter() {
        println!();
        println!("Scenario: {}", summary.scenario);
        println!("  Hit@{}      : {} / {}", summary.k, summary.hits, summary.num_users);
        println!("  Hit@{} rate : {:.4}", summary.k, summary.hit_rate);

        match summary.mean_rank {
            Some(mean_rank) => println!("  Avg. rank of target : {:.2}", mean_rank),
            None => println!("  Avg. rank of target : never recommended"),
        }
    }

    Ok(())
}


#[cfg(test)]
mod tests {

    #[test]
    fn option_problems_fail() {
        assert_eq!(super::exit_code(None), 0);
        assert_eq!(super::exit_code(Some("Problem with option 'k': invalid digit found in string")), 1);
    }

    #[test]
    fn parses_user_lists() {
        assert_eq!(super::parse_ids("1, 10,50,"), Ok(vec![1, 10, 50]));
        assert!(super::parse_ids("1,abc").is_err());
    }
}
