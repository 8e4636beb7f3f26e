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

use getopts::Options;
use tracing_subscriber::EnvFilter;

use shillreco::config::ScenarioConfig;
use shillreco::io;
use shillreco::poster;

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("r", "ratings", "Ratings file (optional, defaults to u.data).", "PATH");
    opts.optopt("t", "titles", "Titles file (optional, defaults to u.item).", "PATH");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optopt("u", "users", "Comma-separated user ids to compare recommendations for \
        (required).", "IDS");
    opts.optopt("k", "top-k", "Number of recommendations per scenario (optional, defaults to \
        12).", "NUMBER");
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

    let users = match matches.opt_str("u").map(|ids| parse_ids(&ids)) {
        Some(Ok(users)) => users,
        Some(Err(hint)) => return print_usage_and_exit(&program, opts, Some(&hint)),
        None => return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify the users to compare via --users."),
        ),
    };

    let top_k: usize = match matches.opt_get_default("k", 12) {
        Ok(top_k) => top_k,
        Err(failure) => {
            let hint = format!("Problem with option 'k': {}", failure.to_string());
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let ratings_path = matches.opt_str("r").unwrap_or_else(|| String::from("u.data"));
    let titles_path = matches.opt_str("t").unwrap_or_else(|| String::from("u.item"));
    let output_path = matches.opt_str("o");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(failure) = compare(&ratings_path, &titles_path, &users, top_k, output_path) {
        eprintln!("{}", failure);
        std::process::exit(1);
    }
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

fn compare(
    ratings_path: &str,
    titles_path: &str,
    users: &[u32],
    top_k: usize,
    output_path: Option<String>,
) -> Result<(), Box<dyn Error>> {

    let posters = poster::poster_lookup(env::var("TMDB_API_KEY").ok());

    let scenarios = shillreco::scenarios_from_files(
        ratings_path,
        titles_path,
        posters,
        &ScenarioConfig::default(),
    )?;

    let comparisons: Vec<_> = users.iter()
        .map(|user| scenarios.compare(*user, top_k))
        .collect();

    io::write_json_lines(&comparisons, output_path)?;

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
