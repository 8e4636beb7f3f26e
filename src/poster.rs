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

use std::error::Error;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use fnv::FnvHashMap;
use serde_derive::Deserialize;
use tracing::debug;

const SEARCH_URL: &str = "https://api.themoviedb.org/3/search/movie";
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w342";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub type LookupError = Box<dyn Error + Send + Sync>;

/// Resolves a poster image url for an item title. Lookups never fail, an unresolvable poster is
/// reported as an empty string.
pub trait PosterLookup: Send + Sync {
    fn poster_url(&self, title: &str) -> String;
}

/// The raw search behind a poster lookup. Receives a cleaned title and answers with the poster url
/// of the best match, if there is one.
pub trait PosterSource: Send + Sync {
    fn search(&self, clean_title: &str) -> Result<Option<String>, LookupError>;
}

/// Used when no poster service is configured.
pub struct NoPosters;

impl PosterLookup for NoPosters {
    fn poster_url(&self, _title: &str) -> String {
        String::new()
    }
}

/// Strips a trailing year in parentheses, "Toy Story (1995)" becomes "Toy Story".
pub fn clean_title(title: &str) -> &str {
    match title.rfind('(') {
        Some(position) => title[..position].trim(),
        None => title.trim(),
    }
}

/// Caches the answers of a `PosterSource` for the lifetime of this instance, keyed by the
/// lowercased cleaned title. Failed and empty lookups are cached as empty strings as well.
pub struct CachedPosterLookup<S> {
    source: S,
    cache: Mutex<FnvHashMap<String, String>>,
}

impl<S: PosterSource> CachedPosterLookup<S> {

    pub fn new(source: S) -> Self {
        CachedPosterLookup { source, cache: Mutex::new(FnvHashMap::default()) }
    }

    pub fn num_cached(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl<S: PosterSource> PosterLookup for CachedPosterLookup<S> {

    fn poster_url(&self, title: &str) -> String {

        if title.is_empty() {
            return String::new();
        }

        let clean = clean_title(title);
        let cache_key = clean.to_lowercase();

        if let Some(url) = self.cache.lock().unwrap_or_else(PoisonError::into_inner).get(&cache_key) {
            return url.clone();
        }

        // The lock is not held during the request, concurrent misses may search twice.
        let url = match self.source.search(clean) {
            Ok(url) => url.unwrap_or_default(),
            Err(failure) => {
                debug!(title = clean, error = %failure, "poster lookup failed");
                String::new()
            }
        };

        self.cache.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cache_key, url.clone());

        url
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    poster_path: Option<String>,
}

/// Searches The Movie Database for a title and composes the poster url of the first result.
pub struct TmdbSource {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl TmdbSource {

    pub fn new(api_key: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(TmdbSource { api_key, client })
    }
}

impl PosterSource for TmdbSource {

    fn search(&self, clean_title: &str) -> Result<Option<String>, LookupError> {

        let response: SearchResponse = self.client.get(SEARCH_URL)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", clean_title),
                ("include_adult", "false"),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        let poster_url = response.results.first()
            .and_then(|result| result.poster_path.as_ref())
            .filter(|poster_path| !poster_path.is_empty())
            .map(|poster_path| format!("{}{}", IMAGE_BASE_URL, poster_path));

        Ok(poster_url)
    }
}

/// Poster lookup against The Movie Database if an api key is given, no posters otherwise.
pub fn poster_lookup(api_key: Option<String>) -> Box<dyn PosterLookup> {
    match api_key.filter(|key| !key.is_empty()) {
        Some(key) => match TmdbSource::new(key) {
            Ok(source) => Box::new(CachedPosterLookup::new(source)),
            Err(failure) => {
                debug!(error = %failure, "unable to set up the poster client, posters disabled");
                Box::new(NoPosters)
            }
        },
        None => Box::new(NoPosters),
    }
}
