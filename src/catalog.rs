use std::iter::FromIterator;

use fnv::FnvHashMap;

use crate::poster::{NoPosters, PosterLookup};
use crate::types::RecEntry;

/// Titles of the items, unknown items have an empty title.
#[derive(Clone, Default, Debug)]
pub struct TitleTable {
    titles: FnvHashMap<u32, String>,
}

impl TitleTable {

    pub fn insert(&mut self, item: u32, title: String) {
        self.titles.insert(item, title);
    }

    pub fn title(&self, item: u32) -> &str {
        self.titles.get(&item).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl FromIterator<(u32, String)> for TitleTable {
    fn from_iter<I: IntoIterator<Item=(u32, String)>>(iter: I) -> Self {
        TitleTable { titles: iter.into_iter().collect() }
    }
}

/// Everything needed to present an item to a user, shared by all models.
pub struct Catalog {
    titles: TitleTable,
    posters: Box<dyn PosterLookup>,
}

impl Catalog {

    pub fn new(titles: TitleTable, posters: Box<dyn PosterLookup>) -> Self {
        Catalog { titles, posters }
    }

    pub fn without_posters(titles: TitleTable) -> Self {
        Catalog::new(titles, Box::new(NoPosters))
    }

    pub fn title(&self, item: u32) -> &str {
        self.titles.title(item)
    }

    pub fn entry(&self, item: u32, score: f64) -> RecEntry {
        let title = self.titles.title(item);
        let poster_url = self.posters.poster_url(title);

        RecEntry { item_id: item, title: title.to_owned(), poster_url, score }
    }
}
