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

use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::stdout;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::info;

use crate::catalog::TitleTable;
use crate::errors::DataError;
use crate::types::Rating;

/// Reader for separated input files. We expect NO headers and no quoting, trailing fields are
/// allowed to vary in number.
pub fn csv_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .delimiter(delimiter)
        .from_reader(reader)
}

fn open(path: &str) -> Result<File, DataError> {
    File::open(Path::new(path))
        .map_err(|source| DataError::Io { path: path.to_owned(), source })
}

/// Reads the ratings file, a tab-separated `user item rating timestamp` tuple per line.
pub fn read_ratings(path: &str) -> Result<Vec<Rating>, DataError> {
    let ratings = ratings_from_reader(open(path)?, path)?;
    info!(path, num_ratings = ratings.len(), "read ratings");
    Ok(ratings)
}

/// Parses rating observations, only the first three fields of a record are used.
pub fn ratings_from_reader<R: Read>(reader: R, source_name: &str) -> Result<Vec<Rating>, DataError> {

    let mut reader = csv_reader(reader, b'\t');
    let mut ratings = Vec::new();

    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);

        if record.len() < 3 {
            return Err(malformed(source_name, line, format!(
                "expected at least 3 fields, found {}", record.len())));
        }

        let user: u32 = parse_field(&record[0], "user id", source_name, line)?;
        let item: u32 = parse_field(&record[1], "item id", source_name, line)?;
        let rating: f64 = parse_field(&record[2], "rating", source_name, line)?;

        if !rating.is_finite() {
            return Err(malformed(source_name, line, format!("rating {} is not finite", rating)));
        }

        ratings.push(Rating::new(user, item, rating));
    }

    if ratings.is_empty() {
        return Err(DataError::Empty(source_name.to_owned()));
    }

    Ok(ratings)
}

/// Reads the titles file, a pipe-separated record per item starting with `item_id|title`.
pub fn read_titles(path: &str) -> Result<TitleTable, DataError> {
    let titles = titles_from_reader(open(path)?, path)?;
    info!(path, num_titles = titles.len(), "read titles");
    Ok(titles)
}

/// Parses item titles. The input is decoded as Latin-1, which maps every byte to the unicode code
/// point with the same value.
pub fn titles_from_reader<R: Read>(reader: R, source_name: &str) -> Result<TitleTable, DataError> {

    let mut reader = csv_reader(reader, b'|');
    let mut titles = TitleTable::default();

    for record in reader.byte_records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);

        if record.len() < 2 {
            return Err(malformed(source_name, line, format!(
                "expected at least 2 fields, found {}", record.len())));
        }

        let item: u32 = parse_field(&latin1(&record[0]), "item id", source_name, line)?;
        titles.insert(item, latin1(&record[1]));
    }

    Ok(titles)
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| *byte as char).collect()
}

fn parse_field<T: FromStr>(
    field: &str,
    what: &str,
    source_name: &str,
    line: u64,
) -> Result<T, DataError> {
    field.trim()
        .parse()
        .map_err(|_| malformed(source_name, line, format!("invalid {} '{}'", what, field)))
}

fn malformed(source_name: &str, line: u64, reason: String) -> DataError {
    DataError::Malformed { source_name: source_name.to_owned(), line, reason }
}

/// Output records in JSON format, one object per line. If a `path` is supplied, we write to a
/// file at the specified path, otherwise, we output to stdout.
pub fn write_json_lines<T: Serialize>(records: &[T], path: Option<String>) -> io::Result<()> {

    let mut out: Box<dyn Write> = match path {
        Some(path) => Box::new(File::create(&Path::new(&path))?),
        _ => Box::new(stdout())
    };

    for record in records {
        serde_json::to_writer(&mut out, record)?;
        writeln!(out)?;
    }

    out.flush()
}


#[cfg(test)]
mod tests {

    use crate::errors::DataError;
    use crate::io;
    use crate::types::Rating;

    #[test]
    fn reads_tab_separated_ratings() {
        let input = "196\t242\t3\t881250949\n186\t302\t3\t891717742\n22\t377\t1.5\t878887116\n";

        let ratings = io::ratings_from_reader(input.as_bytes(), "u.data").unwrap();

        assert_eq!(ratings, vec![
            Rating::new(196, 242, 3.0),
            Rating::new(186, 302, 3.0),
            Rating::new(22, 377, 1.5),
        ]);
    }

    #[test]
    fn timestamp_is_optional() {
        let ratings = io::ratings_from_reader("1\t2\t4\n".as_bytes(), "u.data").unwrap();
        assert_eq!(ratings, vec![Rating::new(1, 2, 4.0)]);
    }

    #[test]
    fn reports_malformed_lines() {
        let input = "1\t2\t4\t0\n1\tabc\t4\t0\n";

        match io::ratings_from_reader(input.as_bytes(), "u.data") {
            Err(DataError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a malformed record, got {:?}", other),
        }

        match io::ratings_from_reader("1\t2\n".as_bytes(), "u.data") {
            Err(DataError::Malformed { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected a malformed record, got {:?}", other),
        }
    }

    #[test]
    fn missing_files_are_errors() {
        match io::read_ratings("/nonexistent/u.data") {
            Err(DataError::Io { path, .. }) => assert_eq!(path, "/nonexistent/u.data"),
            other => panic!("expected an io error, got {:?}", other),
        }

        match io::read_titles("/nonexistent/u.item") {
            Err(DataError::Io { path, .. }) => assert_eq!(path, "/nonexistent/u.item"),
            other => panic!("expected an io error, got {:?}", other),
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        match io::ratings_from_reader("".as_bytes(), "u.data") {
            Err(DataError::Empty(name)) => assert_eq!(name, "u.data"),
            other => panic!("expected an empty input error, got {:?}", other),
        }
    }

    #[test]
    fn reads_latin1_titles() {
        let mut input: Vec<u8> = Vec::new();
        input.extend_from_slice(b"1|Toy Story (1995)|01-Jan-1995||http://us.imdb.com|0|0\n");
        input.extend_from_slice(b"2|Cit\xe9 des enfants perdus, La (1995)|01-Jan-1995\n");

        let titles = io::titles_from_reader(&input[..], "u.item").unwrap();

        assert_eq!(titles.len(), 2);
        assert_eq!(titles.title(1), "Toy Story (1995)");
        assert_eq!(titles.title(2), "Cit\u{e9} des enfants perdus, La (1995)");
        assert_eq!(titles.title(3), "");
    }
}
