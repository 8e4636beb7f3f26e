use std::io;

use thiserror::Error;

/// Failures while loading rating data or building models from it.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed input: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed record in {source_name} at line {line}: {reason}")]
    Malformed {
        source_name: String,
        line: u64,
        reason: String,
    },

    #[error("no records found in {0}")]
    Empty(String),

    #[error("user {0} is referenced by a rating but missing from the user index")]
    UnknownUser(u32),

    #[error("item {0} is referenced by a rating but missing from the item index")]
    UnknownItem(u32),

    #[error("no unused user id left for the attacker")]
    NoFreeUserId,
}

/// Invalid experiment settings, detected before any model gets built.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tau must be a finite, non-negative number (got {0})")]
    InvalidTau(f64),

    #[error("the extreme rating must be a finite, positive number (got {0})")]
    InvalidExtremeRating(f64),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Everything that can go wrong while setting up the scenarios.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
