use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to retrieve a listing page or a bill document.
///
/// Never fatal: the pipeline logs it and drops the session or document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failure to produce the CSV report. Aborts the run.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("could not create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not write to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("could not flush {}: {source}", path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid keyword pattern '{pattern}': {source}")]
    Keyword {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid document extension '{extension}': {source}")]
    Extension {
        extension: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid year '{0}' (expected a comma-separated list of integers)")]
    Year(String),
    #[error("at least one year is required")]
    NoYears,
}
