use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("HTTP {status} while fetching {url}")]
    Fetch { url: String, status: u16 },

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Soft failures of the language model backend: the caller is expected
    /// to degrade (placeholder summary, 502) instead of aborting.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Error::Generation(_) | Error::Timeout(_))
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::InvalidUrl(e.to_string())
    }
}
