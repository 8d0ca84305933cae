//! Error taxonomy for the data-source and persistence boundaries.
//!
//! Malformed rows and unparseable date phrases never become errors; the
//! extractor drops them where they occur.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The availability table could not be produced.
    #[error("data source error: {0}")]
    DataSource(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Credentials for the sheet could not be decoded or exchanged.
    #[error("auth error: {0}")]
    Auth(String),

    /// A blob could not be read, decoded or written.
    #[error("persistence error: {0}")]
    Persistence(String),
}
