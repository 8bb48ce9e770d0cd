use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BioSearchError>;

#[derive(Error, Debug)]
pub enum BioSearchError {
    #[error("Apify API token is not set (APIFY_API_KEY or --token)")]
    MissingCredential,

    #[error("Target account is not set (BIO_SEARCH_TARGET or --target)")]
    MissingTarget,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session file {path} is unreadable: {source}")]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Export error: {0}")]
    Export(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<csv::Error> for BioSearchError {
    fn from(err: csv::Error) -> Self {
        BioSearchError::Export(err.to_string())
    }
}
