use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApifyError>;

/// Longest slice of an error body carried into `ApifyError::Api`.
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Error)]
pub enum ApifyError {
    #[error("request to Apify failed: {0}")]
    Network(String),

    #[error("Apify returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("could not decode Apify response: {0}")]
    Parse(String),

    #[error("actor run {run_id} ended with status {status}")]
    RunFailed { run_id: String, status: String },

    #[error("actor run {run_id} still unfinished after {waited_secs}s")]
    Timeout { run_id: String, waited_secs: u64 },
}

impl ApifyError {
    /// Build an `Api` error from a non-success response, keeping the head of the body.
    pub(crate) async fn from_response(resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let message = body.chars().take(MAX_ERROR_BODY).collect();
        ApifyError::Api { status, message }
    }
}

impl From<reqwest::Error> for ApifyError {
    fn from(err: reqwest::Error) -> Self {
        ApifyError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ApifyError {
    fn from(err: serde_json::Error) -> Self {
        ApifyError::Parse(err.to_string())
    }
}
