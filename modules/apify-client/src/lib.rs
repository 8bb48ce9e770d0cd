pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    FollowerItem, FollowersScraperInput, InstagramProfile, ProfileScraperInput, RunData,
    RunStatus,
};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;
use types::ApiResponse;

pub const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for datadoping/instagram-followers-scraper.
pub const INSTAGRAM_FOLLOWERS_SCRAPER: &str = "datadoping~instagram-followers-scraper";

/// Actor ID for apify/instagram-profile-scraper.
pub const INSTAGRAM_PROFILE_SCRAPER: &str = "apify~instagram-profile-scraper";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
    poll_interval: Duration,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Point the client at another API root (a proxy, or a local fake in tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize + ?Sized>(&self, actor_id: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApifyError::from_response(resp).await);
        }

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Fetch the current metadata of a run.
    pub async fn get_run(&self, run_id: &str) -> Result<RunData> {
        let url = format!("{}/actor-runs/{}", self.base_url, run_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApifyError::from_response(resp).await);
        }

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll at a fixed interval until the run reaches a terminal state or
    /// `timeout` elapses. A failed poll request ends the wait.
    pub async fn wait_for_run(&self, run_id: &str, timeout: Duration) -> Result<RunData> {
        let started = Instant::now();

        while started.elapsed() < timeout {
            let run = self.get_run(run_id).await?;
            let status = run.run_status();
            tracing::info!(run_id, status = %status, "Polled actor run");

            if status == RunStatus::Succeeded {
                return Ok(run);
            }
            if status.is_failure() {
                return Err(ApifyError::RunFailed {
                    run_id: run_id.to_string(),
                    status: status.to_string(),
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        Err(ApifyError::Timeout {
            run_id: run_id.to_string(),
            waited_secs: timeout.as_secs(),
        })
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json", self.base_url, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApifyError::from_response(resp).await);
        }

        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    /// Run an actor end-to-end: start run, poll, fetch its dataset rows untyped.
    pub async fn run_actor<I: Serialize + ?Sized>(
        &self,
        actor_id: &str,
        input: &I,
        timeout: Duration,
    ) -> Result<Vec<serde_json::Value>> {
        tracing::info!(actor_id, timeout_secs = timeout.as_secs(), "Starting actor run");

        let run = self.start_run(actor_id, input).await?;
        tracing::info!(run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id, timeout).await?;
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        let rows: Vec<serde_json::Value> = self
            .get_dataset_items(&completed.default_dataset_id)
            .await?;
        tracing::info!(actor_id, count = rows.len(), "Fetched dataset rows");

        Ok(rows)
    }
}
