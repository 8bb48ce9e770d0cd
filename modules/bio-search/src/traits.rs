// Seam between the search pipeline and the scraping backend.
//
// ActorRunner: submit a job, wait for it, return its rows loosely typed.
// Production uses ApifyClient; tests use testing::MockRunner.

use std::time::Duration;

use apify_client::ApifyClient;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait ActorRunner: Send + Sync {
    /// Run `actor_id` with `input` and return its dataset rows once it succeeds.
    async fn run_actor(
        &self,
        actor_id: &str,
        input: Value,
        timeout: Duration,
    ) -> apify_client::Result<Vec<Value>>;
}

#[async_trait]
impl ActorRunner for ApifyClient {
    async fn run_actor(
        &self,
        actor_id: &str,
        input: Value,
        timeout: Duration,
    ) -> apify_client::Result<Vec<Value>> {
        ApifyClient::run_actor(self, actor_id, &input, timeout).await
    }
}
