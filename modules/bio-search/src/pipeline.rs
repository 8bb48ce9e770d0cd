use std::collections::HashSet;

use apify_client::{
    FollowerItem, FollowersScraperInput, InstagramProfile, ProfileScraperInput,
    INSTAGRAM_FOLLOWERS_SCRAPER, INSTAGRAM_PROFILE_SCRAPER,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::SearchParams;
use crate::error::Result;
use crate::filter;
use crate::session::Session;
use crate::traits::ActorRunner;
use crate::types::{Follower, Match, Profile};

/// Where this run's follower list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowerSource {
    Fetched(usize),
    Cached(usize),
}

/// Result of one profile batch that got as far as filtering.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub followers: FollowerSource,
    pub requested: usize,
    pub fetched: usize,
    /// Requested usernames the profile actor left out; they stay pending.
    pub unreturned: usize,
    pub newly_processed: usize,
    pub new_matches: Vec<Match>,
    pub total_matches: usize,
    pub remaining: usize,
}

/// How a run ended. Remote failures stop the run at their stage and carry
/// the reason; the session is left as it was before that stage.
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    FollowersUnavailable { reason: String },
    AllProcessed { followers: usize },
    ProfilesUnavailable { requested: usize, reason: String },
    Batch(BatchReport),
}

impl BatchOutcome {
    /// True when another run would fetch more profiles.
    pub fn has_more(&self) -> bool {
        matches!(self, BatchOutcome::Batch(r) if r.remaining > 0 && r.unreturned < r.requested)
    }

    /// The run stopped at a remote stage.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            BatchOutcome::FollowersUnavailable { .. } | BatchOutcome::ProfilesUnavailable { .. }
        )
    }
}

pub struct BioSearch<R> {
    runner: R,
}

impl<R: ActorRunner> BioSearch<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// One run: make sure followers are cached, fetch the next slice of
    /// pending profiles, record the ones whose bio contains the keyword.
    pub async fn run_batch(&self, session: &mut Session, params: &SearchParams) -> BatchOutcome {
        session.select_target(&params.target);

        // Stage 1: follower list, fetched once per target
        let source = if session.has_followers() {
            let cached = session.followers().len();
            info!(account = %params.target, cached, "Using cached follower list");
            FollowerSource::Cached(cached)
        } else {
            match self.fetch_followers(params).await {
                Ok(followers) if !followers.is_empty() => {
                    session.cache_followers(followers);
                    let fetched = session.followers().len();
                    info!(account = %params.target, fetched, "Cached follower list");
                    FollowerSource::Fetched(fetched)
                }
                Ok(_) => {
                    warn!(account = %params.target, "Follower scrape returned no usable rows");
                    return BatchOutcome::FollowersUnavailable {
                        reason: "no followers returned".to_string(),
                    };
                }
                Err(reason) => {
                    warn!(account = %params.target, %reason, "Follower scrape failed");
                    return BatchOutcome::FollowersUnavailable { reason };
                }
            }
        };

        let pending = session.pending_count();
        if pending == 0 {
            info!(account = %params.target, "Every follower already processed");
            return BatchOutcome::AllProcessed {
                followers: session.followers().len(),
            };
        }

        // Stage 2: profiles for the next pending slice
        let batch = session.next_batch(params.max_profiles as usize);
        info!(requested = batch.len(), pending, "Fetching profile batch");

        let profiles = match self.fetch_profiles(&batch, params).await {
            Ok(profiles) if !profiles.is_empty() => profiles,
            Ok(_) => {
                warn!(requested = batch.len(), "Profile scrape returned no usable rows");
                return BatchOutcome::ProfilesUnavailable {
                    requested: batch.len(),
                    reason: "no profiles returned".to_string(),
                };
            }
            Err(reason) => {
                warn!(requested = batch.len(), %reason, "Profile scrape failed");
                return BatchOutcome::ProfilesUnavailable {
                    requested: batch.len(),
                    reason,
                };
            }
        };

        let returned: HashSet<&str> = profiles.iter().map(|p| p.username.as_str()).collect();
        let unreturned = batch.iter().filter(|u| !returned.contains(u.as_str())).count();
        if unreturned > 0 {
            warn!(unreturned, requested = batch.len(), "Profiles missing from the result stay pending");
        }

        let newly_processed = session.mark_processed(&profiles);
        let new_matches = filter::find_new_matches(&profiles, &params.keyword, session);
        session.record_matches(new_matches.clone());

        let report = BatchReport {
            followers: source,
            requested: batch.len(),
            fetched: profiles.len(),
            unreturned,
            newly_processed,
            new_matches,
            total_matches: session.matches().len(),
            remaining: pending - batch.len(),
        };
        info!(
            fetched = report.fetched,
            new_matches = report.new_matches.len(),
            total_matches = report.total_matches,
            remaining = report.remaining,
            "Profile batch filtered"
        );
        BatchOutcome::Batch(report)
    }

    /// Keep running batches until nothing is pending, a stage fails, or a
    /// batch makes no progress. `on_batch` sees the session after every run
    /// (the CLI persists it there); its error stops the loop.
    pub async fn run_until_done<F>(
        &self,
        session: &mut Session,
        params: &SearchParams,
        mut on_batch: F,
    ) -> Result<Vec<BatchOutcome>>
    where
        F: FnMut(&Session, &BatchOutcome) -> Result<()>,
    {
        let mut outcomes = Vec::new();
        loop {
            let outcome = self.run_batch(session, params).await;
            on_batch(session, &outcome)?;
            let more = outcome.has_more();
            outcomes.push(outcome);
            if !more {
                break;
            }
            tokio::task::yield_now().await;
        }
        Ok(outcomes)
    }

    async fn fetch_followers(&self, params: &SearchParams) -> std::result::Result<Vec<Follower>, String> {
        let input = FollowersScraperInput {
            usernames: vec![params.target.clone()],
            max_count: params.max_followers,
        };
        let rows = self
            .run(INSTAGRAM_FOLLOWERS_SCRAPER, &input, params.followers_timeout)
            .await?;

        Ok(decode_rows::<FollowerItem>(rows)
            .into_iter()
            .filter_map(Follower::from_item)
            .collect())
    }

    async fn fetch_profiles(
        &self,
        usernames: &[String],
        params: &SearchParams,
    ) -> std::result::Result<Vec<Profile>, String> {
        let input = ProfileScraperInput {
            usernames: usernames.to_vec(),
        };
        let rows = self
            .run(INSTAGRAM_PROFILE_SCRAPER, &input, params.profiles_timeout)
            .await?;

        Ok(decode_rows::<InstagramProfile>(rows)
            .into_iter()
            .filter_map(Profile::from_item)
            .collect())
    }

    async fn run<I: serde::Serialize>(
        &self,
        actor_id: &str,
        input: &I,
        timeout: std::time::Duration,
    ) -> std::result::Result<Vec<Value>, String> {
        let input = serde_json::to_value(input).map_err(|e| e.to_string())?;
        self.runner
            .run_actor(actor_id, input, timeout)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Decode loosely typed rows, dropping the ones that don't fit.
fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<T>(row) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "Skipping malformed dataset row");
                None
            }
        })
        .collect()
}
