use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Run metadata ---

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunData {
    pub fn run_status(&self) -> RunStatus {
        RunStatus::parse(&self.status)
    }
}

/// Lifecycle state of an actor run as reported by `GET /actor-runs/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Ready,
    Running,
    Succeeded,
    Failed,
    TimingOut,
    TimedOut,
    Aborting,
    Aborted,
    Other(String),
}

impl RunStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "READY" => RunStatus::Ready,
            "RUNNING" => RunStatus::Running,
            "SUCCEEDED" => RunStatus::Succeeded,
            "FAILED" => RunStatus::Failed,
            "TIMING-OUT" => RunStatus::TimingOut,
            "TIMED-OUT" => RunStatus::TimedOut,
            "ABORTING" => RunStatus::Aborting,
            "ABORTED" => RunStatus::Aborted,
            other => RunStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Ready => "READY",
            RunStatus::Running => "RUNNING",
            RunStatus::Succeeded => "SUCCEEDED",
            RunStatus::Failed => "FAILED",
            RunStatus::TimingOut => "TIMING-OUT",
            RunStatus::TimedOut => "TIMED-OUT",
            RunStatus::Aborting => "ABORTING",
            RunStatus::Aborted => "ABORTED",
            RunStatus::Other(s) => s,
        }
    }

    /// Terminal states that will never produce a dataset worth reading.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            RunStatus::Failed | RunStatus::Aborted | RunStatus::TimedOut
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Instagram followers scraper types ---

/// Input for the datadoping/instagram-followers-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct FollowersScraperInput {
    pub usernames: Vec<String>,
    pub max_count: u32,
}

/// A single follower row from the followers scraper dataset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FollowerItem {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub is_private: Option<bool>,
    pub is_verified: Option<bool>,
}

// --- Instagram profile scraper types ---

/// Input for the apify/instagram-profile-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileScraperInput {
    pub usernames: Vec<String>,
}

/// A single profile row from the profile scraper dataset.
/// Every field is optional: private or deleted accounts come back sparse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstagramProfile {
    pub username: Option<String>,
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
    pub biography: Option<String>,
    #[serde(rename = "followersCount")]
    pub followers_count: Option<i64>,
    #[serde(rename = "followsCount")]
    pub follows_count: Option<i64>,
    pub verified: Option<bool>,
    #[serde(rename = "isBusinessAccount")]
    pub is_business_account: Option<bool>,
    #[serde(rename = "externalUrl")]
    pub external_url: Option<String>,
    pub private: Option<bool>,
}
