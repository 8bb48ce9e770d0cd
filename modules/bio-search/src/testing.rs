// Test mocks for the search pipeline.
//
// MockRunner (ActorRunner) answers actor runs from queued responses. With
// `with_bios` it also answers profile runs on the fly: one row per requested
// username, biography looked up from the map.
//
// Plus helpers for follower rows and SearchParams.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use apify_client::{ApifyError, INSTAGRAM_PROFILE_SCRAPER};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::{SearchParams, FOLLOWERS_TIMEOUT, PROFILES_TIMEOUT};
use crate::traits::ActorRunner;

/// Biography given to profiles the bio map doesn't mention.
pub const DEFAULT_BIO: &str = "no keyword here";

/// One call observed by the mock.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub actor_id: String,
    pub input: Value,
    pub timeout: Duration,
}

enum Scripted {
    Rows(Vec<Value>),
    Fail(String),
}

pub struct MockRunner {
    queued: Mutex<HashMap<String, VecDeque<Scripted>>>,
    bios: Option<HashMap<String, String>>,
    missing_profiles: Vec<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            queued: Mutex::new(HashMap::new()),
            bios: None,
            missing_profiles: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue rows for the next run of `actor_id`.
    pub fn on_run(self, actor_id: &str, rows: Vec<Value>) -> Self {
        self.push(actor_id, Scripted::Rows(rows))
    }

    /// Queue a terminal failure (e.g. "FAILED") for the next run of `actor_id`.
    pub fn on_failure(self, actor_id: &str, status: &str) -> Self {
        self.push(actor_id, Scripted::Fail(status.to_string()))
    }

    /// Answer profile runs dynamically from a username → biography map.
    pub fn with_bios(mut self, bios: &[(&str, &str)]) -> Self {
        self.bios = Some(
            bios.iter()
                .map(|(u, b)| (u.to_string(), b.to_string()))
                .collect(),
        );
        self
    }

    /// Usernames the dynamic profile answer leaves out, as the scraper does
    /// for deleted or blocked accounts.
    pub fn without_profiles(mut self, usernames: &[&str]) -> Self {
        self.missing_profiles = usernames.iter().map(|u| u.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, actor_id: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.actor_id == actor_id)
            .collect()
    }

    /// Every username requested from the profile actor, in request order.
    pub fn requested_profiles(&self) -> Vec<String> {
        self.calls_for(INSTAGRAM_PROFILE_SCRAPER)
            .iter()
            .flat_map(|c| requested_usernames(&c.input))
            .collect()
    }

    fn push(self, actor_id: &str, scripted: Scripted) -> Self {
        self.queued
            .lock()
            .unwrap()
            .entry(actor_id.to_string())
            .or_default()
            .push_back(scripted);
        self
    }

    fn profile_rows(&self, bios: &HashMap<String, String>, input: &Value) -> Vec<Value> {
        requested_usernames(input)
            .into_iter()
            .filter(|u| !self.missing_profiles.contains(u))
            .map(|u| {
                let bio = bios.get(&u).cloned().unwrap_or_else(|| DEFAULT_BIO.to_string());
                json!({
                    "username": u,
                    "fullName": format!("{u} name"),
                    "biography": bio,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ActorRunner for MockRunner {
    async fn run_actor(
        &self,
        actor_id: &str,
        input: Value,
        timeout: Duration,
    ) -> apify_client::Result<Vec<Value>> {
        self.calls.lock().unwrap().push(RecordedCall {
            actor_id: actor_id.to_string(),
            input: input.clone(),
            timeout,
        });

        let scripted = self
            .queued
            .lock()
            .unwrap()
            .get_mut(actor_id)
            .and_then(|q| q.pop_front());

        match scripted {
            Some(Scripted::Rows(rows)) => Ok(rows),
            Some(Scripted::Fail(status)) => Err(ApifyError::RunFailed {
                run_id: "mock-run".to_string(),
                status,
            }),
            None => match &self.bios {
                Some(bios) if actor_id == INSTAGRAM_PROFILE_SCRAPER => {
                    Ok(self.profile_rows(bios, &input))
                }
                _ => Err(ApifyError::Api {
                    status: 404,
                    message: format!("no mock response for {actor_id}"),
                }),
            },
        }
    }
}

fn requested_usernames(input: &Value) -> Vec<String> {
    input["usernames"]
        .as_array()
        .map(|names| {
            names
                .iter()
                .filter_map(|n| n.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Username of the i-th generated follower.
pub fn follower_name(i: usize) -> String {
    format!("user_{i:03}")
}

/// `n` follower rows; every third one is private.
pub fn follower_rows(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| json!({ "username": follower_name(i), "is_private": i % 3 == 0 }))
        .collect()
}

pub fn params(target: &str, keyword: &str, max_followers: u32, max_profiles: u32) -> SearchParams {
    SearchParams {
        target: target.to_string(),
        keyword: keyword.to_string(),
        max_followers,
        max_profiles,
        followers_timeout: FOLLOWERS_TIMEOUT,
        profiles_timeout: PROFILES_TIMEOUT,
    }
}
