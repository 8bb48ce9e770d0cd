// Resume bookkeeping for one operator session.
//
// The session remembers which followers of the active target have already
// had their profile fetched, so each run only pays for the next slice of
// pending usernames. Matches outlive target switches; only `reset` drops them.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Follower, Match, Profile};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    current_target: String,
    processed: HashSet<String>,
    followers: Vec<Follower>,
    privacy: HashMap<String, bool>,
    matches: Vec<Match>,
    updated_at: Option<DateTime<Utc>>,
}

/// Counts shown to the operator between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub target: String,
    pub followers: usize,
    pub processed: usize,
    pub pending: usize,
    pub matches: usize,
    pub public_matches: usize,
    pub private_matches: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_target(&self) -> &str {
        &self.current_target
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Make `target` the active account. Switching away from a previous
    /// target forgets its followers and progress but keeps the matches.
    /// Returns true when progress was discarded.
    pub fn select_target(&mut self, target: &str) -> bool {
        if target.is_empty() || target == self.current_target {
            return false;
        }

        let discarded = !self.current_target.is_empty();
        if discarded {
            tracing::info!(
                from = %self.current_target,
                to = target,
                kept_matches = self.matches.len(),
                "Target changed, clearing follower cache and progress"
            );
            self.processed.clear();
            self.followers.clear();
            self.privacy.clear();
        }
        self.current_target = target.to_string();
        self.touch();
        discarded
    }

    /// Drop the cached follower list so the next run fetches it again.
    /// Progress and matches stay.
    pub fn refetch_followers(&mut self) {
        self.followers.clear();
        self.privacy.clear();
        self.touch();
    }

    /// Forget everything, matches included.
    pub fn reset(&mut self) {
        *self = Session {
            updated_at: Some(Utc::now()),
            ..Session::default()
        };
    }

    pub fn has_followers(&self) -> bool {
        !self.followers.is_empty()
    }

    pub fn followers(&self) -> &[Follower] {
        &self.followers
    }

    /// Cache a freshly fetched follower list and rebuild the privacy lookup.
    /// Duplicate usernames keep their first occurrence.
    pub fn cache_followers(&mut self, followers: Vec<Follower>) {
        let mut seen = HashSet::new();
        self.followers = followers
            .into_iter()
            .filter(|f| seen.insert(f.username.clone()))
            .collect();
        self.privacy = self
            .followers
            .iter()
            .map(|f| (f.username.clone(), f.is_private))
            .collect();
        self.touch();
    }

    /// (total, public, private)
    pub fn follower_counts(&self) -> (usize, usize, usize) {
        let public = self.followers.iter().filter(|f| !f.is_private).count();
        (self.followers.len(), public, self.followers.len() - public)
    }

    /// True when `username` is in the cached follower list of the active target.
    pub fn in_lookup(&self, username: &str) -> bool {
        self.privacy.contains_key(username)
    }

    /// Privacy of a follower; usernames missing from the lookup count as private.
    pub fn is_private(&self, username: &str) -> bool {
        self.privacy.get(username).copied().unwrap_or(true)
    }

    pub fn is_processed(&self, username: &str) -> bool {
        self.processed.contains(username)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Follower usernames whose profile has not been fetched yet, in follower order.
    pub fn pending_usernames(&self) -> Vec<&str> {
        self.followers
            .iter()
            .map(|f| f.username.as_str())
            .filter(|u| !self.processed.contains(*u))
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.followers
            .iter()
            .filter(|f| !self.processed.contains(&f.username))
            .count()
    }

    /// The next slice of pending usernames to fetch, at most `max_profiles` long.
    pub fn next_batch(&self, max_profiles: usize) -> Vec<String> {
        self.pending_usernames()
            .into_iter()
            .take(max_profiles)
            .map(String::from)
            .collect()
    }

    /// Mark every returned profile as processed, whether or not it matched.
    /// Returns how many usernames were new to the processed set.
    pub fn mark_processed(&mut self, profiles: &[Profile]) -> usize {
        let before = self.processed.len();
        self.processed
            .extend(profiles.iter().map(|p| p.username.clone()));
        self.touch();
        self.processed.len() - before
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn has_match(&self, username: &str) -> bool {
        self.matches.iter().any(|m| m.username == username)
    }

    /// Append matches, skipping usernames already held. Returns how many were added.
    pub fn record_matches(&mut self, new_matches: Vec<Match>) -> usize {
        let mut held: HashSet<String> = self.matches.iter().map(|m| m.username.clone()).collect();
        let before = self.matches.len();
        for m in new_matches {
            if held.insert(m.username.clone()) {
                self.matches.push(m);
            }
        }
        self.touch();
        self.matches.len() - before
    }

    pub fn stats(&self) -> SessionStats {
        let public_matches = self.matches.iter().filter(|m| !m.is_private).count();
        SessionStats {
            target: self.current_target.clone(),
            followers: self.followers.len(),
            processed: self.processed.len(),
            pending: self.pending_count(),
            matches: self.matches.len(),
            public_matches,
            private_matches: self.matches.len() - public_matches,
            updated_at: self.updated_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
