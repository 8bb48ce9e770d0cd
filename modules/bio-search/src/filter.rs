use std::collections::HashSet;

use crate::session::Session;
use crate::types::{Match, Profile};

/// Literal, case-sensitive substring test. A missing bio is the empty string.
pub fn bio_contains(bio: Option<&str>, keyword: &str) -> bool {
    bio.unwrap_or("").contains(keyword)
}

/// Profiles from this batch whose bio contains `keyword`, whose username is
/// a cached follower of the active target, and which the session does not
/// already hold (or matched earlier in the batch).
pub fn find_new_matches(profiles: &[Profile], keyword: &str, session: &Session) -> Vec<Match> {
    let mut seen: HashSet<&str> = HashSet::new();

    profiles
        .iter()
        .filter(|p| bio_contains(p.biography.as_deref(), keyword))
        .filter(|p| session.in_lookup(&p.username))
        .filter(|p| !session.has_match(&p.username) && seen.insert(p.username.as_str()))
        .map(|p| Match::from_profile(p, session.is_private(&p.username)))
        .collect()
}
