use apify_client::{FollowerItem, InstagramProfile};
use serde::{Deserialize, Serialize};

pub const PROFILE_URL_PREFIX: &str = "https://www.instagram.com/";

/// Public profile URL for a username.
pub fn profile_url(username: &str) -> String {
    format!("{PROFILE_URL_PREFIX}{username}/")
}

// --- Followers ---

/// One follower of the target account. Unique by `username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follower {
    pub username: String,
    pub is_private: bool,
}

impl Follower {
    /// Rows without a username are unusable. Unknown privacy counts as private.
    pub fn from_item(item: FollowerItem) -> Option<Self> {
        let username = item.username.filter(|u| !u.trim().is_empty())?;
        Some(Self {
            username,
            is_private: item.is_private.unwrap_or(true),
        })
    }
}

// --- Profiles ---

/// Profile details for one follower, as returned by the profile scraper.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub username: String,
    pub full_name: String,
    pub biography: Option<String>,
    pub followers_count: Option<i64>,
    pub follows_count: Option<i64>,
    pub verified: bool,
    pub is_business_account: bool,
    pub external_url: Option<String>,
}

impl Profile {
    pub fn from_item(item: InstagramProfile) -> Option<Self> {
        let username = item.username.filter(|u| !u.trim().is_empty())?;
        Some(Self {
            username,
            full_name: item.full_name.unwrap_or_default(),
            biography: item.biography,
            followers_count: item.followers_count,
            follows_count: item.follows_count,
            verified: item.verified.unwrap_or(false),
            is_business_account: item.is_business_account.unwrap_or(false),
            external_url: item.external_url,
        })
    }

    /// Biography text, empty when the profile has none.
    pub fn bio(&self) -> &str {
        self.biography.as_deref().unwrap_or("")
    }
}

// --- Matches ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn from_private(is_private: bool) -> Self {
        if is_private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Visibility::Public => "Public",
            Visibility::Private => "Private",
        }
    }
}

/// A follower whose biography contained the keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub username: String,
    pub full_name: String,
    pub bio: String,
    #[serde(rename = "url")]
    pub profile_url: String,
    pub is_private: bool,
    pub status: Visibility,
}

impl Match {
    pub fn from_profile(profile: &Profile, is_private: bool) -> Self {
        Self {
            username: profile.username.clone(),
            full_name: profile.full_name.clone(),
            bio: profile.bio().to_string(),
            profile_url: profile_url(&profile.username),
            is_private,
            status: Visibility::from_private(is_private),
        }
    }
}
