use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{BioSearchError, Result};

pub const DEFAULT_KEYWORD: &str = "05";
pub const DEFAULT_MAX_FOLLOWERS: u32 = 1000;
pub const DEFAULT_MAX_PROFILES: u32 = 100;
pub const DEFAULT_STATE_FILE: &str = "bio_search_session.json";

pub const MAX_FOLLOWERS_RANGE: RangeInclusive<u32> = 100..=2000;
pub const MAX_PROFILES_RANGE: RangeInclusive<u32> = 50..=500;

pub const FOLLOWERS_TIMEOUT: Duration = Duration::from_secs(300);
pub const PROFILES_TIMEOUT: Duration = Duration::from_secs(600);

/// Rough Apify pricing, USD per row.
const FOLLOWER_COST_USD: f64 = 0.001;
const PROFILE_COST_USD: f64 = 0.01;

/// Application configuration: `.env`, then environment, then CLI overrides.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Apify
    pub apify_api_key: Option<String>,
    pub apify_base_url: String,

    // Search
    pub target: Option<String>,
    pub keyword: String,
    pub max_followers: u32,
    pub max_profiles: u32,

    // Session persistence
    pub state_file: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            apify_api_key: get("APIFY_API_KEY"),
            apify_base_url: get("APIFY_BASE_URL")
                .unwrap_or_else(|| apify_client::DEFAULT_BASE_URL.to_string()),
            target: get("BIO_SEARCH_TARGET"),
            keyword: lookup("BIO_SEARCH_KEYWORD").unwrap_or_else(|| DEFAULT_KEYWORD.to_string()),
            max_followers: parse_number("BIO_SEARCH_MAX_FOLLOWERS", get("BIO_SEARCH_MAX_FOLLOWERS"))?
                .unwrap_or(DEFAULT_MAX_FOLLOWERS),
            max_profiles: parse_number("BIO_SEARCH_MAX_PROFILES", get("BIO_SEARCH_MAX_PROFILES"))?
                .unwrap_or(DEFAULT_MAX_PROFILES),
            state_file: get("BIO_SEARCH_STATE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
        })
    }

    pub fn api_key(&self) -> Result<&str> {
        self.apify_api_key
            .as_deref()
            .ok_or(BioSearchError::MissingCredential)
    }

    /// Validated parameters for one search run. The target must be set.
    pub fn search_params(&self) -> Result<SearchParams> {
        let target = self
            .target
            .as_deref()
            .map(|t| t.trim().trim_start_matches('@'))
            .filter(|t| !t.is_empty())
            .ok_or(BioSearchError::MissingTarget)?;

        check_range("max followers", self.max_followers, &MAX_FOLLOWERS_RANGE)?;
        check_range("max profiles per run", self.max_profiles, &MAX_PROFILES_RANGE)?;

        Ok(SearchParams {
            target: target.to_string(),
            keyword: self.keyword.clone(),
            max_followers: self.max_followers,
            max_profiles: self.max_profiles,
            followers_timeout: FOLLOWERS_TIMEOUT,
            profiles_timeout: PROFILES_TIMEOUT,
        })
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let head: String = val.chars().take(5).collect();
            format!("{}...({} chars)", head, val.len())
        }

        tracing::info!("Config loaded:");
        tracing::info!(
            "  APIFY_API_KEY: {}",
            self.apify_api_key
                .as_deref()
                .map(preview)
                .unwrap_or_else(|| "<not set>".to_string())
        );
        tracing::info!("  APIFY_BASE_URL: {}", self.apify_base_url);
        tracing::info!(
            "  BIO_SEARCH_TARGET: {}",
            self.target.as_deref().unwrap_or("<not set>")
        );
        tracing::info!("  BIO_SEARCH_STATE: {}", self.state_file.display());
    }
}

fn parse_number(key: &str, raw: Option<String>) -> Result<Option<u32>> {
    raw.map(|v| {
        v.trim()
            .parse::<u32>()
            .map_err(|_| BioSearchError::Config(format!("{key} must be a whole number, got {v:?}")))
    })
    .transpose()
}

fn check_range(name: &str, value: u32, range: &RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(BioSearchError::Config(format!(
            "{name} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

/// Everything one search run needs besides the session itself.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub target: String,
    pub keyword: String,
    pub max_followers: u32,
    pub max_profiles: u32,
    pub followers_timeout: Duration,
    pub profiles_timeout: Duration,
}

impl SearchParams {
    pub fn estimated_cost(&self) -> CostEstimate {
        CostEstimate {
            followers_usd: self.max_followers as f64 * FOLLOWER_COST_USD,
            profiles_usd: self.max_profiles as f64 * PROFILE_COST_USD,
        }
    }
}

/// Upper-bound Apify spend for a single run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    pub followers_usd: f64,
    pub profiles_usd: f64,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.keyword, "05");
        assert_eq!(config.max_followers, 1000);
        assert_eq!(config.max_profiles, 100);
        assert_eq!(config.apify_base_url, "https://api.apify.com/v2");
        assert_eq!(config.state_file, PathBuf::from(DEFAULT_STATE_FILE));
    }

    #[test]
    fn missing_credential_and_target_are_reported() {
        let config = config_from(&[("APIFY_API_KEY", "  ")]).unwrap();
        assert!(matches!(config.api_key(), Err(BioSearchError::MissingCredential)));
        assert!(matches!(config.search_params(), Err(BioSearchError::MissingTarget)));
    }

    #[test]
    fn target_loses_leading_at_sign() {
        let config = config_from(&[("BIO_SEARCH_TARGET", "@someone")]).unwrap();
        assert_eq!(config.search_params().unwrap().target, "someone");
    }

    #[test]
    fn non_numeric_cap_is_a_config_error() {
        let err = config_from(&[("BIO_SEARCH_MAX_FOLLOWERS", "lots")]).unwrap_err();
        assert!(matches!(err, BioSearchError::Config(_)));
    }

    #[test]
    fn caps_outside_their_range_are_rejected() {
        let config = config_from(&[
            ("BIO_SEARCH_TARGET", "someone"),
            ("BIO_SEARCH_MAX_PROFILES", "10"),
        ])
        .unwrap();
        let err = config.search_params().unwrap_err();
        assert!(err.to_string().contains("between 50 and 500"));
    }

    #[test]
    fn cost_estimate_scales_with_caps() {
        let config = config_from(&[
            ("BIO_SEARCH_TARGET", "someone"),
            ("BIO_SEARCH_MAX_FOLLOWERS", "1000"),
            ("BIO_SEARCH_MAX_PROFILES", "100"),
        ])
        .unwrap();
        let cost = config.search_params().unwrap().estimated_cost();
        assert!((cost.followers_usd - 1.0).abs() < 1e-9);
        assert!((cost.profiles_usd - 1.0).abs() < 1e-9);
    }
}
