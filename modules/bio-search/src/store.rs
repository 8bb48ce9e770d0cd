use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{BioSearchError, Result};
use crate::session::Session;

/// JSON file holding the session between CLI invocations.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is a fresh session; an unparsable one is an error so
    /// accumulated matches are never silently dropped.
    pub fn load(&self) -> Result<Session> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No session file found, starting fresh");
                return Ok(Session::new());
            }
            Err(e) => return Err(e.into()),
        };

        let session: Session =
            serde_json::from_str(&content).map_err(|source| BioSearchError::CorruptState {
                path: self.path.clone(),
                source,
            })?;

        info!(
            path = %self.path.display(),
            account = session.current_target(),
            processed = session.processed_count(),
            matches = session.matches().len(),
            "Resumed previous session"
        );
        Ok(session)
    }

    /// Write via a sibling temp file and rename, so a crash mid-write leaves
    /// the previous state intact.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(session)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Follower, Match, Profile};

    fn profile(name: &str, bio: &str) -> Profile {
        Profile {
            username: name.into(),
            full_name: format!("{name} full"),
            biography: Some(bio.into()),
            followers_count: None,
            follows_count: None,
            verified: false,
            is_business_account: false,
            external_url: None,
        }
    }

    #[test]
    fn missing_file_loads_fresh_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("absent.json"));
        let session = store.load().unwrap();
        assert_eq!(session.current_target(), "");
        assert!(session.matches().is_empty());
    }

    #[test]
    fn saved_session_resumes_with_progress() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        let mut session = Session::new();
        session.select_target("target");
        session.cache_followers(vec![
            Follower { username: "a".into(), is_private: false },
            Follower { username: "b".into(), is_private: true },
        ]);
        let p = profile("a", "DM 05 only");
        session.mark_processed(std::slice::from_ref(&p));
        session.record_matches(vec![Match::from_profile(&p, false)]);
        store.save(&session).unwrap();

        let resumed = store.load().unwrap();
        assert_eq!(resumed.current_target(), "target");
        assert!(resumed.is_processed("a"));
        assert!(resumed.is_private("b"));
        assert_eq!(resumed.pending_count(), 1);
        assert_eq!(resumed.matches(), session.matches());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SessionStore::new(path.clone()).load().unwrap_err();
        assert!(matches!(err, BioSearchError::CorruptState { .. }));
    }
}
