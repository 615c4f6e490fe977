//! Session lifecycle: `NoSession → LoggingIn → Active → Expired →
//! Refreshing → Active|Failed` (spec §4.1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Opaque cookies + storage, shaped the way Playwright's
/// `storage_state()` serializes a context (cookies + localStorage per
/// origin), so it round-trips straight back into `context_builder()
/// .storage_state(...)` on the next run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub publication_slug: String,
    pub captured_at: DateTime<Utc>,
    pub storage_state: serde_json::Value,
}

impl SessionState {
    pub fn new(publication_slug: impl Into<String>, storage_state: serde_json::Value) -> Self {
        Self {
            publication_slug: publication_slug.into(),
            captured_at: Utc::now(),
            storage_state,
        }
    }

    /// A session older than `max_age_days` is treated as `Expired` without
    /// needing a round trip to the publication.
    pub fn is_stale(&self, max_age_days: i64) -> bool {
        Utc::now().signed_duration_since(self.captured_at).num_days() >= max_age_days
    }

    /// Writes the session atomically: temp file + rename, per spec §4.1
    /// ("Login writes a session blob atomically").
    pub async fn write_atomic(&self, path: &Path) -> anyhow::Result<()> {
        let tmp_path = path.with_extension("tmp");
        let bytes = serde_json::to_vec_pretty(self)?;

        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp_path, path).await?;
        Ok(())
    }

    pub async fn read_from(path: &Path) -> anyhow::Result<Self> {
        let bytes = fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// The states a scraper run for one publication can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NoSession,
    LoggingIn,
    Active,
    Expired,
    Refreshing,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile_shim::tempdir;

    mod tempfile_shim {
        use std::path::PathBuf;

        /// Minimal scratch-dir helper so this test module has no extra
        /// dev-dependency beyond what the workspace already carries.
        pub fn tempdir() -> PathBuf {
            let dir = std::env::temp_dir().join(format!(
                "scraper-session-test-{}",
                std::process::id()
            ));
            std::fs::create_dir_all(&dir).unwrap();
            dir
        }
    }

    #[tokio::test]
    async fn round_trips_through_atomic_write() {
        let dir = tempdir();
        let path = dir.join("storage_state.json");

        let state = SessionState::new("smyth-county-news", serde_json::json!({"cookies": []}));
        state.write_atomic(&path).await.unwrap();

        let loaded = SessionState::read_from(&path).await.unwrap();
        assert_eq!(loaded.publication_slug, "smyth-county-news");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn staleness_is_age_based() {
        let mut state = SessionState::new("pub", serde_json::json!({}));
        state.captured_at = Utc::now() - chrono::Duration::days(10);
        assert!(state.is_stale(7));
        assert!(!state.is_stale(30));
    }
}
