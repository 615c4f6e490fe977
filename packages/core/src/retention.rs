//! Raw blob retention (spec §9 Open Question: "surface it as a
//! configurable retention job"). Deletes Object Store keys under a
//! `<edition_date>/...` prefix older than `retention_days`; the `auth/`
//! session blob is never a retention candidate.

use crate::objectstore::ObjectStore;
use chrono::{NaiveDate, Utc};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct RetentionReport {
    pub scanned: usize,
    pub deleted: usize,
}

/// Deletes every `<edition_date>/...` key whose date component is older
/// than `retention_days` relative to today.
pub async fn prune_raw_blobs(store: &ObjectStore, retention_days: u32) -> crate::error::Result<RetentionReport> {
    let cutoff = Utc::now().date_naive() - chrono::Duration::days(retention_days as i64);
    let keys = store.list_prefix("").await?;

    let mut report = RetentionReport::default();
    for key in keys {
        if key.starts_with("auth/") {
            continue;
        }
        report.scanned += 1;
        let Some(date_segment) = key.split('/').next() else { continue };
        let Ok(edition_date) = NaiveDate::parse_from_str(date_segment, "%Y-%m-%d") else { continue };
        if edition_date < cutoff {
            store.delete(&key).await?;
            report.deleted += 1;
        }
    }

    info!(cutoff = %cutoff, scanned = report.scanned, deleted = report.deleted, "raw blob retention pass complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_segment_parses_from_key() {
        let key = "2025-01-08/smyth-county-news-messenger/raw/abc.pdf";
        let date_segment = key.split('/').next().unwrap();
        assert_eq!(NaiveDate::parse_from_str(date_segment, "%Y-%m-%d").unwrap(), NaiveDate::from_ymd_opt(2025, 1, 8).unwrap());
    }

    #[test]
    fn session_blob_segment_is_not_a_date() {
        let key = "auth/smyth-county-news-messenger/storage_state.json";
        let date_segment = key.split('/').next().unwrap();
        assert!(NaiveDate::parse_from_str(date_segment, "%Y-%m-%d").is_err());
    }
}
