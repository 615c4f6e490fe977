use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Append-only audit row, one per source type processed per extractor run
/// (spec §3, §4.2).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProcessingHistory {
    pub id: i64,
    pub date_processed: DateTime<Utc>,
    pub edition_date: NaiveDate,
    pub publication: String,
    pub source_type: String,
    pub articles_found: i32,
    pub articles_new: i32,
    pub articles_duplicate: i32,
    pub articles_failed: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingReport {
    pub found: i32,
    pub new: i32,
    pub duplicate: i32,
    pub failed: i32,
}
