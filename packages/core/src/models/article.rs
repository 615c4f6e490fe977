use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum SourceType {
    Pdf,
    Html,
    Fb,
    Other,
}

/// Monotonic except for the terminal `Failed` state, which requires a
/// manual reset (spec §3, §8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum ProcessingStatus {
    Extracted,
    Summarized,
    Notified,
    Failed,
}

impl ProcessingStatus {
    /// Whether a transition from `self` to `next` is allowed by the
    /// forward-only state machine.
    pub fn can_transition_to(self, next: ProcessingStatus) -> bool {
        use ProcessingStatus::*;
        matches!(
            (self, next),
            (Extracted, Summarized)
                | (Summarized, Notified)
                | (Extracted, Failed)
                | (Summarized, Failed)
        )
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub content_hash: String,
    pub source_type: SourceType,
    pub date_extracted: DateTime<Utc>,
    pub processing_status: ProcessingStatus,
    pub edition_date: NaiveDate,

    pub url: Option<String>,
    pub source_file: Option<String>,
    pub publication: Option<String>,
    pub section: Option<String>,
    pub page_number: Option<i32>,
    pub column_number: Option<i32>,
    pub author: Option<String>,
    pub word_count: Option<i32>,
    pub date_published: Option<DateTime<Utc>>,
    pub raw_html: Option<String>,
    pub location_name: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lon: Option<f64>,
    pub event_dates: Option<Vec<DateTime<Utc>>>,
    pub tags: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
    pub failure_reason: Option<String>,
}

/// Fields required to insert a new Article; the rest are derived or
/// default at insert time.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub source_type: SourceType,
    pub edition_date: NaiveDate,
    pub url: Option<String>,
    pub source_file: Option<String>,
    pub publication: Option<String>,
    pub section: Option<String>,
    pub page_number: Option<i32>,
    pub column_number: Option<i32>,
    pub author: Option<String>,
    pub date_published: Option<DateTime<Utc>>,
    pub raw_html: Option<String>,
    pub location_name: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lon: Option<f64>,
    pub event_dates: Option<Vec<DateTime<Utc>>>,
    pub tags: Option<HashMap<String, String>>,
    pub metadata: Option<HashMap<String, String>>,
}

impl NewArticle {
    /// `word_count` equals whitespace-delimited tokens at insert time
    /// (spec §3 invariant).
    pub fn word_count(&self) -> i32 {
        self.content.split_whitespace().count() as i32
    }

    pub fn content_hash(&self) -> String {
        crate::hash::content_hash(&self.content)
    }
}
