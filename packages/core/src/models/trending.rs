use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum TrendingKind {
    Section,
    Tag,
    Entity,
    Topic,
}

/// Recomputed on read from Article/Summary history rather than
/// incrementally maintained (see DESIGN.md Open Question 4).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TrendingRollup {
    pub kind: TrendingKind,
    pub key: String,
    pub as_of_date: NaiveDate,
    pub score: f64,
    pub zscore: f64,
    pub details: Option<serde_json::Value>,
}
