use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Summary {
    pub id: i64,
    pub article_id: i64,
    pub summary_text: String,
    pub summary_type: String,
    pub model_used: String,
    pub tokens_used: Option<i32>,
    pub generation_time_ms: Option<i32>,
    pub bullets: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

/// The worker's expected JSON shape from the LLM (spec §4.3). Parse
/// failures fall back to storing the raw text with `bullets` left null.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct SummaryResponse {
    pub summary: String,
    #[serde(default)]
    pub bullets: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}
