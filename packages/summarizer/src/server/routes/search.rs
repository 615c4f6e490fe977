//! `/search` (spec §4.4): BM25-style rank over `title + summary +
//! content` via Postgres `tsvector`/`ts_rank_cd`, the keyword-search
//! half of a hybrid search setup.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::server::error::ApiResult;
use crate::server::state::AppState;

#[derive(Deserialize)]
pub struct SearchParams {
    q: String,
    limit: Option<i64>,
}

#[derive(Serialize, FromRow)]
pub struct SearchResult {
    article_id: i64,
    title: String,
    section: Option<String>,
    summary: String,
    score: f64,
}

pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> ApiResult<Json<Vec<SearchResult>>> {
    let limit = params.limit.unwrap_or(20).clamp(1, 50);

    let results: Vec<SearchResult> = sqlx::query_as(
        "SELECT a.id AS article_id, a.title, a.section, COALESCE(s.summary_text, '') AS summary,
                ts_rank_cd(
                    to_tsvector('english', a.title || ' ' || COALESCE(s.summary_text, '') || ' ' || a.content),
                    plainto_tsquery('english', $1)
                ) AS score
         FROM articles a
         LEFT JOIN summaries s ON s.article_id = a.id AND s.summary_type = 'brief'
         WHERE to_tsvector('english', a.title || ' ' || COALESCE(s.summary_text, '') || ' ' || a.content)
               @@ plainto_tsquery('english', $1)
         ORDER BY score DESC
         LIMIT $2",
    )
    .bind(&params.q)
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(results))
}
