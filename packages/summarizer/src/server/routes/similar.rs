//! `/similar` (spec §4.4): pgvector cosine-distance nearest neighbors
//! over an HNSW/IVFFLAT-indexed embeddings table.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::server::error::ApiResult;
use crate::server::state::AppState;

#[derive(Deserialize)]
pub struct SimilarParams {
    id: i64,
    limit: Option<i64>,
}

#[derive(Serialize, FromRow)]
pub struct SimilarResult {
    article_id: i64,
    title: String,
    section: Option<String>,
    distance: f64,
}

pub async fn similar(State(state): State<AppState>, Query(params): Query<SimilarParams>) -> ApiResult<Json<Vec<SimilarResult>>> {
    let limit = params.limit.unwrap_or(10).clamp(1, 50);

    let results: Vec<SimilarResult> = sqlx::query_as(
        "SELECT a.id AS article_id, a.title, a.section,
                (e2.embedding <=> e1.embedding) AS distance
         FROM embeddings e1
         JOIN embeddings e2 ON e2.article_id != e1.article_id
         JOIN articles a ON a.id = e2.article_id
         WHERE e1.article_id = $1
         ORDER BY distance ASC
         LIMIT $2",
    )
    .bind(params.id)
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(results))
}
