//! `/articles/{id}/source` (spec §4.4): serve the stored raw HTML when we
//! have it, otherwise redirect to the original URL, otherwise 404.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use sqlx::FromRow;

use crate::server::error::{ApiError, ApiResult};
use crate::server::state::AppState;

#[derive(FromRow)]
struct SourceRow {
    raw_html: Option<String>,
    url: Option<String>,
}

pub async fn source(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Response> {
    let row: Option<SourceRow> = sqlx::query_as("SELECT raw_html, url FROM articles WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;

    let row = row.ok_or_else(|| ApiError::NotFound(format!("article {id} not found")))?;

    if let Some(html) = row.raw_html {
        return Ok((StatusCode::OK, [(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response());
    }
    if let Some(url) = row.url {
        return Ok(Redirect::to(&url).into_response());
    }
    Err(ApiError::NotFound(format!("no source available for article {id}")))
}
