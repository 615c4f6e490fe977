//! `/events` (spec §4.4): upcoming `article_events` grouped by local date.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::server::error::ApiResult;
use crate::server::state::AppState;
use newsdesk_core::models::ArticleEvent;

#[derive(Deserialize)]
pub struct EventsParams {
    days: Option<i64>,
}

#[derive(Serialize)]
pub struct EventsResponse {
    days: i64,
    events: BTreeMap<NaiveDate, Vec<ArticleEvent>>,
}

pub async fn events(State(state): State<AppState>, Query(params): Query<EventsParams>) -> ApiResult<Json<EventsResponse>> {
    let days = params.days.unwrap_or(30).clamp(1, 365);
    let now = Utc::now();
    let until = now + chrono::Duration::days(days);

    let rows: Vec<ArticleEvent> = sqlx::query_as(
        "SELECT * FROM article_events WHERE start_time >= $1 AND start_time <= $2 ORDER BY start_time ASC",
    )
    .bind(now)
    .bind(until)
    .fetch_all(&state.pool)
    .await?;

    let mut events: BTreeMap<NaiveDate, Vec<ArticleEvent>> = BTreeMap::new();
    for event in rows {
        let date = event.start_time.date_naive();
        events.entry(date).or_default().push(event);
    }

    Ok(Json(EventsResponse { days, events }))
}
