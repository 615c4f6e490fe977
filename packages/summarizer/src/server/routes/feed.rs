//! `/feed/dates` and `/feed` (spec §4.4).

use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, QueryBuilder};

use crate::server::error::{ApiError, ApiResult};
use crate::server::state::AppState;
use newsdesk_core::models::{Article, ArticleEvent};

#[derive(Deserialize)]
pub struct DatesParams {
    limit: Option<i64>,
}

#[derive(Serialize, FromRow)]
struct DateBucket {
    date: NaiveDate,
    total: i64,
    summarized: i64,
}

#[derive(Serialize)]
pub struct DatesResponse {
    dates: Vec<DateBucket>,
}

pub async fn feed_dates(State(state): State<AppState>, Query(params): Query<DatesParams>) -> ApiResult<Json<DatesResponse>> {
    let limit = params.limit.unwrap_or(14).clamp(1, 60);

    let dates: Vec<DateBucket> = sqlx::query_as(
        "SELECT edition_date AS date, count(*) AS total,
                count(*) FILTER (WHERE processing_status IN ('summarized', 'notified')) AS summarized
         FROM articles
         GROUP BY edition_date
         ORDER BY edition_date DESC
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(DatesResponse { dates }))
}

#[derive(Deserialize)]
pub struct FeedParams {
    date_str: Option<String>,
    limit: Option<i64>,
    section: Option<String>,
    q: Option<String>,
}

#[derive(Serialize)]
pub struct FeedItem {
    #[serde(flatten)]
    article: Article,
    summary: Option<String>,
    events: Vec<ArticleEvent>,
}

#[derive(Serialize)]
pub struct FeedResponse {
    date: NaiveDate,
    count: usize,
    items: Vec<FeedItem>,
}

pub async fn feed(State(state): State<AppState>, Query(params): Query<FeedParams>) -> ApiResult<Json<FeedResponse>> {
    let date = match &params.date_str {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest("date_str must be YYYY-MM-DD".into()))?,
        None => Utc::now().date_naive(),
    };
    let limit = params.limit.unwrap_or(50).clamp(1, 200);

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT a.* FROM articles a \
         LEFT JOIN summaries s ON s.article_id = a.id AND s.summary_type = 'brief' \
         WHERE a.edition_date = ",
    );
    qb.push_bind(date);

    if let Some(section) = &params.section {
        qb.push(" AND a.section = ");
        qb.push_bind(section.clone());
    }
    if let Some(q) = &params.q {
        let pattern = format!("%{q}%");
        qb.push(" AND (a.title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR s.summary_text ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    qb.push(" ORDER BY a.section ASC, a.page_number ASC, a.id ASC LIMIT ");
    qb.push_bind(limit);

    let articles: Vec<Article> = qb.build_query_as().fetch_all(&state.pool).await?;
    let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();

    let summaries: Vec<(i64, String)> =
        sqlx::query_as("SELECT article_id, summary_text FROM summaries WHERE article_id = ANY($1) AND summary_type = 'brief'")
            .bind(&ids)
            .fetch_all(&state.pool)
            .await?;
    let events: Vec<ArticleEvent> = sqlx::query_as("SELECT * FROM article_events WHERE article_id = ANY($1) ORDER BY start_time ASC")
        .bind(&ids)
        .fetch_all(&state.pool)
        .await?;

    let items = articles
        .into_iter()
        .map(|article| {
            let summary = summaries
                .iter()
                .find(|(id, _)| *id == article.id)
                .map(|(_, text)| text.clone());
            let article_events = events.iter().filter(|e| e.article_id == article.id).cloned().collect();
            FeedItem {
                summary,
                events: article_events,
                article,
            }
        })
        .collect::<Vec<_>>();

    Ok(Json(FeedResponse {
        date,
        count: items.len(),
        items,
    }))
}
