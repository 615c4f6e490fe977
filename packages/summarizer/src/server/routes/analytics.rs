//! `/analytics/trending` and `/analytics/timeline` (spec §4.4).
//!
//! Trending is recomputed on every request rather than persisted
//! (DESIGN.md Open Question 4): query-time aggregation over an
//! incrementally maintained rollup table.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::server::error::{ApiError, ApiResult};
use crate::server::state::AppState;
use newsdesk_core::models::{TrendingKind, TrendingRollup};

const TRENDING_WINDOW_DAYS: i64 = 14;

#[derive(Deserialize)]
pub struct TrendingParams {
    kind: String,
    date_str: Option<String>,
    limit: Option<i64>,
}

fn parse_kind(raw: &str) -> ApiResult<TrendingKind> {
    match raw {
        "section" => Ok(TrendingKind::Section),
        "tag" => Ok(TrendingKind::Tag),
        "topic" => Ok(TrendingKind::Topic),
        "entity" => Ok(TrendingKind::Entity),
        other => Err(ApiError::BadRequest(format!(
            "kind must be one of section, tag, entity, topic (got {other})"
        ))),
    }
}

/// The SQL fragment that turns `articles` rows into `(edition_date, key)`
/// pairs for a given trending dimension. Each arm is a fixed literal, not
/// user input, so interpolating it into the query string carries no
/// injection risk.
fn keyed_source(kind: TrendingKind) -> &'static str {
    match kind {
        TrendingKind::Section => "SELECT edition_date, section AS key FROM articles WHERE section IS NOT NULL",
        TrendingKind::Tag => {
            "SELECT a.edition_date, t.value AS key FROM articles a, jsonb_each_text(a.tags) t WHERE a.tags IS NOT NULL"
        }
        TrendingKind::Topic => {
            "SELECT a.edition_date, t.key AS key FROM articles a, jsonb_each_text(a.tags) t WHERE a.tags IS NOT NULL"
        }
        TrendingKind::Entity => "SELECT edition_date, location_name AS key FROM articles WHERE location_name IS NOT NULL",
    }
}

#[derive(FromRow)]
struct TrendingRow {
    key: String,
    score: f64,
    zscore: f64,
}

pub async fn trending(State(state): State<AppState>, Query(params): Query<TrendingParams>) -> ApiResult<Json<Vec<TrendingRollup>>> {
    let kind = parse_kind(&params.kind)?;
    let source = keyed_source(kind);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let as_of = match &params.date_str {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest("date_str must be YYYY-MM-DD".into()))?,
        None => Utc::now().date_naive(),
    };
    let window_start = as_of - chrono::Duration::days(TRENDING_WINDOW_DAYS);

    let sql = format!(
        "WITH keyed AS ({source}),
              windowed AS (SELECT * FROM keyed WHERE edition_date BETWEEN $1 AND $2),
              daily AS (SELECT edition_date, key, count(*) AS c FROM windowed GROUP BY edition_date, key),
              stats AS (SELECT key, sum(c) AS score, avg(c) AS mean_c, stddev_pop(c) AS sd_c FROM daily GROUP BY key)
         SELECT s.key, s.score::float8 AS score,
                CASE WHEN s.sd_c IS NULL OR s.sd_c = 0 THEN 0.0
                     ELSE (COALESCE(d.c, 0) - s.mean_c) / s.sd_c END AS zscore
         FROM stats s
         LEFT JOIN daily d ON d.key = s.key AND d.edition_date = $2
         ORDER BY score DESC
         LIMIT $3"
    );

    let rows: Vec<TrendingRow> = sqlx::query_as(&sql)
        .bind(window_start)
        .bind(as_of)
        .bind(limit)
        .fetch_all(&state.pool)
        .await?;

    let items = rows
        .into_iter()
        .map(|r| TrendingRollup {
            kind,
            key: r.key,
            as_of_date: as_of,
            score: r.score,
            zscore: r.zscore,
            details: None,
        })
        .collect();

    Ok(Json(items))
}

#[derive(Deserialize)]
pub struct TimelineParams {
    kind: String,
    key: String,
    days: Option<i64>,
}

#[derive(Serialize)]
pub struct TimelinePoint {
    date: NaiveDate,
    count: i64,
    sum_score: f64,
}

pub async fn timeline(State(state): State<AppState>, Query(params): Query<TimelineParams>) -> ApiResult<Json<Vec<TimelinePoint>>> {
    let kind = parse_kind(&params.kind)?;
    let source = keyed_source(kind);
    let days = params.days.unwrap_or(30).clamp(1, 365);
    let end = Utc::now().date_naive();
    let start = end - chrono::Duration::days(days - 1);

    let sql = format!(
        "WITH keyed AS ({source}),
              daily AS (SELECT edition_date, count(*) AS c FROM keyed WHERE key = $1 AND edition_date BETWEEN $2 AND $3
                        GROUP BY edition_date)
         SELECT gs::date AS date, COALESCE(daily.c, 0) AS count, COALESCE(daily.c, 0)::float8 AS sum_score
         FROM generate_series($2::date, $3::date, interval '1 day') AS gs
         LEFT JOIN daily ON daily.edition_date = gs::date
         ORDER BY date ASC"
    );

    #[derive(FromRow)]
    struct Row {
        date: NaiveDate,
        count: i64,
        sum_score: f64,
    }

    let rows: Vec<Row> = sqlx::query_as(&sql)
        .bind(&params.key)
        .bind(start)
        .bind(end)
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(
        rows.into_iter()
            .map(|r| TimelinePoint {
                date: r.date,
                count: r.count,
                sum_score: r.sum_score,
            })
            .collect(),
    ))
}
