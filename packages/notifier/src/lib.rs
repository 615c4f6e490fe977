//! `SendDigest({date, top_n}) → {posted:bool, count:int}` (spec §4.5).

pub mod digest;
pub mod push;
pub mod ranker;

use chrono::NaiveDate;
use newsdesk_core::config::NotifierConfig;
use newsdesk_core::error::{PipelineError, Result};
use newsdesk_core::models::{Article, ProcessingStatus};
use sqlx::PgPool;
use tracing::{info, warn};

const DEFAULT_TOP_N: i64 = 5;

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct DigestOutcome {
    pub posted: bool,
    pub count: i32,
}

/// Composes and sends the digest for `date`. Without `force`, only
/// Articles still in `summarized` status are eligible. Once a digest
/// has gone out, a bare rerun for the same date is a no-op. `force`
/// widens eligibility to already-`notified` Articles so the same date
/// can be resent deliberately.
pub async fn send_digest(pool: &PgPool, cfg: &NotifierConfig, date: NaiveDate, top_n: Option<i64>, force: bool) -> Result<DigestOutcome> {
    let top_n = top_n.unwrap_or(DEFAULT_TOP_N).max(1);

    let statuses: Vec<&str> = if force { vec!["summarized", "notified"] } else { vec!["summarized"] };

    let candidates: Vec<Article> = sqlx::query_as(
        "SELECT * FROM articles WHERE edition_date = $1 AND processing_status::text = ANY($2)",
    )
    .bind(date)
    .bind(&statuses)
    .fetch_all(pool)
    .await
    .map_err(PipelineError::from)?;

    if candidates.is_empty() {
        info!(%date, "no eligible articles for digest, nothing to send");
        return Ok(DigestOutcome::default());
    }

    let selected: Vec<Article> = ranker::rank(candidates).into_iter().take(top_n as usize).collect();
    let ids: Vec<i64> = selected.iter().map(|a| a.id).collect();

    let summaries: Vec<(i64, String)> =
        sqlx::query_as("SELECT article_id, summary_text FROM summaries WHERE article_id = ANY($1) AND summary_type = 'brief'")
            .bind(&ids)
            .fetch_all(pool)
            .await
            .map_err(PipelineError::from)?;

    let items: Vec<(Article, Option<String>)> = selected
        .into_iter()
        .map(|a| {
            let summary = summaries.iter().find(|(id, _)| *id == a.id).map(|(_, s)| s.clone());
            (a, summary)
        })
        .collect();

    let payload = digest::compose(date, &items);

    let attachment_url = if cfg.attach_full {
        items.first().map(|(a, _)| format!("{}/articles/{}/source", cfg.api_base.trim_end_matches('/'), a.id))
    } else {
        None
    };

    match push::send(cfg, &payload, attachment_url.as_deref()).await {
        Ok(()) => {
            let ids: Vec<i64> = items.iter().map(|(a, _)| a.id).collect();
            sqlx::query("UPDATE articles SET processing_status = $1 WHERE id = ANY($2)")
                .bind(ProcessingStatus::Notified)
                .bind(&ids)
                .execute(pool)
                .await
                .map_err(PipelineError::from)?;

            info!(%date, count = items.len(), "digest posted");
            Ok(DigestOutcome { posted: true, count: items.len() as i32 })
        }
        Err(e) => {
            warn!(%date, error = %e, "digest push failed, articles left unmarked");
            Err(e)
        }
    }
}
