//! `RunBatch({batch_size, max_concurrent}) → {processed, failed}` (spec
//! §4.3): drains `processing_status=extracted` Articles, produces a
//! `brief` Summary plus an optional Embedding, and advances status.
//!
//! Bounded concurrency and backpressure follow the scraper's
//! `Semaphore`-gated worker pool (`scraper::download::download_all`),
//! generalized with a shared reduction counter for the 429 backoff rule.

use crate::prompt::{system_prompt, user_message};
use llm_client::{GatewayClient, Message};
use newsdesk_core::error::{PipelineError, Result};
use newsdesk_core::models::{Article, ProcessingStatus, SummaryResponse};
use pgvector::Vector;
use sqlx::PgPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

const DEFAULT_INPUT_TOKEN_CAP: u32 = 6000;

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct BatchOutcome {
    pub processed: i32,
    pub failed: i32,
}

pub struct WorkerConfig {
    pub batch_size: i64,
    pub max_concurrent: usize,
    pub input_token_cap: u32,
    pub compute_embeddings: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_concurrent: 4,
            input_token_cap: DEFAULT_INPUT_TOKEN_CAP,
            compute_embeddings: true,
        }
    }
}

pub async fn run_batch(pool: &PgPool, gateway: &GatewayClient, cfg: WorkerConfig) -> Result<BatchOutcome> {
    let articles: Vec<Article> = sqlx::query_as(
        "SELECT * FROM articles WHERE processing_status = 'extracted' ORDER BY date_extracted ASC LIMIT $1",
    )
    .bind(cfg.batch_size)
    .fetch_all(pool)
    .await
    .map_err(PipelineError::from)?;

    if articles.is_empty() {
        return Ok(BatchOutcome::default());
    }

    let semaphore = Arc::new(Semaphore::new(cfg.max_concurrent.max(1)));
    // On persistent 429s, `process_one` bumps this; the next acquirer
    // forgets a permit instead of releasing it, permanently shrinking
    // the pool for the rest of the batch (spec §4.3 backpressure rule).
    let pending_reduction = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::with_capacity(articles.len());
    for article in articles {
        let semaphore = semaphore.clone();
        let pending_reduction = pending_reduction.clone();
        let pool = pool.clone();
        let gateway = gateway.clone();
        let token_cap = cfg.input_token_cap;
        let compute_embeddings = cfg.compute_embeddings;

        handles.push(tokio::spawn(async move {
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore not closed");
            if pending_reduction.load(Ordering::Relaxed) > 0 && semaphore.available_permits() > 0 {
                pending_reduction.fetch_sub(1, Ordering::Relaxed);
                permit.forget();
            }
            process_one(&pool, &gateway, &article, token_cap, compute_embeddings, &pending_reduction).await
        }));
    }

    let mut outcome = BatchOutcome::default();
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => outcome.processed += 1,
            Ok(Err(e)) => {
                warn!(error = %e, "article summarization failed");
                outcome.failed += 1;
            }
            Err(e) => {
                warn!(error = %e, "summarizer task panicked");
                outcome.failed += 1;
            }
        }
    }

    info!(processed = outcome.processed, failed = outcome.failed, "summarizer batch complete");
    Ok(outcome)
}

async fn process_one(
    pool: &PgPool,
    gateway: &GatewayClient,
    article: &Article,
    token_cap: u32,
    compute_embeddings: bool,
    pending_reduction: &Arc<AtomicUsize>,
) -> Result<()> {
    let messages = vec![
        Message::system(system_prompt()),
        Message::user(user_message(&article.title, &article.content, token_cap)),
    ];

    let chat_result = gateway.chat_completion_with_retry(messages).await;

    let response = match chat_result {
        Ok(r) => r,
        Err(e) => {
            if matches!(e, llm_client::GatewayError::RateLimited { .. }) {
                pending_reduction.fetch_add(1, Ordering::Relaxed);
            }
            mark_failed(pool, article.id, &e.to_string()).await?;
            return Err(PipelineError::from(e));
        }
    };

    let (summary_text, bullets, tags) = match serde_json::from_str::<SummaryResponse>(&response.content) {
        Ok(parsed) => (parsed.summary, parsed.bullets, parsed.tags),
        Err(_) => (response.content.clone(), None, None),
    };

    let embedding = if compute_embeddings {
        match gateway.create_embedding(&format!("{} {}", article.title, article.content)).await {
            Ok(vec) => Some(vec),
            Err(e) => {
                warn!(article_id = article.id, error = %e, "embedding generation failed, continuing without it");
                None
            }
        }
    } else {
        None
    };

    let tokens_used = response.usage.as_ref().map(|u| u.total_tokens as i32);

    let mut tx = pool.begin().await.map_err(PipelineError::from)?;

    sqlx::query(
        "INSERT INTO summaries (article_id, summary_text, summary_type, model_used, tokens_used, bullets, tags)
         VALUES ($1, $2, 'brief', $3, $4, $5, $6)
         ON CONFLICT (article_id, summary_type) DO UPDATE SET
           summary_text = EXCLUDED.summary_text,
           model_used = EXCLUDED.model_used,
           tokens_used = EXCLUDED.tokens_used,
           bullets = EXCLUDED.bullets,
           tags = EXCLUDED.tags",
    )
    .bind(article.id)
    .bind(&summary_text)
    .bind(gateway.model())
    .bind(tokens_used)
    .bind(&bullets)
    .bind(&tags)
    .execute(&mut *tx)
    .await
    .map_err(PipelineError::from)?;

    if let Some(vector) = embedding {
        sqlx::query(
            "INSERT INTO embeddings (article_id, embedding, model_used)
             VALUES ($1, $2, $3)
             ON CONFLICT (article_id) DO UPDATE SET embedding = EXCLUDED.embedding, model_used = EXCLUDED.model_used",
        )
        .bind(article.id)
        .bind(Vector::from(vector))
        .bind(gateway.model())
        .execute(&mut *tx)
        .await
        .map_err(PipelineError::from)?;
    }

    sqlx::query("UPDATE articles SET processing_status = $1 WHERE id = $2")
        .bind(ProcessingStatus::Summarized)
        .bind(article.id)
        .execute(&mut *tx)
        .await
        .map_err(PipelineError::from)?;

    tx.commit().await.map_err(PipelineError::from)?;
    Ok(())
}

async fn mark_failed(pool: &PgPool, article_id: i64, reason: &str) -> Result<()> {
    sqlx::query("UPDATE articles SET processing_status = $1, failure_reason = $2 WHERE id = $3")
        .bind(ProcessingStatus::Failed)
        .bind(reason)
        .bind(article_id)
        .execute(pool)
        .await
        .map_err(PipelineError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let cfg = WorkerConfig::default();
        assert_eq!(cfg.batch_size, 50);
        assert_eq!(cfg.max_concurrent, 4);
        assert_eq!(cfg.input_token_cap, DEFAULT_INPUT_TOKEN_CAP);
    }
}
