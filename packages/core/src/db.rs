//! Postgres pool construction + migration runner, shared by every binary.

use crate::error::{PipelineError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Connects with a default pool size of 10 and applies migrations.
/// Call once per process.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| PipelineError::Config(format!("failed to connect to database: {e}")))?;

    MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| PipelineError::Internal(Box::new(e)))?;

    Ok(pool)
}

/// Used by the API's `/health` handler: a bounded, cheap reachability probe.
pub async fn is_healthy(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}

/// Detects whether the `vector` extension (pgvector) is installed and, if
/// so, whether it's new enough (>=0.5.0) to support HNSW indexes, so the
/// embeddings migration can choose an index type accordingly.
pub async fn detect_pgvector_hnsw(pool: &PgPool) -> Result<(bool, bool)> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT extversion FROM pg_extension WHERE extname = 'vector'")
            .fetch_optional(pool)
            .await
            .map_err(PipelineError::from)?;

    match row {
        Some((version,)) => {
            let has_hnsw = version.as_str() >= "0.5.0";
            Ok((true, has_hnsw))
        }
        None => Ok((false, false)),
    }
}
