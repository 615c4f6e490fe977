//! Typed error taxonomy shared by every component binary.
//!
//! Library code returns `PipelineError`; binaries wrap it (and everything
//! else) in `anyhow::Result` at the call site so `main` can attach context
//! and pick an exit code.

use thiserror::Error;

/// The seven error kinds a component can terminate a run with.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing or malformed environment configuration. Fatal at startup.
    #[error("config error: {0}")]
    Config(String),

    /// Credentials rejected or a session could not be established.
    #[error("auth failed: {0}")]
    AuthFailed(String),

    /// Likely to succeed on retry: network blips, upstream 5xx, timeouts.
    #[error("transient error: {0}")]
    Transient(String),

    /// Upstream is reachable but refusing service (429 exhausted, 503).
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Input was read but does not conform to what the pipeline expects.
    #[error("data error: {0}")]
    DataError(String),

    /// A write would violate a uniqueness/ordering invariant.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Anything else. Not expected to be recoverable by a retry.
    #[error("internal error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PipelineError {
    /// Exit code an orchestrator should treat this failure as, per the
    /// external interface contract.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => 2,
            PipelineError::AuthFailed(_) => 3,
            PipelineError::Transient(_) => 4,
            PipelineError::UpstreamUnavailable(_) => 5,
            PipelineError::DataError(_) => 6,
            PipelineError::Conflict(_) => 7,
            PipelineError::Internal(_) => 1,
        }
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        PipelineError::Transient(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        PipelineError::DataError(msg.into())
    }
}

impl From<sqlx::Error> for PipelineError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PipelineError::Conflict(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                PipelineError::Transient(e.to_string())
            }
            _ => PipelineError::Internal(Box::new(e)),
        }
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            PipelineError::Transient(e.to_string())
        } else if let Some(status) = e.status() {
            if status.as_u16() == 429 || status.is_server_error() {
                PipelineError::UpstreamUnavailable(e.to_string())
            } else {
                PipelineError::DataError(e.to_string())
            }
        } else {
            PipelineError::Internal(Box::new(e))
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
