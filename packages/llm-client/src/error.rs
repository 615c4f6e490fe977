use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway config error: {0}")]
    Config(String),

    #[error("gateway network error: {0}")]
    Network(String),

    /// Rate limited; carries the server's `Retry-After` seconds if present.
    #[error("gateway rate limited, retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("gateway returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse gateway response: {0}")]
    Parse(String),

    #[error("gateway call timed out")]
    Timeout,
}

impl GatewayError {
    /// Whether `newsdesk_core::retry::retry_with_backoff` should retry this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Network(_) | GatewayError::RateLimited { .. } | GatewayError::Timeout => true,
            GatewayError::Api { status, .. } => *status >= 500,
            GatewayError::Config(_) | GatewayError::Parse(_) => false,
        }
    }
}

impl From<GatewayError> for newsdesk_core::PipelineError {
    fn from(e: GatewayError) -> Self {
        match &e {
            GatewayError::Config(m) => newsdesk_core::PipelineError::Config(m.clone()),
            GatewayError::Network(_) | GatewayError::Timeout => {
                newsdesk_core::PipelineError::Transient(e.to_string())
            }
            GatewayError::RateLimited { .. } => newsdesk_core::PipelineError::UpstreamUnavailable(e.to_string()),
            GatewayError::Api { status, .. } if *status >= 500 => {
                newsdesk_core::PipelineError::UpstreamUnavailable(e.to_string())
            }
            GatewayError::Api { .. } => newsdesk_core::PipelineError::DataError(e.to_string()),
            GatewayError::Parse(_) => newsdesk_core::PipelineError::DataError(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
