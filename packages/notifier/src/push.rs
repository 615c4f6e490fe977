//! POST to the ntfy.sh-compatible push endpoint, retried with the shared
//! backoff helper (spec §4.5: 3x exponential back-off on network errors,
//! 15s per-call deadline per spec §5).

use crate::digest::Digest;
use newsdesk_core::config::NotifierConfig;
use newsdesk_core::error::{PipelineError, Result};
use newsdesk_core::retry::{retry_with_backoff, BackoffPolicy};
use reqwest::Client;
use std::time::Duration;

const CALL_TIMEOUT: Duration = Duration::from_secs(15);

pub async fn send(cfg: &NotifierConfig, digest: &Digest, attachment_url: Option<&str>) -> Result<()> {
    let client = Client::builder().timeout(CALL_TIMEOUT).build().map_err(PipelineError::from)?;
    let url = format!("{}/{}", cfg.url.trim_end_matches('/'), cfg.topic);

    retry_with_backoff(
        BackoffPolicy::notifier(),
        || async {
            let mut req = client
                .post(&url)
                .header("Title", &digest.title)
                .header("Priority", digest.priority.to_string())
                .header("Tags", &digest.tags)
                .body(digest.body.clone());

            if let Some(token) = &cfg.token {
                req = req.bearer_auth(token);
            }
            if let Some(attach) = attachment_url {
                req = req.header("Attach", attach);
            }

            let response = req.send().await.map_err(PipelineError::from)?;
            let status = response.status();
            if status.is_success() {
                Ok(())
            } else if status.as_u16() == 429 || status.is_server_error() {
                Err(PipelineError::UpstreamUnavailable(format!("ntfy returned {status}")))
            } else {
                Err(PipelineError::DataError(format!("ntfy returned {status}")))
            }
        },
        |e| matches!(e, PipelineError::Transient(_) | PipelineError::UpstreamUnavailable(_)),
        |_| None,
    )
    .await
}
