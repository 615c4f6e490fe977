//! `Download(session, urls, targetPrefix, options{force}) → [...]` (spec
//! §4.1). Idempotent by object key; bounded worker pool.

use crate::discover::PageUrl;
use crate::proxy::ProxyPool;
use newsdesk_core::error::PipelineError;
use newsdesk_core::objectstore::{raw_key, ObjectStore, PutOutcome};
use newsdesk_core::retry::{retry_with_backoff, BackoffPolicy};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Per-download deadline (spec §5: scrape download budget 60s).
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Downloaded,
    Cached,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadResult {
    pub url: String,
    pub key: String,
    pub bytes: u64,
    pub status: DownloadStatus,
}

pub struct DownloadOptions {
    pub force: bool,
    pub parallelism: usize,
    pub edition_date: String,
    pub publication_slug: String,
    pub ext: &'static str,
}

pub async fn download_all(
    store: &ObjectStore,
    proxies: &ProxyPool,
    pages: &[PageUrl],
    opts: &DownloadOptions,
) -> Vec<DownloadResult> {
    let semaphore = Arc::new(Semaphore::new(opts.parallelism.max(1)));
    let mut handles = Vec::with_capacity(pages.len());

    for page in pages {
        let permit = semaphore.clone();
        let store = store.clone();
        let url = page.url.clone();
        let key = raw_key(&opts.edition_date, &opts.publication_slug, &url, opts.ext);
        let force = opts.force;
        let client = build_client(proxies);

        handles.push(tokio::spawn(async move {
            let _permit = permit.acquire_owned().await.expect("semaphore not closed");
            fetch_one(&store, &client, &url, &key, force).await
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (page, handle) in pages.iter().zip(handles) {
        match handle.await {
            Ok(r) => results.push(r),
            Err(e) => {
                warn!(url = %page.url, error = %e, "download task panicked");
                results.push(DownloadResult {
                    url: page.url.clone(),
                    key: String::new(),
                    bytes: 0,
                    status: DownloadStatus::Failed,
                });
            }
        }
    }
    results
}

fn build_client(proxies: &ProxyPool) -> Client {
    let mut builder = Client::builder().timeout(DOWNLOAD_TIMEOUT);
    if let Ok(proxy) = proxies.next_proxy() {
        builder = builder.proxy(proxy);
    }
    builder.build().unwrap_or_else(|_| Client::new())
}

async fn fetch_one(
    store: &ObjectStore,
    client: &Client,
    url: &str,
    key: &str,
    force: bool,
) -> DownloadResult {
    if !force {
        if let Ok(true) = store.exists(key).await {
            return DownloadResult {
                url: url.to_string(),
                key: key.to_string(),
                bytes: 0,
                status: DownloadStatus::Cached,
            };
        }
    }

    let policy = BackoffPolicy::scraper();
    let outcome = retry_with_backoff(
        policy,
        || fetch_bytes(client, url),
        |e| e.is_retryable(),
        |e| e.retry_after(),
    )
    .await;

    match outcome {
        Ok(bytes) => {
            let len = bytes.len() as u64;
            let content_type = if key.ends_with(".pdf") {
                "application/pdf"
            } else {
                "text/html"
            };
            match store.put_if_absent(key, bytes, content_type, force).await {
                Ok(PutOutcome::Written) | Ok(PutOutcome::AlreadyExists) => {
                    info!(url, key, "downloaded");
                    DownloadResult {
                        url: url.to_string(),
                        key: key.to_string(),
                        bytes: len,
                        status: DownloadStatus::Downloaded,
                    }
                }
                Err(e) => {
                    warn!(url, error = %e, "object store write failed");
                    DownloadResult {
                        url: url.to_string(),
                        key: key.to_string(),
                        bytes: 0,
                        status: DownloadStatus::Failed,
                    }
                }
            }
        }
        Err(e) => {
            warn!(url, error = %e, "download exhausted retries");
            DownloadResult {
                url: url.to_string(),
                key: key.to_string(),
                bytes: 0,
                status: DownloadStatus::Failed,
            }
        }
    }
}

#[derive(Debug)]
struct FetchError {
    status: Option<StatusCode>,
    retry_after: Option<Duration>,
    message: String,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl FetchError {
    fn is_retryable(&self) -> bool {
        match self.status {
            Some(s) => s.as_u16() == 403 || s.as_u16() == 407 || s.as_u16() == 429 || s.is_server_error(),
            None => true,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }
}

async fn fetch_bytes(client: &Client, url: &str) -> Result<bytes::Bytes, FetchError> {
    let response = client.get(url).send().await.map_err(|e| FetchError {
        status: e.status(),
        retry_after: None,
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(FetchError {
            status: Some(status),
            retry_after,
            message: format!("HTTP {status}"),
        });
    }

    response.bytes().await.map_err(|e| FetchError {
        status: None,
        retry_after: None,
        message: e.to_string(),
    })
}

pub fn failed_count(results: &[DownloadResult]) -> usize {
    results
        .iter()
        .filter(|r| r.status == DownloadStatus::Failed)
        .count()
}

impl From<FetchError> for PipelineError {
    fn from(e: FetchError) -> Self {
        match e.status.map(|s| s.as_u16()) {
            Some(403) | Some(407) | Some(429) => PipelineError::Transient(e.message),
            Some(s) if s >= 500 => PipelineError::Transient(e.message),
            _ => PipelineError::DataError(e.message),
        }
    }
}
