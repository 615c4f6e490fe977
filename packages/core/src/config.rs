//! Typed configuration loaded once from the environment at process start.
//!
//! Every binary builds the subset of `Config` it needs via the
//! `*_from_env` constructors below; a missing required variable is a
//! `PipelineError::Config`, which every `main` treats as exit code 2.

use crate::error::{PipelineError, Result};
use std::env;

fn required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| PipelineError::Config(format!("missing required env var {key}")))
}

fn optional(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Loads `.env` if present; safe to call multiple times.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

#[derive(Debug, Clone)]
pub struct EeditionCredentials {
    pub user: String,
    pub pass: String,
}

impl EeditionCredentials {
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Ok(Self {
            user: required("EEDITION_USER")?,
            pass: required("EEDITION_PASS")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub username: String,
    pub password: String,
    pub host: String,
    pub ports: Vec<u16>,
    pub rotation_enabled: bool,
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        let ports_raw = required("SMARTPROXY_PORTS")?;
        let ports = ports_raw
            .split(',')
            .map(|p| p.trim().parse::<u16>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| PipelineError::Config(format!("invalid SMARTPROXY_PORTS: {e}")))?;
        if ports.is_empty() {
            return Err(PipelineError::Config(
                "SMARTPROXY_PORTS must list at least one port".into(),
            ));
        }
        Ok(Self {
            username: required("SMARTPROXY_USERNAME")?,
            password: required("SMARTPROXY_PASSWORD")?,
            host: required("SMARTPROXY_HOST")?,
            ports,
            rotation_enabled: optional_parsed("PROXY_ROTATION_ENABLED", true),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
}

impl ObjectStoreConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Ok(Self {
            endpoint: required("MINIO_ENDPOINT")?,
            access_key: required("MINIO_ACCESS_KEY")?,
            secret_key: required("MINIO_SECRET_KEY")?,
            bucket: required("MINIO_BUCKET")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LlmGatewayConfig {
    pub api_base: String,
    pub api_key: String,
    /// Logical model alias (e.g. "active"); never a vendor-specific name.
    pub model: String,
    pub embedding_model: String,
    pub max_tokens: u32,
}

impl LlmGatewayConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Ok(Self {
            api_base: required("OPENAI_API_BASE")?,
            api_key: required("OPENAI_API_KEY")?,
            model: required("OPENAI_MODEL")?,
            embedding_model: optional("OPENAI_EMBEDDING_MODEL", "active-embedding"),
            max_tokens: optional_parsed("OPENAI_MAX_TOKENS", 1024),
        })
    }
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub url: String,
    pub topic: String,
    pub token: Option<String>,
    pub attach_full: bool,
    /// Base URL of the summarizer API, used to build the `/articles/{id}/source`
    /// attachment link when `attach_full` is set. Not part of the spec's
    /// enumerated config; defaults to the summarizer's default bind address.
    pub api_base: String,
}

impl NotifierConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Ok(Self {
            url: required("NTFY_URL")?,
            topic: required("NTFY_TOPIC")?,
            token: env::var("NTFY_TOKEN").ok(),
            attach_full: optional_parsed("NTFY_ATTACH_FULL", false),
            api_base: optional("API_BASE", "http://localhost:8080"),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TuningConfig {
    pub scraper_parallelism: usize,
    pub batch_size: usize,
    pub max_concurrent: usize,
    pub cache_retention_days: u32,
    pub log_level: String,
    pub pw_trace: bool,
}

impl TuningConfig {
    pub fn from_env() -> Self {
        load_dotenv();
        Self {
            scraper_parallelism: optional_parsed("SCRAPER_PARALLELISM", 2),
            batch_size: optional_parsed("BATCH_SIZE", 50),
            max_concurrent: optional_parsed("SUMMARIZER_MAX_CONCURRENT", 4),
            cache_retention_days: optional_parsed("CACHE_RETENTION_DAYS", 7),
            log_level: optional("LOG_LEVEL", "info"),
            pw_trace: optional_parsed("PW_TRACE", false),
        }
    }
}

/// `DATABASE_URL`, read directly by each binary's `newsdesk_core::db::connect`.
pub fn database_url() -> Result<String> {
    load_dotenv();
    required("DATABASE_URL")
}
