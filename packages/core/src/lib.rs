//! Shared config, error taxonomy, persistence, and object-store plumbing
//! used by every component binary (scraper, extractor, summarizer,
//! notifier). No component crate depends on another component crate;
//! everything they share lives here.

pub mod config;
pub mod db;
pub mod error;
pub mod hash;
pub mod models;
pub mod objectstore;
pub mod retention;
pub mod retry;
pub mod section;
pub mod telemetry;

pub use error::{PipelineError, Result};
