//! Result sink trait and the persisted document shape
//!
//! A sink receives the whole collection exactly once, when the crawl reaches
//! its terminal phase. Nothing is streamed; a failed write leaves the
//! in-memory records untouched so the caller can still report or retry.

use crate::state::{ArticleRecord, StopReason};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Output directory {path} is not writable: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Results were already flushed")]
    AlreadyFlushed,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// The JSON document written at the end of a run
///
/// `total_articles` always equals `articles.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleDocument {
    pub category: String,

    /// Site name from the configuration
    pub source: String,

    /// When the crawl started (RFC 3339)
    pub crawled_at: DateTime<Utc>,

    /// SHA-256 of the configuration file, when the run was loaded from one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    pub stop_reason: StopReason,
    pub total_articles: usize,
    pub articles: Vec<ArticleRecord>,
}

impl ArticleDocument {
    pub fn new(
        category: impl Into<String>,
        source: impl Into<String>,
        crawled_at: DateTime<Utc>,
        config_hash: Option<String>,
        stop_reason: StopReason,
        articles: Vec<ArticleRecord>,
    ) -> Self {
        Self {
            category: category.into(),
            source: source.into(),
            crawled_at,
            config_hash,
            stop_reason,
            total_articles: articles.len(),
            articles,
        }
    }
}

/// Trait for result sinks
///
/// Implementations must be thread-safe.
pub trait ResultSink: Send + Sync {
    /// Checks that a later flush can succeed
    ///
    /// Called once before the first listing page is fetched. A failure here
    /// aborts the run before any record exists.
    fn prepare(&self) -> OutputResult<()> {
        Ok(())
    }

    /// Persists the full collection
    ///
    /// # Arguments
    ///
    /// * `document` - Every collected record plus run metadata
    fn flush(&self, document: &ArticleDocument) -> OutputResult<()>;
}
