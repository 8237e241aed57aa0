//! Crawl phase definitions for the pagination state machine
//!
//! This module defines every phase the orchestrator moves through while
//! harvesting a category, plus the reasons a crawl can stop.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a crawl reached its terminal phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// A listing page yielded nothing new under the configured stop policy
    Exhausted,

    /// The configured page cap was reached
    PageLimit,

    /// The cancellation token was triggered
    Cancelled,

    /// A listing page could not be fetched
    ListingFailed,
}

impl StopReason {
    /// Returns the string form used in logs and the output document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::PageLimit => "page_limit",
            Self::Cancelled => "cancelled",
            Self::ListingFailed => "listing_failed",
        }
    }

    /// Returns true if the crawl ended because the listing ran out
    pub fn is_natural(&self) -> bool {
        matches!(self, Self::Exhausted | Self::PageLimit)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the current phase of a crawl
///
/// ```text
/// Idle -> Paging(1) -> Dispatching(1) -> Aggregating(1) -> Paging(2) -> ...
///            |                                |
///            +---------> Stopped <------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// No crawl has started yet
    Idle,

    /// Fetching listing page `page`
    Paging { page: u32 },

    /// Claiming candidate links from `page` and launching article fetches
    Dispatching { page: u32 },

    /// Waiting for the article fetches launched from `page`
    Aggregating { page: u32 },

    /// Terminal; the collected records are ready to flush
    Stopped(StopReason),
}

impl CrawlPhase {
    /// Returns true if this is the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }

    /// Returns the listing page this phase refers to, if any
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Paging { page } | Self::Dispatching { page } | Self::Aggregating { page } => {
                Some(*page)
            }
            Self::Idle | Self::Stopped(_) => None,
        }
    }

    /// Returns the stop reason if the crawl has stopped
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            Self::Stopped(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// Pages are visited strictly in order: the only way to reach
    /// `Paging { n + 1 }` is from `Aggregating { n }`.
    pub fn can_transition_to(&self, next: &CrawlPhase) -> bool {
        match (self, next) {
            (Self::Idle, Self::Paging { page }) => *page == 1,
            (Self::Paging { page: a }, Self::Dispatching { page: b }) => a == b,
            (Self::Dispatching { page: a }, Self::Aggregating { page: b }) => a == b,
            (Self::Aggregating { page: a }, Self::Paging { page: b }) => *b == a + 1,
            (Self::Paging { .. }, Self::Stopped(_)) => true,
            (Self::Aggregating { .. }, Self::Stopped(_)) => true,
            _ => false,
        }
    }

    /// Returns a short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Paging { .. } => "paging",
            Self::Dispatching { .. } => "dispatching",
            Self::Aggregating { .. } => "aggregating",
            Self::Stopped(_) => "stopped",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped(reason) => write!(f, "stopped ({})", reason),
            other => match other.page() {
                Some(page) => write!(f, "{} (page {})", other.name(), page),
                None => write!(f, "{}", other.name()),
            },
        }
    }
}
