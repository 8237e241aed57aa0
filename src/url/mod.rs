//! URL handling module for Tag-Harvest
//!
//! This module provides dedup-key normalization for candidate article URLs and
//! construction of paginated listing page URLs.

mod listing;
mod normalize;

// Re-export main functions
pub use listing::{listing_url, validate_category};
pub use normalize::normalize_url;
