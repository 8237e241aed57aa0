//! Integration tests for Tag-Harvest
//!
//! These tests use wiremock to stand up mock news sites and exercise the
//! HTTP fetcher and full harvests end-to-end.

mod crawl_tests;
mod fetcher_tests;
