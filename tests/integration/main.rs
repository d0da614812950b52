//! Integration tests for Paper-Trawl
//!
//! These tests drive the public API only: configuration files on disk,
//! browser discovery over a temporary search path, JSON output, and a full
//! pipeline run over an in-memory session implementation.

mod config_tests;
mod discovery_tests;
mod output_tests;
mod pipeline_tests;
