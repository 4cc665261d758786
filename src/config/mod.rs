//! Configuration module for the image grabber
//!
//! This module provides the `GrabberConfig` struct, its builder, and JSON
//! loading with sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::GrabberConfigBuilder;
pub use types::{DEFAULT_IMAGE_QUERIES, FetchSettings, GrabberConfig, split_query_lines};
