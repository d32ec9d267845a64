//! Shared utilities, configuration, and error handling for Crewdesk
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration loaded from the environment (12-factor)
//! - The error taxonomy surfaced at the HTTP boundary
//! - Repository error types shared by store implementations
//! - Validating JSON extractor for axum handlers

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
