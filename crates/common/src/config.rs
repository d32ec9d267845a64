//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. Collaborator crates
//! (email, identity, events) load their own sections.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_ORIGIN: &str = "http://localhost:3000";

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (PostgreSQL)
    pub database_url: String,

    /// Bearer token verification
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,

    /// Comma-separated list of allowed web origins
    pub allowed_origins: String,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("allowed_origins", &self.allowed_origins)
            .field("rust_log", &self.rust_log)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,

            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET is required"))?,
            jwt_issuer: env::var("JWT_ISSUER").ok(),
            jwt_audience: env::var("JWT_AUDIENCE").ok(),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| DEFAULT_ORIGIN.to_string()),

            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "crewdesk=debug".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        Ok(config)
    }

    /// The origin used as the invitation link for already-registered users
    /// and as the return URL of password-setup links.
    pub fn invite_origin(&self) -> String {
        first_origin(&self.allowed_origins)
    }
}

/// First non-empty entry of a comma-separated origin list
pub fn first_origin(origins: &str) -> String {
    origins
        .split(',')
        .map(str::trim)
        .find(|o| !o.is_empty())
        .unwrap_or(DEFAULT_ORIGIN)
        .to_string()
}
