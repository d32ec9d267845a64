//! Authentication middleware for Crewdesk API
//!
//! Decodes the bearer JWT into the caller's local user id and exposes it
//! through an axum extractor that works with any state implementing
//! `FromRef<S>` for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod error;
mod extractors;
mod jwt;

pub use backend::{AuthBackend, AuthContext, IdentityContext};
pub use claims::{AccessClaims, USER_ID_CLAIM};
pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::{AuthUser, IdentityCaller};
