//! Crewdesk application composition root
//!
//! Builds the collaborators from configuration and composes the domain
//! routers into a single application.

use std::sync::Arc;

use axum::{http::HeaderValue, Router};
use crewdesk_auth::{AuthBackend, AuthConfig};
use crewdesk_common::Config;
use crewdesk_email::{EmailConfig, EmailServiceFactory};
use crewdesk_events::{EventPublisherFactory, EventsConfig};
use crewdesk_identity::{IdentityConfig, IdentityProviderFactory};
use crewdesk_teams::{Collaborators, TeamsRepositories, TeamsServices, TeamsState};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

/// Request bodies larger than this are rejected with 413
pub const MAX_BODY_BYTES: usize = 256 * 1024;

/// Build the collaborators each from its own configuration section
pub async fn build_collaborators() -> anyhow::Result<Collaborators> {
    let email = EmailServiceFactory::create(EmailConfig::from_env()?).await?;
    let identity = IdentityProviderFactory::create(IdentityConfig::from_env()?)?;
    let events = EventPublisherFactory::create(EventsConfig::from_env()?)?;

    Ok(Collaborators {
        identity: Arc::from(identity),
        email: Arc::from(email),
        events: Arc::from(events),
    })
}

/// Create the main application router backed by Postgres
pub async fn create_app(config: &Config, pool: PgPool) -> anyhow::Result<Router> {
    let collaborators = build_collaborators().await?;
    let repos = TeamsRepositories::postgres(pool);

    Ok(build_router(config, repos, collaborators))
}

/// Compose routes over the given stores and collaborators
pub fn build_router(
    config: &Config,
    repos: TeamsRepositories,
    collaborators: Collaborators,
) -> Router {
    let teams_state = TeamsState {
        services: TeamsServices::new(repos, collaborators, config.invite_origin()),
        auth: AuthBackend::new(AuthConfig::from(config)),
    };

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { concat!("Crewdesk API v", env!("CARGO_PKG_VERSION")) }),
        )
        .merge(crewdesk_teams::routes().with_state(teams_state))
}

/// CORS for the comma-separated origin list; unparseable entries are skipped
pub fn build_cors_layer(origins: &str) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn body_limit_layer() -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(MAX_BODY_BYTES)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
