//! Crewdesk Identity Provider Client
//!
//! Provisions accounts for invited people in the external identity
//! provider:
//! - Auth0 management API integration for production
//! - Mock provider recording calls for tests and development

pub mod auth0;
pub mod mock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Tokens are treated as expired this long before their real expiry.
pub const TOKEN_REFRESH_SKEW_SECS: i64 = 60;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Identity configuration error: {0}")]
    Configuration(String),

    #[error("Identity request error: {0}")]
    Request(String),

    #[error("Identity response error: {0}")]
    Response(String),
}

/// Credential for the provider's management API.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementToken {
    pub id: Uuid,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ManagementToken {
    /// Build a token issued at `now` that lives for `expires_in_secs`.
    pub fn issued(access_token: String, expires_in_secs: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            access_token,
            expires_at: now + Duration::seconds(expires_in_secs),
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at - Duration::seconds(TOKEN_REFRESH_SKEW_SECS)
    }
}

impl std::fmt::Debug for ManagementToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementToken")
            .field("id", &self.id)
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Account as known to the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub identity_id: String,
    pub email: String,
    pub email_verified: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
    pub locale: Option<String>,
}

/// Identity provider configuration.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Provider (auth0, mock)
    pub provider: String,
    /// Tenant domain, e.g. `crewdesk.eu.auth0.com`
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    /// Management API audience
    pub audience: String,
    /// Database connection new accounts are created in
    pub connection: String,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("provider", &self.provider)
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("audience", &self.audience)
            .field("connection", &self.connection)
            .finish()
    }
}

impl IdentityConfig {
    /// Create identity config from environment variables.
    pub fn from_env() -> Result<Self, IdentityError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("IDENTITY_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let domain = std::env::var("AUTH0_DOMAIN").unwrap_or_default();
        let client_id = std::env::var("AUTH0_CLIENT_ID").unwrap_or_default();
        let client_secret = std::env::var("AUTH0_CLIENT_SECRET").unwrap_or_default();
        let audience = std::env::var("AUTH0_AUDIENCE")
            .unwrap_or_else(|_| format!("https://{}/api/v2/", domain));
        let connection = std::env::var("AUTH0_CONNECTION")
            .unwrap_or_else(|_| "Username-Password-Authentication".to_string());

        let config = Self {
            provider,
            domain,
            client_id,
            client_secret,
            audience,
            connection,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), IdentityError> {
        if self.provider == "mock" {
            return Ok(());
        }
        for (name, value) in [
            ("AUTH0_DOMAIN", &self.domain),
            ("AUTH0_CLIENT_ID", &self.client_id),
            ("AUTH0_CLIENT_SECRET", &self.client_secret),
        ] {
            if value.is_empty() {
                return Err(IdentityError::Configuration(format!(
                    "{} is required for the auth0 provider",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Operations the invite workflow needs from the identity provider.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Obtain a fresh management API credential.
    async fn issue_management_token(&self) -> Result<ManagementToken, IdentityError>;

    /// Create an account for `email` with a random initial password.
    async fn create_user(
        &self,
        token: &ManagementToken,
        email: &str,
    ) -> Result<IdentityUser, IdentityError>;

    /// Attach the local user id to the provider account.
    async fn set_user_metadata(
        &self,
        token: &ManagementToken,
        identity_id: &str,
        local_user_id: Uuid,
    ) -> Result<(), IdentityError>;

    /// Produce a single-use password setup link that returns to `origin`.
    async fn password_setup_link(
        &self,
        token: &ManagementToken,
        user: &IdentityUser,
        origin: &str,
    ) -> Result<String, IdentityError>;
}

/// Factory for creating IdentityProvider implementations.
pub struct IdentityProviderFactory;

impl IdentityProviderFactory {
    pub fn create(config: IdentityConfig) -> Result<Box<dyn IdentityProvider>, IdentityError> {
        match config.provider.as_str() {
            "auth0" => {
                tracing::info!(domain = %config.domain, "Creating Auth0 identity provider");
                config.validate()?;
                Ok(Box::new(auth0::Auth0Client::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock identity provider");
                Ok(Box::new(mock::MockIdentityProvider::new()))
            }
            provider => Err(IdentityError::Configuration(format!(
                "Unknown identity provider: {}. Supported providers: auth0, mock",
                provider
            ))),
        }
    }
}
