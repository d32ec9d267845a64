//! Auth0 Management API client
//!
//! Client-credentials token issuance plus the user, metadata and
//! password-change ticket endpoints.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{IdentityConfig, IdentityError, IdentityProvider, IdentityUser, ManagementToken};

/// Lifetime of a password setup ticket, in seconds.
const TICKET_TTL_SECS: i64 = 7 * 24 * 60 * 60;

pub struct Auth0Client {
    http: reqwest::Client,
    base_url: String,
    config: IdentityConfig,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Deserialize)]
struct UserResponse {
    user_id: String,
    email: String,
    #[serde(default)]
    email_verified: bool,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
    locale: Option<String>,
}

#[derive(Deserialize)]
struct TicketResponse {
    ticket: String,
}

impl Auth0Client {
    pub fn new(config: IdentityConfig) -> Self {
        let base_url = if config.domain.starts_with("http://") || config.domain.starts_with("https://")
        {
            config.domain.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", config.domain.trim_end_matches('/'))
        };
        Self {
            http: reqwest::Client::new(),
            base_url,
            config,
        }
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
        operation: &str,
    ) -> Result<T, IdentityError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(IdentityError::Response(format!(
                "{} returned {}: {}",
                operation, status, body
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| IdentityError::Response(format!("{}: invalid body: {}", operation, e)))
    }
}

/// Random initial password; the invitee replaces it through the setup link.
fn initial_password() -> Result<String, IdentityError> {
    let mut bytes = [0u8; 24];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| IdentityError::Request(format!("password generation failed: {}", e)))?;
    // Suffix satisfies Auth0 character-class policies
    Ok(format!("{}aA1!", URL_SAFE_NO_PAD.encode(bytes)))
}

#[async_trait::async_trait]
impl IdentityProvider for Auth0Client {
    async fn issue_management_token(&self) -> Result<ManagementToken, IdentityError> {
        let response = self
            .http
            .post(format!("{}/oauth/token", self.base_url))
            .json(&serde_json::json!({
                "grant_type": "client_credentials",
                "client_id": self.config.client_id,
                "client_secret": self.config.client_secret,
                "audience": self.config.audience,
            }))
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let body: TokenResponse = Self::read_json(response, "token issuance").await?;
        tracing::info!(expires_in = body.expires_in, "Issued management token");
        Ok(ManagementToken::issued(
            body.access_token,
            body.expires_in,
            Utc::now(),
        ))
    }

    async fn create_user(
        &self,
        token: &ManagementToken,
        email: &str,
    ) -> Result<IdentityUser, IdentityError> {
        let response = self
            .http
            .post(format!("{}/api/v2/users", self.base_url))
            .bearer_auth(&token.access_token)
            .json(&serde_json::json!({
                "email": email,
                "connection": self.config.connection,
                "password": initial_password()?,
                "email_verified": false,
                "verify_email": false,
            }))
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let user: UserResponse = Self::read_json(response, "user creation").await?;
        tracing::info!(identity_id = %user.user_id, "Created identity account");
        Ok(IdentityUser {
            identity_id: user.user_id,
            email: user.email,
            email_verified: user.email_verified,
            first_name: user.given_name,
            last_name: user.family_name,
            picture: user.picture,
            locale: user.locale,
        })
    }

    async fn set_user_metadata(
        &self,
        token: &ManagementToken,
        identity_id: &str,
        local_user_id: Uuid,
    ) -> Result<(), IdentityError> {
        let response = self
            .http
            .patch(format!("{}/api/v2/users/{}", self.base_url, identity_id))
            .bearer_auth(&token.access_token)
            .json(&serde_json::json!({
                "app_metadata": { "id": local_user_id }
            }))
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let _: serde_json::Value = Self::read_json(response, "metadata update").await?;
        Ok(())
    }

    async fn password_setup_link(
        &self,
        token: &ManagementToken,
        user: &IdentityUser,
        origin: &str,
    ) -> Result<String, IdentityError> {
        let response = self
            .http
            .post(format!("{}/api/v2/tickets/password-change", self.base_url))
            .bearer_auth(&token.access_token)
            .json(&serde_json::json!({
                "user_id": user.identity_id,
                "result_url": origin,
                "ttl_sec": TICKET_TTL_SECS,
                "mark_email_as_verified": true,
            }))
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let body: TicketResponse = Self::read_json(response, "password ticket").await?;
        Ok(body.ticket)
    }
}
