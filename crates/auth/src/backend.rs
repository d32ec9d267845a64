//! Authentication backend
//!
//! Domain states expose this via `FromRef`:
//! ```ignore
//! impl FromRef<MyDomainState> for AuthBackend {
//!     fn from_ref(state: &MyDomainState) -> Self {
//!         state.auth.clone()
//!     }
//! }
//! ```

use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::jwt::validate_jwt_token;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Caller as the identity provider knows them. Used before a local user
/// exists, i.e. on first login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    pub subject: String,
    pub email: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AuthBackend {
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Validate `token` and resolve the caller's local user id.
    pub fn authenticate_jwt(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = validate_jwt_token(token, &self.config)?;

        let user_id = Uuid::parse_str(claims.local_user_id()).map_err(|_| {
            tracing::debug!(sub = %claims.sub, "Token does not carry a local user id");
            AuthError::InvalidUserId
        })?;

        Ok(AuthContext {
            user_id,
            email: claims.email,
        })
    }

    /// Validate `token` without requiring a local user id.
    pub fn authenticate_identity(&self, token: &str) -> Result<IdentityContext, AuthError> {
        let claims = validate_jwt_token(token, &self.config)?;
        Ok(IdentityContext {
            subject: claims.sub,
            email: claims.email,
        })
    }
}
