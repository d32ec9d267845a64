//! First-login registration and the caller's own profile
//!
//! Registering mirrors an identity-provider account as a local user and
//! writes the local id back into the account's app metadata, which is
//! where the `user_id` claim of later tokens comes from. Registration is
//! keyed on the identity id, so repeating it returns the stored user and
//! re-applies the metadata.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crewdesk_common::{Error, RepositoryError, Result};
use crewdesk_identity::{IdentityProvider, IdentityUser};
use uuid::Uuid;

use super::token_cache::ManagementTokenCache;
use super::upstream;
use crate::domain::entities::User;
use crate::domain::validation::normalize_email;
use crate::repository::TeamsRepositories;

/// Result of a registration call
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    Created(User),
    Existing(User),
}

impl Registration {
    pub fn user(&self) -> &User {
        match self {
            Self::Created(user) | Self::Existing(user) => user,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    repos: TeamsRepositories,
    identity: Arc<dyn IdentityProvider>,
    token_cache: Arc<ManagementTokenCache>,
}

impl UserService {
    pub fn new(
        repos: TeamsRepositories,
        identity: Arc<dyn IdentityProvider>,
        token_cache: Arc<ManagementTokenCache>,
    ) -> Self {
        Self {
            repos,
            identity,
            token_cache,
        }
    }

    /// Register the identity-provider `account` as a local user.
    ///
    /// An address already held by a different account is a `Conflict`.
    pub async fn register(
        &self,
        account: &IdentityUser,
        now: DateTime<Utc>,
    ) -> Result<Registration> {
        let registration = match self
            .repos
            .users
            .find_by_identity_id(&account.identity_id)
            .await?
        {
            Some(user) => Registration::Existing(user),
            None => {
                let mut user = User::from_identity(account, now);
                user.email = normalize_email(&account.email)?;
                let created = self.repos.users.create(&user).await.map_err(|e| match e {
                    RepositoryError::AlreadyExists => Error::Conflict(
                        "A user with this account or email already exists".to_string(),
                    ),
                    other => other.into(),
                })?;
                Registration::Created(created)
            }
        };

        let user = registration.user();
        let token = self.token_cache.get_or_refresh(now).await?;
        self.identity
            .set_user_metadata(&token, &user.identity_id, user.id)
            .await
            .map_err(upstream("failed to set identity metadata"))
            .inspect_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Registered user left unlinked");
            })?;

        tracing::info!(
            user_id = %user.id,
            identity_id = %user.identity_id,
            created = matches!(registration, Registration::Created(_)),
            "User registered"
        );
        Ok(registration)
    }

    pub async fn retrieve_me(&self, caller: Uuid) -> Result<User> {
        self.repos
            .users
            .get_by_id(caller)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }
}
