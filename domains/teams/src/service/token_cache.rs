//! Management token cache
//!
//! Keeps one identity-provider management token in the token store and
//! refreshes it when absent or expired. An in-process mutex serialises
//! refreshes; separate processes may still race, in which case the last
//! persisted token wins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crewdesk_common::Result;
use crewdesk_identity::{IdentityProvider, ManagementToken};
use tokio::sync::Mutex;

use super::upstream;
use crate::repository::TokenStore;

pub struct ManagementTokenCache {
    tokens: Arc<dyn TokenStore>,
    identity: Arc<dyn IdentityProvider>,
    lock: Mutex<()>,
}

impl ManagementTokenCache {
    pub fn new(tokens: Arc<dyn TokenStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            tokens,
            identity,
            lock: Mutex::new(()),
        }
    }

    /// Return the cached token if still valid at `now`; otherwise issue a
    /// new one, delete the stored tokens and persist the new one, in that
    /// order.
    pub async fn get_or_refresh(&self, now: DateTime<Utc>) -> Result<ManagementToken> {
        let _guard = self.lock.lock().await;

        if let Some(token) = self.tokens.retrieve().await? {
            if !token.is_expired(now) {
                return Ok(token);
            }
            tracing::debug!(expires_at = %token.expires_at, "Management token expired");
        }

        let fresh = self
            .identity
            .issue_management_token()
            .await
            .map_err(upstream("failed to issue management token"))?;

        self.tokens.delete_all().await?;
        let persisted = self.tokens.persist(&fresh).await?;

        tracing::info!(expires_at = %persisted.expires_at, "Management token refreshed");
        Ok(persisted)
    }
}
