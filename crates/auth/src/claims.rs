//! JWT claims types

use serde::{Deserialize, Serialize};

/// Namespaced claim carrying the local user id, set by the identity
/// provider from the account's app metadata.
pub const USER_ID_CLAIM: &str = "https://crewdesk.io/claims/user_id";

/// Access token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (identity provider account, or local user id)
    pub sub: String,
    /// Local user id, when the provider injects it
    #[serde(
        rename = "https://crewdesk.io/claims/user_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at
    pub iat: u64,
    /// Expires at
    pub exp: u64,
}

impl AccessClaims {
    /// The local user id: the namespaced claim if present, otherwise `sub`.
    pub fn local_user_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or(&self.sub)
    }
}
