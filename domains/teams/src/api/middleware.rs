//! Teams domain state and auth backend integration

use axum::extract::FromRef;
use crewdesk_auth::AuthBackend;

use crate::service::TeamsServices;

/// Application state for the Teams domain
#[derive(Clone)]
pub struct TeamsState {
    pub services: TeamsServices,
    pub auth: AuthBackend,
}

impl FromRef<TeamsState> for AuthBackend {
    fn from_ref(state: &TeamsState) -> Self {
        state.auth.clone()
    }
}
