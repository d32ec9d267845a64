//! Mock Identity Provider
//!
//! Records every call so tests can assert provisioning order and counts.
//! Individual operations can be made to fail.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::{IdentityError, IdentityProvider, IdentityUser, ManagementToken};

/// A call received by the mock, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityCall {
    IssueToken,
    CreateUser { email: String },
    SetUserMetadata { identity_id: String, local_user_id: Uuid },
    PasswordSetupLink { identity_id: String, origin: String },
}

/// Operation selector for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityOperation {
    IssueToken,
    CreateUser,
    SetUserMetadata,
    PasswordSetupLink,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<IdentityCall>,
    failing: Vec<IdentityOperation>,
    token_lifetime_secs: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct MockIdentityProvider {
    state: Arc<Mutex<State>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `operation` fail until cleared.
    pub fn fail_on(&self, operation: IdentityOperation) {
        self.state.lock().unwrap().failing.push(operation);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failing.clear();
    }

    /// Lifetime of issued tokens (default one day).
    pub fn set_token_lifetime(&self, secs: i64) {
        self.state.lock().unwrap().token_lifetime_secs = Some(secs);
    }

    pub fn calls(&self) -> Vec<IdentityCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn issued_token_count(&self) -> usize {
        self.count(|c| matches!(c, IdentityCall::IssueToken))
    }

    pub fn created_user_count(&self) -> usize {
        self.count(|c| matches!(c, IdentityCall::CreateUser { .. }))
    }

    fn count(&self, predicate: impl Fn(&IdentityCall) -> bool) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| predicate(c))
            .count()
    }

    fn record(&self, call: IdentityCall, operation: IdentityOperation) -> Result<(), IdentityError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(&operation) {
            return Err(IdentityError::Response(format!(
                "mock identity provider rejected {:?}",
                operation
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn issue_management_token(&self) -> Result<ManagementToken, IdentityError> {
        self.record(IdentityCall::IssueToken, IdentityOperation::IssueToken)?;
        let lifetime = self
            .state
            .lock()
            .unwrap()
            .token_lifetime_secs
            .unwrap_or(86_400);
        Ok(ManagementToken::issued(
            format!("mock-token-{}", Uuid::new_v4()),
            lifetime,
            Utc::now(),
        ))
    }

    async fn create_user(
        &self,
        _token: &ManagementToken,
        email: &str,
    ) -> Result<IdentityUser, IdentityError> {
        self.record(
            IdentityCall::CreateUser {
                email: email.to_string(),
            },
            IdentityOperation::CreateUser,
        )?;
        Ok(IdentityUser {
            identity_id: format!("mock|{}", Uuid::new_v4().simple()),
            email: email.to_string(),
            email_verified: false,
            first_name: None,
            last_name: None,
            picture: None,
            locale: None,
        })
    }

    async fn set_user_metadata(
        &self,
        _token: &ManagementToken,
        identity_id: &str,
        local_user_id: Uuid,
    ) -> Result<(), IdentityError> {
        self.record(
            IdentityCall::SetUserMetadata {
                identity_id: identity_id.to_string(),
                local_user_id,
            },
            IdentityOperation::SetUserMetadata,
        )
    }

    async fn password_setup_link(
        &self,
        _token: &ManagementToken,
        user: &IdentityUser,
        origin: &str,
    ) -> Result<String, IdentityError> {
        self.record(
            IdentityCall::PasswordSetupLink {
                identity_id: user.identity_id.clone(),
                origin: origin.to_string(),
            },
            IdentityOperation::PasswordSetupLink,
        )?;
        Ok(format!(
            "https://identity.mock/tickets/{}#type=invite",
            user.identity_id
        ))
    }
}
