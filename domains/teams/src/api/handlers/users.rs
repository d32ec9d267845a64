//! User API handlers
//!
//! Registration runs on the caller's first login, before their token
//! carries a local user id, so it authenticates the identity-provider
//! subject only.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use crewdesk_auth::{AuthUser, IdentityCaller};
use crewdesk_common::{Error, Result, ValidatedJson};
use crewdesk_identity::IdentityUser;
use serde::Deserialize;
use validator::Validate;

use crate::api::middleware::TeamsState;
use crate::domain::entities::User;
use crate::service::Registration;

/// Profile sent on first login. `email` falls back to the token's claim.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
    pub locale: Option<String>,
}

/// Register the caller as a local user
///
/// **POST /v1/users**
///
/// 201 with the new user, or 200 with the stored one when the caller
/// registered before.
pub async fn register_user(
    IdentityCaller(caller): IdentityCaller,
    State(state): State<TeamsState>,
    ValidatedJson(request): ValidatedJson<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let email = request
        .email
        .or(caller.email)
        .ok_or_else(|| Error::Validation("An email address is required".to_string()))?;

    let account = IdentityUser {
        identity_id: caller.subject,
        email,
        email_verified: request.email_verified,
        first_name: request.first_name,
        last_name: request.last_name,
        picture: request.picture,
        locale: request.locale,
    };

    match state.services.users.register(&account, Utc::now()).await? {
        Registration::Created(user) => Ok((StatusCode::CREATED, Json(user))),
        Registration::Existing(user) => Ok((StatusCode::OK, Json(user))),
    }
}

/// **GET /v1/users/me**
pub async fn get_me(
    AuthUser(caller): AuthUser,
    State(state): State<TeamsState>,
) -> Result<Json<User>> {
    let user = state.services.users.retrieve_me(caller.user_id).await?;
    Ok(Json(user))
}
