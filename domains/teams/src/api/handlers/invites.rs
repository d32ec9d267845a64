//! Invitation API handlers
//!
//! Team-scoped routes create and answer invites; `/v1/invites` is the
//! caller's own inbox.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use crewdesk_auth::AuthUser;
use crewdesk_common::{Result, ValidatedJson};
use serde::Deserialize;
use validator::Validate;

use crate::api::middleware::TeamsState;
use crate::domain::entities::{Invite, InviteEnhanced};

/// Request for inviting a batch of addresses to a team
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitesRequest {
    #[validate(length(min = 1))]
    pub email_list: Vec<String>,
}

/// Request for reading or accepting an invite
#[derive(Debug, Deserialize)]
pub struct UpdateInviteRequest {
    pub accepted: bool,
}

/// Invite a batch of addresses
///
/// **POST /v1/teams/{team_id}/invites**
///
/// Addresses are processed in order and the first failure ends the batch.
pub async fn create_invites(
    AuthUser(caller): AuthUser,
    State(state): State<TeamsState>,
    Path(team_id): Path<String>,
    ValidatedJson(request): ValidatedJson<CreateInvitesRequest>,
) -> Result<(StatusCode, Json<Vec<Invite>>)> {
    let invites = state
        .services
        .invites
        .create_invites(caller.user_id, &team_id, &request.email_list, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(invites)))
}

/// Mark an invite read, or accept it
///
/// **PATCH /v1/teams/{team_id}/invites/{invite_id}**
pub async fn update_invite(
    AuthUser(caller): AuthUser,
    State(state): State<TeamsState>,
    Path((team_id, invite_id)): Path<(String, String)>,
    Json(request): Json<UpdateInviteRequest>,
) -> Result<Json<Invite>> {
    let invite = state
        .services
        .invites
        .update_invite(
            caller.user_id,
            &team_id,
            &invite_id,
            request.accepted,
            Utc::now(),
        )
        .await?;

    Ok(Json(invite))
}

/// The caller's unexpired invites
///
/// **GET /v1/invites**
pub async fn list_invites(
    AuthUser(caller): AuthUser,
    State(state): State<TeamsState>,
) -> Result<Json<Vec<InviteEnhanced>>> {
    let invites = state
        .services
        .invites
        .retrieve_invites(caller.user_id, Utc::now())
        .await?;

    Ok(Json(invites))
}

/// **GET /v1/invites/{invite_id}**
pub async fn get_invite(
    AuthUser(caller): AuthUser,
    State(state): State<TeamsState>,
    Path(invite_id): Path<String>,
) -> Result<Json<Invite>> {
    let invite = state
        .services
        .invites
        .retrieve_invite(caller.user_id, &invite_id)
        .await?;

    Ok(Json(invite))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_invites_request_validation() {
        let request: CreateInvitesRequest =
            serde_json::from_str(r#"{"emailList": ["a@example.com"]}"#).unwrap();
        assert!(request.validate().is_ok());

        let empty = CreateInvitesRequest { email_list: vec![] };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_update_invite_request_requires_accepted() {
        assert!(serde_json::from_str::<UpdateInviteRequest>("{}").is_err());
        let request: UpdateInviteRequest = serde_json::from_str(r#"{"accepted": true}"#).unwrap();
        assert!(request.accepted);
    }
}
