//! Team membership API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use crewdesk_auth::AuthUser;
use crewdesk_common::Result;
use serde::Deserialize;

use crate::api::middleware::TeamsState;
use crate::domain::entities::{Membership, MembershipWithUser, Role};

/// Request for updating a member. An absent role keeps the current one.
#[derive(Debug, Deserialize)]
pub struct UpdateMembershipRequest {
    #[serde(default)]
    pub role: Option<Role>,
}

/// List team members with their profiles
///
/// **GET /v1/teams/{team_id}/members**
///
/// Only members of the team can see the list.
pub async fn list_members(
    AuthUser(caller): AuthUser,
    State(state): State<TeamsState>,
    Path(team_id): Path<String>,
) -> Result<Json<Vec<MembershipWithUser>>> {
    let members = state
        .services
        .memberships
        .retrieve_enhanced(caller.user_id, &team_id)
        .await?;

    Ok(Json(members))
}

/// Change a member's role
///
/// **PATCH /v1/teams/{team_id}/members/{user_id}**
///
/// Requires the caller to be an administrator of the team.
pub async fn update_member(
    AuthUser(caller): AuthUser,
    State(state): State<TeamsState>,
    Path((team_id, user_id)): Path<(String, String)>,
    Json(request): Json<UpdateMembershipRequest>,
) -> Result<Json<Membership>> {
    let membership = state
        .services
        .memberships
        .update_as_administrator(caller.user_id, &team_id, request.role, &user_id, Utc::now())
        .await?;

    Ok(Json(membership))
}
