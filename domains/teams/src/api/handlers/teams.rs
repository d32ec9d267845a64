//! Team API handlers
//!
//! Creating a team bootstraps it for a project: the caller becomes its
//! administrator and the project is bound to it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use crewdesk_auth::AuthUser;
use crewdesk_common::{Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::TeamsState;
use crate::domain::entities::{Project, Team};

/// Request for creating a new team
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    /// Team display name, trimmed before storage
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// Project the team is created for
    pub project_id: String,
}

/// Response for leaving a team
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveTeamResponse {
    pub membership_id: Uuid,
}

/// Create a new team
///
/// **POST /v1/teams**
pub async fn create_team(
    AuthUser(caller): AuthUser,
    State(state): State<TeamsState>,
    ValidatedJson(request): ValidatedJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<Team>)> {
    let team = state
        .services
        .teams
        .create_team(caller.user_id, &request.name, &request.project_id, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(team)))
}

/// List teams the caller belongs to
///
/// **GET /v1/teams**
pub async fn list_teams(
    AuthUser(caller): AuthUser,
    State(state): State<TeamsState>,
) -> Result<Json<Vec<Team>>> {
    let teams = state.services.teams.list_teams(caller.user_id).await?;
    Ok(Json(teams))
}

/// **GET /v1/teams/{team_id}**
pub async fn get_team(
    _caller: AuthUser,
    State(state): State<TeamsState>,
    Path(team_id): Path<String>,
) -> Result<Json<Team>> {
    let team = state.services.teams.retrieve_team(&team_id).await?;
    Ok(Json(team))
}

/// Bind a project to an existing team
///
/// **POST /v1/teams/{team_id}/projects/{project_id}**
pub async fn assign_project(
    AuthUser(caller): AuthUser,
    State(state): State<TeamsState>,
    Path((team_id, project_id)): Path<(String, String)>,
) -> Result<Json<Project>> {
    let project = state
        .services
        .teams
        .assign_existing_team(caller.user_id, &team_id, &project_id, Utc::now())
        .await?;

    Ok(Json(project))
}

/// Leave a team
///
/// **POST /v1/teams/{team_id}/leave**
pub async fn leave_team(
    AuthUser(caller): AuthUser,
    State(state): State<TeamsState>,
    Path(team_id): Path<String>,
) -> Result<Json<LeaveTeamResponse>> {
    let membership_id = state
        .services
        .teams
        .leave_team(caller.user_id, &team_id)
        .await?;

    Ok(Json(LeaveTeamResponse { membership_id }))
}
