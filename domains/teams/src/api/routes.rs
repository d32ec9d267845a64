//! Route definitions for Teams domain API

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{invites, memberships, teams, users};
use super::middleware::TeamsState;

/// Create team routes
fn team_routes() -> Router<TeamsState> {
    Router::new()
        .route("/v1/teams", get(teams::list_teams).post(teams::create_team))
        .route("/v1/teams/{team_id}", get(teams::get_team))
        .route("/v1/teams/{team_id}/leave", post(teams::leave_team))
        .route(
            "/v1/teams/{team_id}/projects/{project_id}",
            post(teams::assign_project),
        )
}

/// Create team membership routes
fn membership_routes() -> Router<TeamsState> {
    Router::new()
        .route(
            "/v1/teams/{team_id}/members",
            get(memberships::list_members),
        )
        .route(
            "/v1/teams/{team_id}/members/{user_id}",
            patch(memberships::update_member),
        )
}

/// Create invitation routes
fn invite_routes() -> Router<TeamsState> {
    Router::new()
        .route(
            "/v1/teams/{team_id}/invites",
            post(invites::create_invites),
        )
        .route(
            "/v1/teams/{team_id}/invites/{invite_id}",
            patch(invites::update_invite),
        )
        .route("/v1/invites", get(invites::list_invites))
        .route("/v1/invites/{invite_id}", get(invites::get_invite))
}

/// Create user registration routes
fn user_routes() -> Router<TeamsState> {
    Router::new()
        .route("/v1/users", post(users::register_user))
        .route("/v1/users/me", get(users::get_me))
}

/// Create all Teams domain API routes
pub fn routes() -> Router<TeamsState> {
    Router::new()
        .merge(user_routes())
        .merge(team_routes())
        .merge(membership_routes())
        .merge(invite_routes())
}
