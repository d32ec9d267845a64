//! Team bootstrap workflow tests

mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use crewdesk_common::Error;
use crewdesk_events::DomainEvent;
use crewdesk_teams::Role;
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn test_bootstrap_creates_team_membership_and_binding() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let project = app.seed_project(owner).await;

    let team = app
        .services
        .teams
        .create_team(owner, "Design", &project.id.to_string(), Utc::now())
        .await
        .unwrap();

    let membership = app
        .services
        .memberships
        .retrieve(&team.id.to_string(), &owner.to_string())
        .await
        .unwrap();
    assert_eq!(membership.role, Role::Administrator);

    let bound = app.repos.projects.get_by_id(project.id).await.unwrap().unwrap();
    assert_eq!(bound.team_id, Some(team.id));

    let events = app.events.recorded_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        DomainEvent::MembershipCreatedForProject { team_id, project_id, .. }
            if *team_id == team.id && *project_id == project.id
    ));
}

#[tokio::test]
async fn test_bootstrap_for_missing_project_writes_nothing() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();

    let result = app
        .services
        .teams
        .create_team(owner, "Design", &Uuid::new_v4().to_string(), Utc::now())
        .await;

    assert!(matches!(result, Err(Error::NotFound(_))));
    assert!(app.services.teams.list_teams(owner).await.unwrap().is_empty());
    assert!(app.events.recorded_events().is_empty());
}

#[tokio::test]
async fn test_invalid_team_id_is_rejected() {
    let app = TestApp::new();

    let result = app.services.teams.retrieve_team("team-42").await;
    assert!(matches!(result, Err(Error::InvalidId(_))));

    let (status, body) = app
        .call(Method::GET, "/v1/teams/team-42", Uuid::new_v4(), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_IDENTIFIER");
}

#[tokio::test]
async fn test_event_failure_surfaces_after_commit() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let project = app.seed_project(owner).await;
    app.events.set_failing(true);

    let (status, body) = app
        .call(
            Method::POST,
            "/v1/teams",
            owner,
            Some(json!({"name": "Design", "projectId": project.id})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_FAILURE");

    // the team was committed before publishing
    let teams = app.services.teams.list_teams(owner).await.unwrap();
    assert_eq!(teams.len(), 1);
}

#[tokio::test]
async fn test_assign_existing_team_rebinds_project() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let first = app.create_team(owner, "First").await;
    let second = app.create_team(owner, "Second").await;
    let project = app.seed_project(owner).await;

    for team_id in [first, second] {
        let (status, body) = app
            .call(
                Method::POST,
                &format!("/v1/teams/{}/projects/{}", team_id, project.id),
                owner,
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["teamId"], team_id.to_string());
    }

    let bound = app.repos.projects.get_by_id(project.id).await.unwrap().unwrap();
    assert_eq!(bound.team_id, Some(second));
    assert!(matches!(
        app.events.recorded_events().last(),
        Some(DomainEvent::ProjectUpdated { team_id, .. }) if *team_id == second
    ));
}
