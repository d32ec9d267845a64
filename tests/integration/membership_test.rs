//! Membership lifecycle tests

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
async fn test_role_update_round_trip() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let team_id = app.create_team(owner, "Studio").await;
    let member = Uuid::new_v4();
    app.services
        .memberships
        .create(member, team_id, Role::Editor, Utc::now())
        .await
        .unwrap();

    let uri = format!("/v1/teams/{}/members/{}", team_id, member);
    let (status, updated) = app
        .call(Method::PATCH, &uri, owner, Some(json!({"role": "administrator"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "administrator");

    let stored = app
        .services
        .memberships
        .retrieve(&team_id.to_string(), &member.to_string())
        .await
        .unwrap();
    assert_eq!(stored.role, Role::Administrator);

    // an absent role keeps the current one
    let (status, unchanged) = app.call(Method::PATCH, &uri, owner, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["role"], "administrator");
}

#[tokio::test]
async fn test_duplicate_membership_is_conflict() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let team_id = app.create_team(owner, "Studio").await;

    let result = app
        .services
        .memberships
        .create(owner, team_id, Role::Editor, Utc::now())
        .await;
    assert!(matches!(result, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn test_non_member_cannot_list_members() {
    let app = TestApp::new();
    let team_id = app.create_team(Uuid::new_v4(), "Studio").await;

    let (status, _) = app
        .call(
            Method::GET,
            &format!("/v1/teams/{}/members", team_id),
            Uuid::new_v4(),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leave_team_publishes_membership_deleted() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let team_id = app.create_team(owner, "Studio").await;
    let member = Uuid::new_v4();
    let membership = app
        .services
        .memberships
        .create(member, team_id, Role::Editor, Utc::now())
        .await
        .unwrap();

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/v1/teams/{}/leave", team_id),
            member,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["membershipId"], membership.id.to_string());

    assert_eq!(
        app.events.recorded_events().last(),
        Some(&DomainEvent::MembershipDeleted {
            membership_id: membership.id,
            user_id: member,
        })
    );

    let result = app
        .services
        .memberships
        .retrieve(&team_id.to_string(), &member.to_string())
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_list_teams_only_shows_memberships() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    app.create_team(owner, "Mine").await;
    app.create_team(Uuid::new_v4(), "Theirs").await;

    let (status, teams) = app.call(Method::GET, "/v1/teams", owner, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = teams
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Mine"]);
}
