//! Invitation workflow tests: batch orchestration through acceptance

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use crewdesk_common::Error;
use crewdesk_events::DomainEvent;
use crewdesk_identity::mock::IdentityCall;
use crewdesk_teams::Role;
use serde_json::json;
use uuid::Uuid;

use common::{TestApp, ORIGIN};

fn emails(list: &[&str]) -> Vec<String> {
    list.iter().map(|e| e.to_string()).collect()
}

#[tokio::test]
async fn test_mixed_batch_provisions_only_new_users() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let team_id = app.create_team(owner, "Studio").await;
    let existing = app.seed_user("a@example.com").await;

    let (status, invites) = app
        .call(
            Method::POST,
            &format!("/v1/teams/{}/invites", team_id),
            owner,
            Some(json!({"emailList": ["a@example.com", "b@example.com"]})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invites.as_array().unwrap().len(), 2);
    assert_eq!(invites[0]["userId"], existing.id.to_string());

    let created: Vec<_> = app
        .identity
        .calls()
        .into_iter()
        .filter(|c| matches!(c, IdentityCall::CreateUser { .. }))
        .collect();
    assert_eq!(
        created,
        vec![IdentityCall::CreateUser {
            email: "b@example.com".to_string()
        }]
    );
    assert_eq!(app.email.email_count(), 2);
    assert_eq!(
        app.email.latest_invitation_link("a@example.com").as_deref(),
        Some(ORIGIN)
    );
    assert_ne!(
        app.email.latest_invitation_link("b@example.com").as_deref(),
        Some(ORIGIN)
    );
}

#[tokio::test]
async fn test_email_failure_stops_remaining_recipients() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let team_id = app.create_team(owner, "Studio").await;
    app.email.fail_for("two@example.com");

    let result = app
        .services
        .invites
        .create_invites(
            owner,
            &team_id.to_string(),
            &emails(&["one@example.com", "two@example.com", "three@example.com"]),
            Utc::now(),
        )
        .await;

    assert!(matches!(result, Err(Error::Upstream(_))));
    assert_eq!(app.email.attempt_count(), 2);
    assert!(app
        .identity
        .calls()
        .iter()
        .all(|c| !matches!(c, IdentityCall::CreateUser { email } if email == "three@example.com")));

    let one = app.repos.users.find_by_email("one@example.com").await.unwrap().unwrap();
    let listed = app.services.invites.retrieve_invites(one.id, Utc::now()).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_invalid_address_rejects_whole_batch() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let team_id = app.create_team(owner, "Studio").await;

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/v1/teams/{}/invites", team_id),
            owner,
            Some(json!({"emailList": ["ok@example.com", "not an email"]})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(app.email.attempt_count(), 0);
    assert_eq!(app.identity.created_user_count(), 0);
}

#[tokio::test]
async fn test_invite_to_missing_team_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app
        .call(
            Method::POST,
            &format!("/v1/teams/{}/invites", Uuid::new_v4()),
            Uuid::new_v4(),
            Some(json!({"emailList": ["x@example.com"]})),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.identity.issued_token_count(), 0);
}

#[tokio::test]
async fn test_outsider_cannot_invite_into_team() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let team_id = app.create_team(owner, "Studio").await;
    let outsider = app.seed_user("outsider@example.com").await;

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/v1/teams/{}/invites", team_id),
            outsider.id,
            Some(json!({"emailList": ["target@example.com"]})),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert!(app.identity.calls().is_empty());
    assert_eq!(app.email.attempt_count(), 0);
}

#[tokio::test]
async fn test_recipient_case_does_not_duplicate_accounts() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let team_id = app.create_team(owner, "Studio").await;
    let existing = app.seed_user("grace@example.com").await;

    let (status, invites) = app
        .call(
            Method::POST,
            &format!("/v1/teams/{}/invites", team_id),
            owner,
            Some(json!({"emailList": ["GRACE@example.com"]})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invites[0]["userId"], existing.id.to_string());
    assert_eq!(app.identity.created_user_count(), 0);
}

#[tokio::test]
async fn test_accept_joins_team_as_editor() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let team_id = app.create_team(owner, "Studio").await;
    let invitee = app.seed_user("joiner@example.com").await;

    let invites = app
        .services
        .invites
        .create_invites(owner, &team_id.to_string(), &emails(&["joiner@example.com"]), Utc::now())
        .await
        .unwrap();

    let (status, invite) = app
        .call(
            Method::PATCH,
            &format!("/v1/teams/{}/invites/{}", team_id, invites[0].id),
            invitee.id,
            Some(json!({"accepted": true})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invite["accepted"], true);

    let members = app
        .services
        .memberships
        .retrieve_enhanced(owner, &team_id.to_string())
        .await
        .unwrap();
    let joined: Vec<_> = members.iter().filter(|m| m.user_id == invitee.id).collect();
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].role, Role::Editor);
    assert_eq!(joined[0].email, "joiner@example.com");

    let created: Vec<_> = app
        .events
        .recorded_events()
        .into_iter()
        .filter(|e| matches!(e, DomainEvent::MembershipCreated { .. }))
        .collect();
    assert_eq!(created.len(), 1);
}

#[tokio::test]
async fn test_accepting_twice_is_conflict() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let team_id = app.create_team(owner, "Studio").await;
    let invitee = app.seed_user("twice@example.com").await;
    let invites = app
        .services
        .invites
        .create_invites(owner, &team_id.to_string(), &emails(&["twice@example.com"]), Utc::now())
        .await
        .unwrap();
    let uri = format!("/v1/teams/{}/invites/{}", team_id, invites[0].id);

    let (first, _) = app
        .call(Method::PATCH, &uri, invitee.id, Some(json!({"accepted": true})))
        .await;
    let (second, body) = app
        .call(Method::PATCH, &uri, invitee.id, Some(json!({"accepted": true})))
        .await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_accepting_when_already_member_is_conflict() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let team_id = app.create_team(owner, "Studio").await;
    let invitee = app.seed_user("member@example.com").await;
    app.services
        .memberships
        .create(invitee.id, team_id, Role::Editor, Utc::now())
        .await
        .unwrap();
    let invites = app
        .services
        .invites
        .create_invites(owner, &team_id.to_string(), &emails(&["member@example.com"]), Utc::now())
        .await
        .unwrap();

    let result = app
        .services
        .invites
        .update_invite(
            invitee.id,
            &team_id.to_string(),
            &invites[0].id.to_string(),
            true,
            Utc::now(),
        )
        .await;
    assert!(matches!(result, Err(Error::Conflict(_))));

    // the invite is left untouched
    let invite = app
        .services
        .invites
        .retrieve_invite(invitee.id, &invites[0].id.to_string())
        .await
        .unwrap();
    assert!(!invite.accepted);
}

#[tokio::test]
async fn test_expired_invite_hidden_but_retrievable() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let team_id = app.create_team(owner, "Studio").await;
    let invitee = app.seed_user("late@example.com").await;
    let sent_at = Utc::now() - Duration::days(6);
    let invites = app
        .services
        .invites
        .create_invites(owner, &team_id.to_string(), &emails(&["late@example.com"]), sent_at)
        .await
        .unwrap();

    let (status, inbox) = app.call(Method::GET, "/v1/invites", invitee.id, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(inbox.as_array().unwrap().is_empty());

    let (status, invite) = app
        .call(
            Method::GET,
            &format!("/v1/invites/{}", invites[0].id),
            invitee.id,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invite["id"], invites[0].id.to_string());

    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/v1/teams/{}/invites/{}", team_id, invites[0].id),
            invitee.id,
            Some(json!({"accepted": false})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_management_token_reused_across_batches() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let team_id = app.create_team(owner, "Studio").await;

    for batch in [["n1@example.com"], ["n2@example.com"]] {
        app.services
            .invites
            .create_invites(owner, &team_id.to_string(), &emails(&batch), Utc::now())
            .await
            .unwrap();
    }

    assert_eq!(app.identity.issued_token_count(), 1);
    assert!(app.repos.tokens.retrieve().await.unwrap().is_some());
}
