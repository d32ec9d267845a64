//! First-login registration: a self-signed-up account becomes a local user
//! and can then bootstrap a team.

mod common;

use axum::http::{Method, StatusCode};
use crewdesk_identity::mock::{IdentityCall, IdentityOperation};
use serde_json::json;
use uuid::Uuid;

use common::{first_login_token, TestApp};

#[tokio::test]
async fn test_self_signup_registers_then_creates_team() {
    let app = TestApp::new();
    let token = first_login_token("auth0|selfsignup", "founder@example.com");

    let (status, _) = app
        .call_with_token(Method::GET, "/v1/teams", &token, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, user) = app
        .call_with_token(
            Method::POST,
            "/v1/users",
            &token,
            Some(json!({"firstName": "Fran", "emailVerified": true})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], "founder@example.com");
    assert_eq!(user["emailVerified"], true);

    let user_id: Uuid = user["id"].as_str().unwrap().parse().unwrap();
    assert!(app.identity.calls().contains(&IdentityCall::SetUserMetadata {
        identity_id: "auth0|selfsignup".to_string(),
        local_user_id: user_id,
    }));

    // The next token carries the local id
    let team_id = app.create_team(user_id, "Founders").await;
    let (status, members) = app
        .call(
            Method::GET,
            &format!("/v1/teams/{}/members", team_id),
            user_id,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members[0]["userId"], user_id.to_string());
    assert_eq!(members[0]["email"], "founder@example.com");
    assert_eq!(members[0]["firstName"], "Fran");

    let (status, me) = app.call(Method::GET, "/v1/users/me", user_id, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["identityId"], "auth0|selfsignup");
}

#[tokio::test]
async fn test_repeat_registration_returns_existing_user() {
    let app = TestApp::new();
    let token = first_login_token("auth0|again", "again@example.com");

    let (first_status, first) = app
        .call_with_token(Method::POST, "/v1/users", &token, Some(json!({})))
        .await;
    let (second_status, second) = app
        .call_with_token(Method::POST, "/v1/users", &token, Some(json!({})))
        .await;

    assert_eq!(first_status, StatusCode::CREATED);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first["id"], second["id"]);
    assert_eq!(app.identity.issued_token_count(), 1);
    assert!(app
        .repos
        .users
        .find_by_identity_id("auth0|again")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_invited_address_cannot_be_claimed_by_other_account() {
    let app = TestApp::new();
    app.seed_user("taken@example.com").await;
    let token = first_login_token("google|someone", "Taken@example.com");

    let (status, body) = app
        .call_with_token(Method::POST, "/v1/users", &token, Some(json!({})))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert!(app.identity.calls().is_empty());
}

#[tokio::test]
async fn test_registration_upstream_failure() {
    let app = TestApp::new();
    app.identity.fail_on(IdentityOperation::SetUserMetadata);
    let token = first_login_token("auth0|flaky", "flaky@example.com");

    let (status, body) = app
        .call_with_token(Method::POST, "/v1/users", &token, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_FAILURE");

    app.identity.clear_failures();
    let (status, _) = app
        .call_with_token(Method::POST, "/v1/users", &token, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_registration_requires_valid_token() {
    let app = TestApp::new();

    let (status, _) = app
        .call_with_token(Method::POST, "/v1/users", "not-a-jwt", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
