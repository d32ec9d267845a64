//! Shared fixtures for the workflow tests
//!
//! Every test gets a fresh in-memory store and mock collaborators, wired
//! through the same router the binaries serve.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use crewdesk_auth::AccessClaims;
use crewdesk_common::Config;
use crewdesk_email::mock::MockEmailService;
use crewdesk_events::mock::MockEventPublisher;
use crewdesk_identity::mock::MockIdentityProvider;
use crewdesk_identity::IdentityUser;
use crewdesk_teams::{
    Collaborators, Project, TeamsRepositories, TeamsServices, User,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const ORIGIN: &str = "https://app.crewdesk.test";

pub struct TestApp {
    pub router: Router,
    pub repos: TeamsRepositories,
    pub services: TeamsServices,
    pub identity: Arc<MockIdentityProvider>,
    pub email: Arc<MockEmailService>,
    pub events: Arc<MockEventPublisher>,
}

impl TestApp {
    pub fn new() -> Self {
        let repos = TeamsRepositories::in_memory();
        let identity = Arc::new(MockIdentityProvider::new());
        let email = Arc::new(MockEmailService::new());
        let events = Arc::new(MockEventPublisher::new());
        let collaborators = Collaborators {
            identity: identity.clone(),
            email: email.clone(),
            events: events.clone(),
        };

        let router =
            crewdesk_app::build_router(&config(), repos.clone(), collaborators.clone());
        let services = TeamsServices::new(repos.clone(), collaborators, ORIGIN);

        Self {
            router,
            repos,
            services,
            identity,
            email,
            events,
        }
    }

    /// Send a request as `caller` and decode the JSON body
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        caller: Uuid,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.call_with_token(method, uri, &token_for(caller), body).await
    }

    pub async fn call_with_token(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    pub async fn seed_project(&self, owner: Uuid) -> Project {
        self.repos
            .projects
            .create(&Project::new("Website", owner, Utc::now()))
            .await
            .expect("seed project")
    }

    /// A user who already has an identity account
    pub async fn seed_user(&self, email: &str) -> User {
        let account = IdentityUser {
            identity_id: format!("auth0|{}", Uuid::new_v4().simple()),
            email: email.to_string(),
            email_verified: true,
            first_name: Some("Existing".to_string()),
            last_name: None,
            picture: None,
            locale: None,
        };
        self.repos
            .users
            .create(&User::from_identity(&account, Utc::now()))
            .await
            .expect("seed user")
    }

    /// Create a team over HTTP and return its id
    pub async fn create_team(&self, owner: Uuid, name: &str) -> Uuid {
        let project = self.seed_project(owner).await;
        let (status, team) = self
            .call(
                Method::POST,
                "/v1/teams",
                owner,
                Some(serde_json::json!({"name": name, "projectId": project.id})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create team: {}", team);
        team["id"]
            .as_str()
            .and_then(|id| id.parse().ok())
            .expect("team id")
    }
}

pub fn config() -> Config {
    Config {
        database_url: "postgres://localhost/crewdesk_test".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_issuer: None,
        jwt_audience: None,
        allowed_origins: ORIGIN.to_string(),
        rust_log: "crewdesk=debug".to_string(),
        port: 3000,
    }
}

pub fn token_for(user_id: Uuid) -> String {
    let now = Utc::now().timestamp() as u64;
    let claims = AccessClaims {
        sub: format!("auth0|{}", user_id.simple()),
        user_id: Some(user_id.to_string()),
        email: None,
        iat: now,
        exp: now + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("sign token")
}

/// Token issued on first login, before the provider knows the local id
pub fn first_login_token(subject: &str, email: &str) -> String {
    let now = Utc::now().timestamp() as u64;
    let claims = AccessClaims {
        sub: subject.to_string(),
        user_id: None,
        email: Some(email.to_string()),
        iat: now,
        exp: now + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("sign token")
}
