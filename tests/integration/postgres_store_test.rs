//! Postgres store tests
//!
//! Run only when `TEST_DATABASE_URL` points at a disposable database;
//! otherwise each test returns early.

use chrono::{Duration, DurationRound, Utc};
use crewdesk_common::RepositoryError;
use crewdesk_identity::{IdentityUser, ManagementToken};
use crewdesk_teams::{Invite, Membership, Project, Role, Team, TeamsRepositories, User};
use sqlx::PgPool;
use uuid::Uuid;

async fn pool() -> Option<PgPool> {
    dotenvy::from_filename(".env.test").ok();
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPool::connect(&url).await.expect("connect to test database");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}

fn account(email: &str) -> IdentityUser {
    IdentityUser {
        identity_id: format!("auth0|{}", Uuid::new_v4().simple()),
        email: email.to_string(),
        email_verified: false,
        first_name: None,
        last_name: None,
        picture: None,
        locale: None,
    }
}

/// Postgres keeps microseconds; truncate so round-tripped values compare equal
fn now() -> chrono::DateTime<Utc> {
    Utc::now()
        .duration_trunc(Duration::microseconds(1))
        .expect("truncate timestamp")
}

#[tokio::test]
async fn test_bootstrap_and_accept_in_postgres() {
    let Some(pool) = pool().await else {
        return;
    };
    let repos = TeamsRepositories::postgres(pool);
    let now = now();

    let owner = repos
        .users
        .create(&User::from_identity(
            &account(&format!("owner-{}@example.com", Uuid::new_v4().simple())),
            now,
        ))
        .await
        .unwrap();
    let project = repos
        .projects
        .create(&Project::new("Site", owner.id, now))
        .await
        .unwrap();

    let team = Team::new("Postgres Team", owner.id, now).unwrap();
    let owner_membership = Membership::new(owner.id, team.id, Role::Administrator, now);
    repos
        .teams
        .bootstrap(&team, &owner_membership, project.id, now)
        .await
        .unwrap();

    let bound = repos.projects.get_by_id(project.id).await.unwrap().unwrap();
    assert_eq!(bound.team_id, Some(team.id));

    let duplicate = repos.memberships.create(&owner_membership).await;
    assert!(matches!(duplicate, Err(RepositoryError::AlreadyExists)));

    let invitee = repos
        .users
        .create(&User::from_identity(
            &account(&format!("invitee-{}@example.com", Uuid::new_v4().simple())),
            now,
        ))
        .await
        .unwrap();
    let mut invite = repos
        .invites
        .create(&Invite::new(invitee.id, team.id, now))
        .await
        .unwrap();

    let inbox = repos
        .invites
        .list_for_user_unexpired(invitee.id, now)
        .await
        .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].team_name, "Postgres Team");

    invite.read = true;
    invite.accepted = true;
    let (accepted, membership) = repos
        .invites
        .accept(&invite, &Membership::new(invitee.id, team.id, Role::Editor, now))
        .await
        .unwrap();
    assert!(accepted.accepted);
    assert_eq!(membership.role, Role::Editor);

    let members = repos.memberships.list_by_team_with_users(team.id).await.unwrap();
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn test_bootstrap_rolls_back_for_missing_project() {
    let Some(pool) = pool().await else {
        return;
    };
    let repos = TeamsRepositories::postgres(pool);
    let now = now();
    let owner = Uuid::new_v4();

    let team = Team::new("Rolled Back", owner, now).unwrap();
    let result = repos
        .teams
        .bootstrap(
            &team,
            &Membership::new(owner, team.id, Role::Administrator, now),
            Uuid::new_v4(),
            now,
        )
        .await;

    assert!(matches!(result, Err(RepositoryError::NotFound)));
    assert!(repos.teams.get_by_id(team.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_token_store_replaces_previous_token() {
    let Some(pool) = pool().await else {
        return;
    };
    let repos = TeamsRepositories::postgres(pool);
    let now = now();

    let first = ManagementToken::issued("first".to_string(), 3600, now);
    repos.tokens.delete_all().await.unwrap();
    repos.tokens.persist(&first).await.unwrap();

    let second = ManagementToken::issued("second".to_string(), 3600, now);
    repos.tokens.delete_all().await.unwrap();
    repos.tokens.persist(&second).await.unwrap();

    let stored = repos.tokens.retrieve().await.unwrap().unwrap();
    assert_eq!(stored, second);
}

#[tokio::test]
async fn test_user_lookups_in_postgres() {
    let Some(pool) = pool().await else {
        return;
    };
    let repos = TeamsRepositories::postgres(pool);
    let address = format!("mixed-{}@example.com", Uuid::new_v4().simple());
    let created = repos
        .users
        .create(&User::from_identity(&account(&address), now()))
        .await
        .unwrap();

    let by_email = repos
        .users
        .find_by_email(&address.to_uppercase())
        .await
        .unwrap();
    assert_eq!(by_email.map(|u| u.id), Some(created.id));

    let by_identity = repos
        .users
        .find_by_identity_id(&created.identity_id)
        .await
        .unwrap();
    assert_eq!(by_identity.map(|u| u.id), Some(created.id));

    let shouting = repos
        .users
        .create(&User::from_identity(&account(&address.to_uppercase()), now()))
        .await;
    assert!(matches!(shouting, Err(RepositoryError::AlreadyExists)));
}

#[tokio::test]
async fn test_unregistered_member_listed_in_postgres() {
    let Some(pool) = pool().await else {
        return;
    };
    let repos = TeamsRepositories::postgres(pool);
    let now = now();
    let owner = Uuid::new_v4();
    let project = repos
        .projects
        .create(&Project::new("Site", owner, now))
        .await
        .unwrap();
    let team = Team::new("Unregistered Owner", owner, now).unwrap();
    repos
        .teams
        .bootstrap(
            &team,
            &Membership::new(owner, team.id, Role::Administrator, now),
            project.id,
            now,
        )
        .await
        .unwrap();

    let members = repos.memberships.list_by_team_with_users(team.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, owner);
    assert_eq!(members[0].email, None);
}
