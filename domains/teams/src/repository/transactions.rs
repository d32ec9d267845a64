//! Transactional free functions for the Teams domain
//!
//! Building blocks for store methods that group several writes in one
//! Postgres transaction.

use chrono::{DateTime, Utc};
use crewdesk_common::RepositoryError;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::{Invite, Membership, Project, Team};

/// Create a team within an existing transaction.
pub async fn create_team_tx(
    transaction: &mut Transaction<'_, Postgres>,
    team: &Team,
) -> Result<Team, RepositoryError> {
    let created = sqlx::query_as::<_, Team>(
        r#"
        INSERT INTO teams (id, name, user_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, user_id, created_at, updated_at
        "#,
    )
    .bind(team.id)
    .bind(&team.name)
    .bind(team.user_id)
    .bind(team.created_at)
    .bind(team.updated_at)
    .fetch_one(&mut **transaction)
    .await?;
    Ok(created)
}

/// Create a membership within an existing transaction.
pub async fn create_membership_tx(
    transaction: &mut Transaction<'_, Postgres>,
    membership: &Membership,
) -> Result<Membership, RepositoryError> {
    let created = sqlx::query_as::<_, Membership>(
        r#"
        INSERT INTO memberships (id, user_id, team_id, role, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, team_id, role, created_at, updated_at
        "#,
    )
    .bind(membership.id)
    .bind(membership.user_id)
    .bind(membership.team_id)
    .bind(membership.role)
    .bind(membership.created_at)
    .bind(membership.updated_at)
    .fetch_one(&mut **transaction)
    .await?;
    Ok(created)
}

/// Bind a project to a team within an existing transaction.
///
/// Returns `RepositoryError::NotFound` if the project does not exist.
pub async fn set_project_team_tx(
    transaction: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    team_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Project, RepositoryError> {
    let project = sqlx::query_as::<_, Project>(
        r#"
        UPDATE projects
        SET team_id = $2, updated_at = $3
        WHERE id = $1
        RETURNING id, name, team_id, user_id, created_at, updated_at
        "#,
    )
    .bind(project_id)
    .bind(team_id)
    .bind(now)
    .fetch_optional(&mut **transaction)
    .await?;

    project.ok_or(RepositoryError::NotFound)
}

/// Persist an invite's flags within an existing transaction.
///
/// Returns `RepositoryError::NotFound` if the invite does not exist.
pub async fn update_invite_tx(
    transaction: &mut Transaction<'_, Postgres>,
    invite: &Invite,
) -> Result<Invite, RepositoryError> {
    let updated = sqlx::query_as::<_, Invite>(
        r#"
        UPDATE invites
        SET read = $3, accepted = $4, updated_at = $5
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, team_id, read, accepted, expiration, created_at, updated_at
        "#,
    )
    .bind(invite.id)
    .bind(invite.user_id)
    .bind(invite.read)
    .bind(invite.accepted)
    .bind(invite.updated_at)
    .fetch_optional(&mut **transaction)
    .await?;

    updated.ok_or(RepositoryError::NotFound)
}
