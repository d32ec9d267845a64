//! Membership repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{MembershipStore, StoreResult};
use crate::domain::entities::{Membership, MembershipWithUser, Role};

#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipStore for MembershipRepository {
    async fn create(&self, membership: &Membership) -> StoreResult<Membership> {
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
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_by_team_and_user(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, user_id, team_id, role, created_at, updated_at
            FROM memberships
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    async fn list_by_team_with_users(
        &self,
        team_id: Uuid,
    ) -> StoreResult<Vec<MembershipWithUser>> {
        let members = sqlx::query_as::<_, MembershipWithUser>(
            r#"
            SELECT m.id, m.user_id, m.team_id, u.email, u.first_name, u.last_name,
                   u.picture, m.role, m.created_at, m.updated_at
            FROM memberships m
            LEFT JOIN users u ON u.id = m.user_id
            WHERE m.team_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    async fn update_role(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Membership>> {
        let updated = sqlx::query_as::<_, Membership>(
            r#"
            UPDATE memberships
            SET role = $3, updated_at = $4
            WHERE team_id = $1 AND user_id = $2
            RETURNING id, user_id, team_id, role, created_at, updated_at
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, team_id: Uuid, user_id: Uuid) -> StoreResult<Option<Uuid>> {
        let deleted = sqlx::query_scalar::<_, Uuid>(
            r#"
            DELETE FROM memberships
            WHERE team_id = $1 AND user_id = $2
            RETURNING id
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deleted)
    }
}
