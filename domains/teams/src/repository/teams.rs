//! Team repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::transactions::{create_membership_tx, create_team_tx, set_project_team_tx};
use super::{StoreResult, TeamStore};
use crate::domain::entities::{Membership, Team};

#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamStore for TeamRepository {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Team>> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, user_id, created_at, updated_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(team)
    }

    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT t.id, t.name, t.user_id, t.created_at, t.updated_at
            FROM teams t
            INNER JOIN memberships m ON m.team_id = t.id
            WHERE m.user_id = $1
            ORDER BY t.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(teams)
    }

    async fn bootstrap(
        &self,
        team: &Team,
        owner: &Membership,
        project_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Team> {
        let mut transaction = self.pool.begin().await?;

        let created = create_team_tx(&mut transaction, team).await?;
        create_membership_tx(&mut transaction, owner).await?;
        set_project_team_tx(&mut transaction, project_id, created.id, now).await?;

        transaction.commit().await?;
        Ok(created)
    }
}
