//! Project copy repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::transactions::set_project_team_tx;
use super::{ProjectStore, StoreResult};
use crate::domain::entities::Project;

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for ProjectRepository {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, team_id, user_id, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn create(&self, project: &Project) -> StoreResult<Project> {
        let created = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (id, name, team_id, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, team_id, user_id, created_at, updated_at
            "#,
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(project.team_id)
        .bind(project.user_id)
        .bind(project.created_at)
        .bind(project.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn set_team(
        &self,
        project_id: Uuid,
        team_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Project> {
        let mut transaction = self.pool.begin().await?;
        let project = set_project_team_tx(&mut transaction, project_id, team_id, now).await?;
        transaction.commit().await?;
        Ok(project)
    }
}
