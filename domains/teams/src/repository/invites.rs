//! Invite repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::transactions::{create_membership_tx, update_invite_tx};
use super::{InviteStore, StoreResult};
use crate::domain::entities::{Invite, InviteEnhanced, Membership};

#[derive(Clone)]
pub struct InviteRepository {
    pool: PgPool,
}

impl InviteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteStore for InviteRepository {
    async fn create(&self, invite: &Invite) -> StoreResult<Invite> {
        let created = sqlx::query_as::<_, Invite>(
            r#"
            INSERT INTO invites (id, user_id, team_id, read, accepted, expiration,
                                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, team_id, read, accepted, expiration, created_at, updated_at
            "#,
        )
        .bind(invite.id)
        .bind(invite.user_id)
        .bind(invite.team_id)
        .bind(invite.read)
        .bind(invite.accepted)
        .bind(invite.expiration)
        .bind(invite.created_at)
        .bind(invite.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_for_user(&self, user_id: Uuid, invite_id: Uuid) -> StoreResult<Option<Invite>> {
        let invite = sqlx::query_as::<_, Invite>(
            r#"
            SELECT id, user_id, team_id, read, accepted, expiration, created_at, updated_at
            FROM invites
            WHERE user_id = $1 AND id = $2
            "#,
        )
        .bind(user_id)
        .bind(invite_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invite)
    }

    async fn list_for_user_unexpired(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<InviteEnhanced>> {
        let invites = sqlx::query_as::<_, InviteEnhanced>(
            r#"
            SELECT i.id, i.user_id, i.team_id, t.name AS team_name, i.read, i.accepted,
                   i.expiration, i.created_at, i.updated_at
            FROM invites i
            INNER JOIN teams t ON t.id = i.team_id
            WHERE i.user_id = $1 AND i.expiration > $2
            ORDER BY i.created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(invites)
    }

    async fn update(&self, invite: &Invite) -> StoreResult<Invite> {
        let mut transaction = self.pool.begin().await?;
        let updated = update_invite_tx(&mut transaction, invite).await?;
        transaction.commit().await?;
        Ok(updated)
    }

    async fn accept(
        &self,
        invite: &Invite,
        membership: &Membership,
    ) -> StoreResult<(Invite, Membership)> {
        let mut transaction = self.pool.begin().await?;

        let updated = update_invite_tx(&mut transaction, invite).await?;
        let created = create_membership_tx(&mut transaction, membership).await?;

        transaction.commit().await?;
        Ok((updated, created))
    }
}
