//! User repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreResult, UserStore};
use crate::domain::entities::User;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, identity_id, email, email_verified, first_name, last_name,
                   picture, locale, created_at, updated_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_identity_id(&self, identity_id: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, identity_id, email, email_verified, first_name, last_name,
                   picture, locale, created_at, updated_at
            FROM users
            WHERE identity_id = $1
            "#,
        )
        .bind(identity_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, identity_id, email, email_verified, first_name, last_name,
                   picture, locale, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, user: &User) -> StoreResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, identity_id, email, email_verified, first_name, last_name,
                               picture, locale, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, identity_id, email, email_verified, first_name, last_name,
                      picture, locale, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.identity_id)
        .bind(&user.email)
        .bind(user.email_verified)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.picture)
        .bind(&user.locale)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}
