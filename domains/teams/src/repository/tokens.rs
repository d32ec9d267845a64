//! Management token repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crewdesk_identity::ManagementToken;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreResult, TokenStore};

#[derive(sqlx::FromRow)]
struct TokenRow {
    id: Uuid,
    access_token: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<TokenRow> for ManagementToken {
    fn from(row: TokenRow) -> Self {
        Self {
            id: row.id,
            access_token: row.access_token,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for TokenRepository {
    async fn retrieve(&self) -> StoreResult<Option<ManagementToken>> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT id, access_token, expires_at, created_at
            FROM management_tokens
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ManagementToken::from))
    }

    async fn delete_all(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM management_tokens")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn persist(&self, token: &ManagementToken) -> StoreResult<ManagementToken> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            INSERT INTO management_tokens (id, access_token, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, access_token, expires_at, created_at
            "#,
        )
        .bind(token.id)
        .bind(&token.access_token)
        .bind(token.expires_at)
        .bind(token.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
