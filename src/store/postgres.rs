//! Postgres-backed implementations of the persistence collaborators.

use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::models::{RefreshToken, User};
use crate::store::{TokenStore, UserDirectory};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, avatar_url, role, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, avatar_url, role, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(
        &self,
        name: &str,
        email: &str,
        raw_password: &str,
    ) -> Result<User, AppError> {
        let password_hash = hash_password(raw_password)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password)
             VALUES ($1, $2, $3)
             RETURNING id, name, email, password, avatar_url, role, created_at, updated_at",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}

#[derive(Clone)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn insert(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_active(
        &self,
        token_hash: &str,
        user_id: i32,
    ) -> Result<Option<RefreshToken>, AppError> {
        let record = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token_hash, expires_at, created_at, is_revoked
             FROM refresh_tokens
             WHERE token_hash = $1
               AND user_id = $2
               AND is_revoked = FALSE
               AND expires_at > NOW()",
        )
        .bind(token_hash)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn find_owned(
        &self,
        token_hash: &str,
        user_id: i32,
    ) -> Result<Option<RefreshToken>, AppError> {
        let record = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token_hash, expires_at, created_at, is_revoked
             FROM refresh_tokens
             WHERE token_hash = $1 AND user_id = $2",
        )
        .bind(token_hash)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn mark_revoked(&self, token_hash: &str) -> Result<u64, AppError> {
        // Conditional: only rows still unrevoked count, so of two racing
        // rotations exactly one sees an affected row.
        let result = sqlx::query(
            "UPDATE refresh_tokens
             SET is_revoked = TRUE
             WHERE token_hash = $1 AND is_revoked = FALSE",
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
