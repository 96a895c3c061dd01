//! PostgreSQL user repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::UserRepository;
use crate::models::{NewUser, ProfileChanges, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, email_verified, \
    verification_token_hash, verification_expires_at, \
    password_reset_token_hash, password_reset_expires_at, created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_optional(&self, sql: &str, value: &str) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.username);

        let sql = format!(
            r#"
            INSERT INTO users (id, username, email, password_hash,
                               verification_token_hash, verification_expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.verification_token_hash)
            .bind(new_user.verification_expires_at)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        self.fetch_optional(&sql, email).await
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> DatabaseResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2 LIMIT 1"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> DatabaseResult<Option<User>> {
        info!("Updating profile for user: {}", id);

        // SET expressions see the old row, so `email` below is the previous value
        let sql = format!(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                email_verified = CASE WHEN $3::TEXT IS NOT NULL AND $3 <> email
                                      THEN FALSE ELSE email_verified END,
                verification_token_hash = CASE WHEN $3::TEXT IS NOT NULL AND $3 <> email
                                               THEN NULL ELSE verification_token_hash END,
                verification_expires_at = CASE WHEN $3::TEXT IS NOT NULL AND $3 <> email
                                               THEN NULL ELSE verification_expires_at END,
                email = COALESCE($3, email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&changes.username)
            .bind(&changes.email)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn set_verification_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET verification_token_hash = $2, verification_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn consume_verification_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET email_verified = TRUE,
                verification_token_hash = NULL,
                verification_expires_at = NULL,
                updated_at = NOW()
            WHERE verification_token_hash = $1 AND verification_expires_at > $2
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(token_hash)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn set_password_reset_token(
        &self,
        id: Uuid,
        token: Option<(&str, DateTime<Utc>)>,
    ) -> DatabaseResult<()> {
        let (token_hash, expires_at) = token.unzip();

        sqlx::query(
            r#"
            UPDATE users
            SET password_reset_token_hash = $2, password_reset_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn find_by_password_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE password_reset_token_hash = $1 AND password_reset_expires_at > $2
            "#
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(token_hash)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn consume_password_reset_token(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET password_hash = $3,
                password_reset_token_hash = NULL,
                password_reset_expires_at = NULL,
                updated_at = NOW()
            WHERE password_reset_token_hash = $1 AND password_reset_expires_at > $2
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(token_hash)
            .bind(now)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn ping(&self) -> DatabaseResult<bool> {
        common::database::health_check(&self.pool).await
    }
}
