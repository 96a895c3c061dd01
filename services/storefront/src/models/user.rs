//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// User entity as stored
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub email_verified: bool,
    pub verification_token_hash: Option<String>,
    pub verification_expires_at: Option<DateTime<Utc>>,
    pub password_reset_token_hash: Option<String>,
    pub password_reset_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the stored verification token matches `token_hash` and is still live
    pub fn has_verification_token(&self, token_hash: &str, now: DateTime<Utc>) -> bool {
        token_matches(
            self.verification_token_hash.as_deref(),
            self.verification_expires_at,
            token_hash,
            now,
        )
    }

    /// Whether the stored reset token matches `token_hash` and is still live
    pub fn has_password_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> bool {
        token_matches(
            self.password_reset_token_hash.as_deref(),
            self.password_reset_expires_at,
            token_hash,
            now,
        )
    }
}

fn token_matches(
    stored: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
    token_hash: &str,
    now: DateTime<Utc>,
) -> bool {
    match (stored, expires_at) {
        (Some(stored), Some(expires_at)) => stored == token_hash && expires_at > now,
        _ => false,
    }
}

/// New user creation payload
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub verification_token_hash: Option<String>,
    pub verification_expires_at: Option<DateTime<Utc>>,
}

/// Profile fields a user may change about themselves
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Public view of a user, safe to return from the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            email_verified: user.email_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
