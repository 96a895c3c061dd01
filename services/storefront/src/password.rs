//! Password hashing with Argon2id

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use tracing::error;

/// Hash a password into a PHC string with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a stored hash
///
/// A mismatch is `Ok(false)`; only an unreadable stored hash is an error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

    let argon2 = Argon2::default();
    let result = argon2.verify_password(password.as_bytes(), &parsed_hash);

    Ok(result.is_ok())
}

/// [`hash_password`] on the blocking thread pool, off the async workers
pub async fn spawn_hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            anyhow::anyhow!("Password hashing task failed: {}", e)
        })?
}

/// [`verify_password`] on the blocking thread pool, off the async workers
pub async fn spawn_verify_password(password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            anyhow::anyhow!("Password verification task failed: {}", e)
        })?
}
