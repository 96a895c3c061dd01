//! Repositories for user and product persistence
//!
//! Handlers only see the traits below. PostgreSQL backs them in production;
//! the in-memory versions back the test suites.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::{NewUser, Product, ProductInput, ProfileChanges, User};

pub mod memory;
pub mod product;
pub mod user;

pub use memory::{InMemoryProductRepository, InMemoryUserRepository};
pub use product::PgProductRepository;
pub use user::PgUserRepository;

/// Persistence for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; duplicate username or email is a unique violation
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    /// Find a user by (normalized) email
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    /// Find any user holding either the username or the email
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> DatabaseResult<Option<User>>;

    /// Apply profile changes; a new email drops the verified flag
    async fn update_profile(&self, id: Uuid, changes: ProfileChanges)
    -> DatabaseResult<Option<User>>;

    /// Store a fresh verification token digest
    async fn set_verification_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> DatabaseResult<()>;

    /// Mark the owner of a live verification token as verified and burn the token
    async fn consume_verification_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>>;

    /// Store, or clear with `None`, the password reset token digest
    async fn set_password_reset_token(
        &self,
        id: Uuid,
        token: Option<(&str, DateTime<Utc>)>,
    ) -> DatabaseResult<()>;

    /// Find the owner of a live password reset token
    async fn find_by_password_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>>;

    /// Replace the password of the owner of a live reset token and burn the token
    async fn consume_password_reset_token(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>>;

    /// Check that the backing store answers
    async fn ping(&self) -> DatabaseResult<bool>;
}

/// Persistence for catalog products
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product, newest first
    async fn list(&self) -> DatabaseResult<Vec<Product>>;

    /// Find a product by ID
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Product>>;

    /// Insert a product owned by `owner`
    async fn create(&self, owner: Uuid, input: ProductInput) -> DatabaseResult<Product>;

    /// Replace the editable fields of a product
    async fn update(&self, id: Uuid, input: ProductInput) -> DatabaseResult<Option<Product>>;

    /// Delete a product, reporting whether it existed
    async fn delete(&self, id: Uuid) -> DatabaseResult<bool>;

    /// Products among `ids` that belong to `owner`
    async fn find_owned(&self, owner: Uuid, ids: &[Uuid]) -> DatabaseResult<Vec<Product>>;

    /// Delete the products among `ids` that belong to `owner`
    async fn delete_owned(&self, owner: Uuid, ids: &[Uuid]) -> DatabaseResult<u64>;

    /// Delete every product that belongs to `owner`
    async fn delete_all_owned(&self, owner: Uuid) -> DatabaseResult<u64>;
}
