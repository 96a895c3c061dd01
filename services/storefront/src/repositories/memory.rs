//! In-process repositories
//!
//! They mirror the PostgreSQL behaviour that handlers rely on: unique
//! username/email, newest-first listing, single-use tokens. The test suites
//! run the whole router against them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ProductRepository, UserRepository};
use crate::models::{NewUser, Product, ProductInput, ProfileChanges, User};

/// User repository kept in memory
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a stored user as-is, bypassing every rule
    pub async fn put(&self, user: User) {
        let mut users = self.users.write().await;
        users.retain(|existing| existing.id != user.id);
        users.push(user);
    }
}

/// Name of the unique constraint another user already holds, if any
fn taken(
    users: &[User],
    skip: Option<Uuid>,
    username: Option<&str>,
    email: Option<&str>,
) -> Option<&'static str> {
    let others = || users.iter().filter(move |user| Some(user.id) != skip);

    if let Some(username) = username {
        if others().any(|user| user.username == username) {
            return Some("users_username_key");
        }
    }

    if let Some(email) = email {
        if others().any(|user| user.email == email) {
            return Some("users_email_key");
        }
    }

    None
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User> {
        let mut users = self.users.write().await;

        if let Some(constraint) = taken(
            &users,
            None,
            Some(&new_user.username),
            Some(&new_user.email),
        ) {
            return Err(DatabaseError::UniqueViolation(constraint.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            email_verified: false,
            verification_token_hash: new_user.verification_token_hash,
            verification_expires_at: new_user.verification_expires_at,
            password_reset_token_hash: None,
            password_reset_expires_at: None,
            created_at: now,
            updated_at: now,
        };

        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> DatabaseResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|user| user.username == username || user.email == email)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> DatabaseResult<Option<User>> {
        let mut users = self.users.write().await;

        if let Some(constraint) = taken(
            &users,
            Some(id),
            changes.username.as_deref(),
            changes.email.as_deref(),
        ) {
            return Err(DatabaseError::UniqueViolation(constraint.to_string()));
        }

        let Some(user) = users.iter_mut().find(|user| user.id == id) else {
            return Ok(None);
        };

        if let Some(username) = changes.username {
            user.username = username;
        }

        if let Some(email) = changes.email {
            if email != user.email {
                user.email = email;
                user.email_verified = false;
                user.verification_token_hash = None;
                user.verification_expires_at = None;
            }
        }

        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_verification_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> DatabaseResult<()> {
        let mut users = self.users.write().await;

        if let Some(user) = users.iter_mut().find(|user| user.id == id) {
            user.verification_token_hash = Some(token_hash.to_string());
            user.verification_expires_at = Some(expires_at);
            user.updated_at = Utc::now();
        }

        Ok(())
    }

    async fn consume_verification_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>> {
        let mut users = self.users.write().await;

        let Some(user) = users
            .iter_mut()
            .find(|user| user.has_verification_token(token_hash, now))
        else {
            return Ok(None);
        };

        user.email_verified = true;
        user.verification_token_hash = None;
        user.verification_expires_at = None;
        user.updated_at = now;
        Ok(Some(user.clone()))
    }

    async fn set_password_reset_token(
        &self,
        id: Uuid,
        token: Option<(&str, DateTime<Utc>)>,
    ) -> DatabaseResult<()> {
        let mut users = self.users.write().await;

        if let Some(user) = users.iter_mut().find(|user| user.id == id) {
            let (token_hash, expires_at) = token.unzip();
            user.password_reset_token_hash = token_hash.map(str::to_string);
            user.password_reset_expires_at = expires_at;
            user.updated_at = Utc::now();
        }

        Ok(())
    }

    async fn find_by_password_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|user| user.has_password_reset_token(token_hash, now))
            .cloned())
    }

    async fn consume_password_reset_token(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>> {
        let mut users = self.users.write().await;

        let Some(user) = users
            .iter_mut()
            .find(|user| user.has_password_reset_token(token_hash, now))
        else {
            return Ok(None);
        };

        user.password_hash = password_hash.to_string();
        user.password_reset_token_hash = None;
        user.password_reset_expires_at = None;
        user.updated_at = now;
        Ok(Some(user.clone()))
    }

    async fn ping(&self) -> DatabaseResult<bool> {
        Ok(true)
    }
}

/// Product repository kept in memory, in insertion order
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> DatabaseResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().rev().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|product| product.id == id).cloned())
    }

    async fn create(&self, owner: Uuid, input: ProductInput) -> DatabaseResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            user_id: owner,
            name: input.name,
            price: input.price,
            quantity: input.quantity,
            category: input.category,
            description: input.description,
            image_url: input.image_url,
            created_at: now,
            updated_at: now,
        };

        self.products.write().await.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: Uuid, input: ProductInput) -> DatabaseResult<Option<Product>> {
        let mut products = self.products.write().await;

        let Some(product) = products.iter_mut().find(|product| product.id == id) else {
            return Ok(None);
        };

        product.name = input.name;
        product.price = input.price;
        product.quantity = input.quantity;
        product.category = input.category;
        product.description = input.description;
        product.image_url = input.image_url;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|product| product.id != id);
        Ok(products.len() < before)
    }

    async fn find_owned(&self, owner: Uuid, ids: &[Uuid]) -> DatabaseResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|product| product.user_id == owner && ids.contains(&product.id))
            .cloned()
            .collect())
    }

    async fn delete_owned(&self, owner: Uuid, ids: &[Uuid]) -> DatabaseResult<u64> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|product| !(product.user_id == owner && ids.contains(&product.id)));
        Ok((before - products.len()) as u64)
    }

    async fn delete_all_owned(&self, owner: Uuid) -> DatabaseResult<u64> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|product| product.user_id != owner);
        Ok((before - products.len()) as u64)
    }
}
