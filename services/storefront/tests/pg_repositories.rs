//! Repository behaviour against a live PostgreSQL
//!
//! These need `DATABASE_URL` pointing at a disposable database, so they only
//! run with `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use common::database::{DatabaseConfig, init_pool, run_migrations};
use sqlx::PgPool;
use storefront::{
    models::{NewUser, ProductInput, ProfileChanges, User},
    repositories::{PgProductRepository, PgUserRepository, ProductRepository, UserRepository},
    tokens::hash_token,
};
use uuid::Uuid;

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn pool() -> Result<PgPool, Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// A unique user, so repeated runs against one database do not collide
async fn create_user(users: &PgUserRepository) -> Result<User, Box<dyn std::error::Error>> {
    let tag = Uuid::new_v4().simple().to_string();
    let user = users
        .create(NewUser {
            username: format!("pg{}", &tag[..10]),
            email: format!("{}@example.com", tag),
            password_hash: "hash".to_string(),
            verification_token_hash: None,
            verification_expires_at: None,
        })
        .await?;
    Ok(user)
}

fn input(name: &str) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        price: 10.0,
        quantity: 1,
        category: "Test".to_string(),
        description: None,
        image_url: None,
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn email_change_drops_verification() -> TestResult {
    let users = PgUserRepository::new(pool().await?);
    let user = create_user(&users).await?;

    let token = hash_token(&Uuid::new_v4().to_string());
    users
        .set_verification_token(user.id, &token, Utc::now() + Duration::hours(1))
        .await?;
    let verified = users
        .consume_verification_token(&token, Utc::now())
        .await?
        .ok_or("verification token not accepted")?;
    assert!(verified.email_verified);

    // Same username, unchanged email: verification stays
    let unchanged = users
        .update_profile(
            user.id,
            ProfileChanges {
                username: Some(user.username.clone()),
                email: Some(user.email.clone()),
            },
        )
        .await?
        .ok_or("user vanished")?;
    assert!(unchanged.email_verified);

    let new_email = format!("{}@example.org", Uuid::new_v4().simple());
    let changed = users
        .update_profile(
            user.id,
            ProfileChanges {
                username: None,
                email: Some(new_email.clone()),
            },
        )
        .await?
        .ok_or("user vanished")?;
    assert_eq!(changed.email, new_email);
    assert_eq!(changed.username, user.username);
    assert!(!changed.email_verified);
    assert!(changed.verification_token_hash.is_none());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn duplicate_email_is_a_unique_violation() -> TestResult {
    let users = PgUserRepository::new(pool().await?);
    let user = create_user(&users).await?;

    let err = users
        .create(NewUser {
            username: format!("pg{}", &Uuid::new_v4().simple().to_string()[..10]),
            email: user.email.clone(),
            password_hash: "hash".to_string(),
            verification_token_hash: None,
            verification_expires_at: None,
        })
        .await
        .err()
        .ok_or("duplicate email accepted")?;
    assert!(err.is_unique_violation());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn tokens_are_single_use() -> TestResult {
    let users = PgUserRepository::new(pool().await?);
    let user = create_user(&users).await?;
    let now = Utc::now();

    let verification = hash_token(&Uuid::new_v4().to_string());
    users
        .set_verification_token(user.id, &verification, now + Duration::hours(1))
        .await?;
    assert!(users.consume_verification_token(&verification, now).await?.is_some());
    assert!(users.consume_verification_token(&verification, now).await?.is_none());

    let reset = hash_token(&Uuid::new_v4().to_string());
    users
        .set_password_reset_token(user.id, Some((reset.as_str(), now + Duration::hours(1))))
        .await?;
    assert!(users.find_by_password_reset_token(&reset, now).await?.is_some());

    let updated = users
        .consume_password_reset_token(&reset, "new-hash", now)
        .await?
        .ok_or("reset token not accepted")?;
    assert_eq!(updated.password_hash, "new-hash");
    assert!(updated.password_reset_token_hash.is_none());

    assert!(users.find_by_password_reset_token(&reset, now).await?.is_none());
    assert!(
        users
            .consume_password_reset_token(&reset, "other-hash", now)
            .await?
            .is_none()
    );

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn expired_tokens_are_rejected() -> TestResult {
    let users = PgUserRepository::new(pool().await?);
    let user = create_user(&users).await?;
    let now = Utc::now();

    let verification = hash_token(&Uuid::new_v4().to_string());
    users
        .set_verification_token(user.id, &verification, now - Duration::minutes(1))
        .await?;
    assert!(users.consume_verification_token(&verification, now).await?.is_none());

    let reset = hash_token(&Uuid::new_v4().to_string());
    users
        .set_password_reset_token(user.id, Some((reset.as_str(), now - Duration::minutes(1))))
        .await?;
    assert!(users.find_by_password_reset_token(&reset, now).await?.is_none());
    assert!(
        users
            .consume_password_reset_token(&reset, "new-hash", now)
            .await?
            .is_none()
    );

    let unchanged = users.find_by_id(user.id).await?.ok_or("user vanished")?;
    assert_eq!(unchanged.password_hash, "hash");
    assert!(!unchanged.email_verified);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn owned_queries_respect_ownership() -> TestResult {
    let pool = pool().await?;
    let users = PgUserRepository::new(pool.clone());
    let products = PgProductRepository::new(pool);

    let owner = create_user(&users).await?;
    let other = create_user(&users).await?;

    let first = products.create(owner.id, input("First")).await?;
    let second = products.create(owner.id, input("Second")).await?;
    let theirs = products.create(other.id, input("Theirs")).await?;
    let ids = [first.id, second.id, theirs.id, Uuid::new_v4()];

    let owned = products.find_owned(owner.id, &ids).await?;
    let mut owned_ids: Vec<Uuid> = owned.iter().map(|product| product.id).collect();
    owned_ids.sort();
    let mut expected = vec![first.id, second.id];
    expected.sort();
    assert_eq!(owned_ids, expected);

    assert_eq!(products.delete_owned(owner.id, &ids).await?, 2);
    assert!(products.find_by_id(first.id).await?.is_none());
    assert!(products.find_by_id(theirs.id).await?.is_some());

    assert_eq!(products.delete_all_owned(owner.id).await?, 0);
    assert_eq!(products.delete_all_owned(other.id).await?, 1);
    assert!(products.find_by_id(theirs.id).await?.is_none());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn update_replaces_fields() -> TestResult {
    let pool = pool().await?;
    let users = PgUserRepository::new(pool.clone());
    let products = PgProductRepository::new(pool);

    let owner = create_user(&users).await?;
    let product = products.create(owner.id, input("Lamp")).await?;

    let updated = products
        .update(
            product.id,
            ProductInput {
                price: 0.0,
                description: Some("Brass".to_string()),
                ..input("Desk Lamp")
            },
        )
        .await?
        .ok_or("product vanished")?;
    assert_eq!(updated.name, "Desk Lamp");
    assert_eq!(updated.price, 0.0);
    assert_eq!(updated.description.as_deref(), Some("Brass"));
    assert_eq!(updated.user_id, owner.id);

    assert!(products.update(Uuid::new_v4(), input("Ghost")).await?.is_none());
    assert!(products.delete(product.id).await?);
    assert!(!products.delete(product.id).await?);

    Ok(())
}
