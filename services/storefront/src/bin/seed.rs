//! Load the demo catalog into the configured database

use anyhow::Result;
use tracing::info;

use common::{DatabaseConfig, init_pool, run_migrations};
use storefront::{
    repositories::{PgProductRepository, PgUserRepository},
    seed::seed_catalog,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    storefront::init_tracing();

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool).await?;

    let admin_password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "password123".to_string());

    let users = PgUserRepository::new(pool.clone());
    let products = PgProductRepository::new(pool);

    let admin_id = seed_catalog(&users, &products, &admin_password).await?;
    info!("Seeding complete, sample products owned by {}", admin_id);

    Ok(())
}
