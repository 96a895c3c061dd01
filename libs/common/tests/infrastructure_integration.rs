//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database is reachable and that the
//! embedded migrations produce the expected schema. They need a live server
//! (`DATABASE_URL`), so they only run with `cargo test -- --ignored`.

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    run_migrations(&pool).await?;
    // Applying twice must be a no-op
    run_migrations(&pool).await?;

    let row = sqlx::query(
        "SELECT COUNT(*)::INT AS tables FROM information_schema.tables \
         WHERE table_name IN ('users', 'products')",
    )
    .fetch_one(&pool)
    .await?;

    let tables: i32 = row.get("tables");
    assert_eq!(tables, 2, "storefront tables missing after migration");

    Ok(())
}
