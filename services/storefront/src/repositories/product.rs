//! PostgreSQL product repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::ProductRepository;
use crate::models::{Product, ProductInput};

const PRODUCT_COLUMNS: &str = "id, user_id, name, price, quantity, category, description, \
    image_url, created_at, updated_at";

/// Product repository for database operations
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    /// Create a new product repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self) -> DatabaseResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC");

        sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn create(&self, owner: Uuid, input: ProductInput) -> DatabaseResult<Product> {
        info!("Creating product '{}' for user {}", input.name, owner);

        let sql = format!(
            r#"
            INSERT INTO products (id, user_id, name, price, quantity, category, description, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner)
            .bind(&input.name)
            .bind(input.price)
            .bind(input.quantity)
            .bind(&input.category)
            .bind(&input.description)
            .bind(&input.image_url)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn update(&self, id: Uuid, input: ProductInput) -> DatabaseResult<Option<Product>> {
        let sql = format!(
            r#"
            UPDATE products
            SET name = $2, price = $3, quantity = $4, category = $5,
                description = $6, image_url = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(input.price)
            .bind(input.quantity)
            .bind(&input.category)
            .bind(&input.description)
            .bind(&input.image_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_owned(&self, owner: Uuid, ids: &[Uuid]) -> DatabaseResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE user_id = $1 AND id = ANY($2)"
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(owner)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn delete_owned(&self, owner: Uuid, ids: &[Uuid]) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM products WHERE user_id = $1 AND id = ANY($2)")
            .bind(owner)
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected())
    }

    async fn delete_all_owned(&self, owner: Uuid) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM products WHERE user_id = $1")
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        info!("Deleted {} products for user {}", result.rows_affected(), owner);
        Ok(result.rows_affected())
    }
}
