//! Product model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Catalog product
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Ownership check: only the creating user may mutate a product
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Validated product fields, used for both create and full update
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}
