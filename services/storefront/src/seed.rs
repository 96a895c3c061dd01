//! Demo catalog for local development

use anyhow::Result;
use tracing::info;
use uuid::Uuid;

use crate::{
    models::{NewUser, ProductInput},
    password::spawn_hash_password,
    repositories::{ProductRepository, UserRepository},
};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// (name, price, quantity, description, category)
const SAMPLE_PRODUCTS: [(&str, f64, i32, &str, &str); 8] = [
    ("iPhone 14 Pro", 999.0, 50, "Latest iPhone with advanced camera system", "Electronics"),
    ("Nike Air Max 270", 150.0, 100, "Comfortable running shoes with air cushioning", "Footwear"),
    ("Samsung 4K TV", 800.0, 25, "55-inch 4K Ultra HD Smart TV", "Electronics"),
    ("Levi's 501 Jeans", 80.0, 200, "Classic straight-fit jeans", "Clothing"),
    ("MacBook Pro 16", 2499.0, 30, "Professional laptop with M2 chip", "Electronics"),
    ("Coffee Maker", 120.0, 75, "Programmable drip coffee maker", "Home & Kitchen"),
    ("Gaming Chair", 250.0, 40, "Ergonomic gaming chair with lumbar support", "Furniture"),
    ("Wireless Headphones", 200.0, 60, "Noise-cancelling Bluetooth headphones", "Electronics"),
];

/// The sample products as create inputs
pub fn sample_products() -> Vec<ProductInput> {
    SAMPLE_PRODUCTS
        .iter()
        .map(|(name, price, quantity, description, category)| ProductInput {
            name: name.to_string(),
            price: *price,
            quantity: *quantity,
            category: category.to_string(),
            description: Some(description.to_string()),
            image_url: None,
        })
        .collect()
}

/// Ensure the admin account exists and give it a fresh copy of the catalog
///
/// Only products owned by the admin are replaced. Returns the admin id.
pub async fn seed_catalog(
    users: &dyn UserRepository,
    products: &dyn ProductRepository,
    admin_password: &str,
) -> Result<Uuid> {
    let admin = match users.find_by_email(ADMIN_EMAIL).await? {
        Some(existing) => {
            info!("Using existing sample user");
            existing
        }
        None => {
            let created = users
                .create(NewUser {
                    username: ADMIN_USERNAME.to_string(),
                    email: ADMIN_EMAIL.to_string(),
                    password_hash: spawn_hash_password(admin_password.to_string()).await?,
                    verification_token_hash: None,
                    verification_expires_at: None,
                })
                .await?;
            info!("Sample user created");
            created
        }
    };

    let cleared = products.delete_all_owned(admin.id).await?;
    info!("Cleared {} existing sample products", cleared);

    let samples = sample_products();
    let count = samples.len();
    for input in samples {
        products.create(admin.id, input).await?;
    }

    info!("{} sample products added to database", count);
    Ok(admin.id)
}
