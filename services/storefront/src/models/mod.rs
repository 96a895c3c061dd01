//! Storefront domain models

pub mod product;
pub mod user;

// Re-export for convenience
pub use product::{Product, ProductInput};
pub use user::{NewUser, ProfileChanges, User, UserProfile};
