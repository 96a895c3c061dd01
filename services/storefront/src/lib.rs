//! Storefront catalog service
//!
//! REST backend for a small e-commerce catalog: account registration with
//! email verification, bearer-token login, password reset, product CRUD with
//! ownership checks and price conversion into other currencies.
//!
//! The binary in `main.rs` wires PostgreSQL repositories, an SMTP (or
//! logging) mailer and the HTTP rate table into [`AppState`] and serves
//! [`routes::create_router`].

pub mod config;
pub mod currency;
pub mod email;
pub mod error;
pub mod extractors;
pub mod jwt;
pub mod models;
pub mod password;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod seed;
pub mod state;
pub mod tokens;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;

/// Initialize the global tracing subscriber
///
/// Honors `RUST_LOG`; defaults to info for this crate and request traces.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storefront=info,tower_http=info".into());

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
