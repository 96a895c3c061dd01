//! Shared application state

use std::sync::Arc;

use crate::{
    config::AppConfig,
    currency::ExchangeRateProvider,
    email::{Mailer, templates::EmailTemplates},
    jwt::JwtService,
    rate_limiter::RateLimiter,
    repositories::{ProductRepository, UserRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub jwt_service: JwtService,
    pub mailer: Arc<dyn Mailer>,
    pub templates: EmailTemplates,
    pub exchange_rates: Arc<dyn ExchangeRateProvider>,
    pub rate_limiter: RateLimiter,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        jwt_service: JwtService,
        mailer: Arc<dyn Mailer>,
        exchange_rates: Arc<dyn ExchangeRateProvider>,
        rate_limiter: RateLimiter,
        config: AppConfig,
    ) -> Self {
        let templates = EmailTemplates::new(config.app_name.clone(), config.frontend_url.clone());

        Self {
            users,
            products,
            jwt_service,
            mailer,
            templates,
            exchange_rates,
            rate_limiter,
            config: Arc::new(config),
        }
    }
}
