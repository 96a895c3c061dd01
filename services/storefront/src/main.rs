use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use common::{DatabaseConfig, health_check, init_pool, run_migrations};
use storefront::{
    AppState,
    config::AppConfig,
    create_router,
    currency::HttpExchangeRates,
    email::{LogMailer, Mailer, SmtpConfig, SmtpMailer},
    jwt::{JwtConfig, JwtService},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{PgProductRepository, PgUserRepository},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    storefront::init_tracing();

    info!("Starting storefront service");

    let config = AppConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let jwt_service = JwtService::new(JwtConfig::from_env()?);

    let mailer: Arc<dyn Mailer> = match SmtpConfig::from_env()? {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
        None => {
            info!("SMTP_HOST not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let exchange_rates = Arc::new(HttpExchangeRates::from_env()?);
    let rate_limiter = RateLimiter::new(RateLimiterConfig::from_env());
    let address = config.bind_address();

    let app_state = AppState::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgProductRepository::new(pool)),
        jwt_service,
        mailer,
        exchange_rates,
        rate_limiter,
        config,
    );

    info!("Storefront service initialized successfully");

    // Start the web server
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Storefront service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
