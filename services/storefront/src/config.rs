//! Service configuration

use anyhow::{Context, Result};
use chrono::Duration;
use std::env;

/// Settings for the HTTP server and the account flows
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the web client, used to build links in emails
    pub frontend_url: String,
    pub app_name: String,
    pub verification_token_ttl: Duration,
    pub reset_token_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            frontend_url: "http://localhost:3000".to_string(),
            app_name: "E-commerce API".to_string(),
            verification_token_ttl: Duration::hours(2),
            reset_token_ttl: Duration::minutes(30),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `HOST`: Bind address (default: 0.0.0.0)
    /// - `PORT`: Listen port (default: 5000)
    /// - `FRONTEND_URL`: Web client base URL (default: http://localhost:3000)
    /// - `APP_NAME`: Name used in emails (default: E-commerce API)
    /// - `VERIFICATION_TOKEN_TTL_MINUTES`: Email verification lifetime (default: 120)
    /// - `RESET_TOKEN_TTL_MINUTES`: Password reset lifetime (default: 30)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(port) => port.parse().context("PORT must be a valid port number")?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            app_name: env::var("APP_NAME").unwrap_or(defaults.app_name),
            verification_token_ttl: minutes_from_env(
                "VERIFICATION_TOKEN_TTL_MINUTES",
                defaults.verification_token_ttl,
            )?,
            reset_token_ttl: minutes_from_env("RESET_TOKEN_TTL_MINUTES", defaults.reset_token_ttl)?,
        })
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn minutes_from_env(key: &str, default: Duration) -> Result<Duration> {
    match env::var(key) {
        Ok(value) => {
            let minutes: i64 = value
                .parse()
                .with_context(|| format!("{} must be a whole number of minutes", key))?;

            if minutes <= 0 {
                anyhow::bail!("{} must be positive", key);
            }

            Ok(Duration::minutes(minutes))
        }
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 6] = [
        "HOST",
        "PORT",
        "FRONTEND_URL",
        "APP_NAME",
        "VERIFICATION_TOKEN_TTL_MINUTES",
        "RESET_TOKEN_TTL_MINUTES",
    ];

    fn clear_env() {
        for key in KEYS {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn defaults_without_env() {
        clear_env();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.verification_token_ttl, Duration::hours(2));
        assert_eq!(config.reset_token_ttl, Duration::minutes(30));
    }

    #[test]
    #[serial]
    fn reads_overrides() {
        clear_env();
        unsafe {
            env::set_var("PORT", "8080");
            env::set_var("RESET_TOKEN_TTL_MINUTES", "15");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.reset_token_ttl, Duration::minutes(15));

        clear_env();
    }

    #[test]
    #[serial]
    fn rejects_zero_ttl() {
        clear_env();
        unsafe {
            env::set_var("VERIFICATION_TOKEN_TTL_MINUTES", "0");
        }

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }
}
