//! JWT service for bearer token generation and validation
//!
//! Tokens are signed with HS256 using a shared secret and carry the user id
//! as `sub`. There are no refresh tokens: clients log in again once the
//! access token expires.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret used to sign and verify tokens
    pub secret: String,
    /// Token lifetime in seconds (default: 1 hour)
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Signing secret (required)
    /// - `JWT_EXPIRY`: Token expiry in seconds (default: 3600)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        if secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let token_expiry: u64 = match std::env::var("JWT_EXPIRY") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("JWT_EXPIRY must be a number of seconds, got {:?}", raw))?,
            Err(_) => 3600, // 1 hour
        };

        if token_expiry == 0 {
            anyhow::bail!("JWT_EXPIRY must be greater than zero");
        }

        Ok(JwtConfig {
            secret,
            token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Generate a bearer token for a user
    pub fn generate_token(&self, user_id: Uuid) -> Result<String> {
        let now = u64::try_from(Utc::now().timestamp())
            .map_err(|e| anyhow::anyhow!("System clock is before the epoch: {}", e))?;

        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now
                .checked_add(self.config.token_expiry)
                .context("Token expiry overflows the expiration timestamp")?,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Get the token expiry time in seconds
    pub fn token_expiry(&self) -> u64 {
        self.config.token_expiry
    }
}
