//! Currency conversion against a USD exchange-rate table
//!
//! Product prices are stored in USD. A conversion fetches the latest
//! USD-based table from the configured provider, picks the target rate and
//! rounds the result to cents.

use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use std::{collections::HashMap, fmt, sync::OnceLock, time::Duration};
use thiserror::Error;
use tracing::{error, info};

/// Default rate table endpoint
pub const DEFAULT_EXCHANGE_API_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Currency conversion errors
#[derive(Error, Debug)]
pub enum CurrencyError {
    #[error("Invalid currency code '{0}'")]
    InvalidCode(String),

    #[error("Exchange rate service returned {0}")]
    Upstream(StatusCode),

    #[error("Exchange rate service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("Malformed exchange rate response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Three-letter upper-case ISO 4217 style code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Upper-case `raw` and check it is exactly three ASCII letters
    pub fn parse(raw: &str) -> Result<Self, CurrencyError> {
        static CODE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex =
            CODE_REGEX.get_or_init(|| Regex::new(r"^[A-Z]{3}$").expect("Failed to compile currency regex"));

        let code = raw.to_uppercase();

        if regex.is_match(&code) {
            Ok(Self(code))
        } else {
            Err(CurrencyError::InvalidCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prices are stored in USD
    pub fn is_base(&self) -> bool {
        self.0 == "USD"
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rate table as published by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRates {
    #[serde(default)]
    pub base: String,
    pub rates: HashMap<String, f64>,
}

impl ExchangeRates {
    /// Rate for `code`; missing or zero rates count as unsupported
    pub fn rate_for(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates
            .get(code.as_str())
            .copied()
            .filter(|rate| rate.is_finite() && *rate != 0.0)
    }
}

/// Source of USD exchange rates
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    async fn latest(&self) -> Result<ExchangeRates, CurrencyError>;
}

/// Exchange rates fetched over HTTP
#[derive(Clone)]
pub struct HttpExchangeRates {
    client: reqwest::Client,
    url: String,
}

impl HttpExchangeRates {
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Build the provider from `EXCHANGE_API_URL`
    pub fn from_env() -> anyhow::Result<Self> {
        let url = std::env::var("EXCHANGE_API_URL")
            .unwrap_or_else(|_| DEFAULT_EXCHANGE_API_URL.to_string());

        info!("Using exchange rates from {}", url);
        Self::new(url)
    }
}

#[async_trait]
impl ExchangeRateProvider for HttpExchangeRates {
    async fn latest(&self) -> Result<ExchangeRates, CurrencyError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            error!("Failed to reach exchange rate service: {}", e);
            CurrencyError::Unreachable(e)
        })?;

        if !response.status().is_success() {
            error!("Exchange rate service returned {}", response.status());
            return Err(CurrencyError::Upstream(response.status()));
        }

        response.json::<ExchangeRates>().await.map_err(|e| {
            error!("Failed to decode exchange rates: {}", e);
            CurrencyError::Decode(e)
        })
    }
}

/// Convert a USD amount and round to two decimals
pub fn convert(price: f64, rate: f64) -> f64 {
    (price * rate * 100.0).round() / 100.0
}
