//! Shared harness: the full router over in-memory stores

#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt;

use storefront::{
    AppState,
    config::AppConfig,
    create_router,
    currency::{CurrencyError, ExchangeRateProvider, ExchangeRates},
    email::{EmailError, EmailMessage, Mailer},
    jwt::{JwtConfig, JwtService},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{InMemoryProductRepository, InMemoryUserRepository},
};

pub const PASSWORD: &str = "password123";

/// Mailer that keeps every message
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }

    /// Token embedded in the latest link containing `path`
    pub async fn last_token(&self, path: &str) -> Option<String> {
        let marker = format!("{}?token=", path);
        let sent = self.sent.lock().await;

        sent.iter().rev().find_map(|message| {
            let start = message.text.find(&marker)? + marker.len();
            let token: String = message.text[start..]
                .chars()
                .take_while(char::is_ascii_hexdigit)
                .collect();
            Some(token)
        })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

/// Mailer whose relay always refuses
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: &EmailMessage) -> Result<(), EmailError> {
        Err(EmailError::Transport("connection refused".to_string()))
    }
}

/// Exchange rates served from a fixed table, or a fixed upstream failure
pub enum StubRates {
    Table(HashMap<String, f64>),
    Status(StatusCode),
}

impl StubRates {
    pub fn usd_table() -> Self {
        Self::Table(HashMap::from([
            ("USD".to_string(), 1.0),
            ("EUR".to_string(), 0.92),
            ("GBP".to_string(), 0.79),
            ("JPY".to_string(), 151.237),
            ("XXX".to_string(), 0.0),
        ]))
    }
}

#[async_trait]
impl ExchangeRateProvider for StubRates {
    async fn latest(&self) -> Result<ExchangeRates, CurrencyError> {
        match self {
            StubRates::Table(rates) => Ok(ExchangeRates {
                base: "USD".to_string(),
                rates: rates.clone(),
            }),
            StubRates::Status(status) => Err(CurrencyError::Upstream(*status)),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUserRepository>,
    pub products: Arc<InMemoryProductRepository>,
    pub mailer: Arc<RecordingMailer>,
    pub jwt: JwtService,
}

impl TestApp {
    pub fn new() -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        Self::build(mailer.clone(), mailer, Arc::new(StubRates::usd_table()))
    }

    pub fn with_mailer(mailer: Arc<dyn Mailer>) -> Self {
        Self::build(
            mailer,
            Arc::new(RecordingMailer::default()),
            Arc::new(StubRates::usd_table()),
        )
    }

    pub fn with_rates(rates: Arc<dyn ExchangeRateProvider>) -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        Self::build(mailer.clone(), mailer, rates)
    }

    fn build(
        mailer: Arc<dyn Mailer>,
        recorder: Arc<RecordingMailer>,
        rates: Arc<dyn ExchangeRateProvider>,
    ) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let products = Arc::new(InMemoryProductRepository::new());
        let jwt = JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            token_expiry: 3600,
        });

        let state = AppState::new(
            users.clone(),
            products.clone(),
            jwt.clone(),
            mailer,
            rates,
            RateLimiter::new(RateLimiterConfig::default()),
            AppConfig::default(),
        );

        Self {
            router: create_router(state),
            users,
            products,
            mailer: recorder,
            jwt,
        }
    }

    /// Send a request and decode the JSON answer (`Null` for an empty body)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, None, Some(body)).await
    }

    pub async fn register(&self, username: &str, email: &str) -> (StatusCode, Value) {
        self.post(
            "/api/auth/register",
            json!({ "username": username, "email": email, "password": PASSWORD }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/api/auth/login",
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Register an account and return a bearer token for it
    pub async fn signed_in(&self, username: &str, email: &str) -> String {
        let (status, _) = self.register(username, email).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self.login(email, PASSWORD).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    /// Create a product as the holder of `token` and return its id
    pub async fn create_product(&self, token: &str, name: &str, price: f64) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/products",
                Some(token),
                Some(json!({
                    "name": name,
                    "price": price,
                    "quantity": 10,
                    "category": "Electronics",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }
}
