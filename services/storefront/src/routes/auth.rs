//! Account routes: registration, login, profile and email verification

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{AuthUser, ValidatedJson},
    models::{NewUser, ProfileChanges, User, UserProfile},
    password::{spawn_hash_password, spawn_verify_password},
    state::AppState,
    tokens::{generate_token, hash_token},
    validation::{
        Validate, collect, normalize_email, validate_email, validate_password, validate_required,
        validate_username,
    },
};

const RESEND_MESSAGE: &str =
    "If an account with that email exists and is not verified, a verification email has been sent.";

/// Routes mounted under `/api/auth`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/verify-email", get(verify_email))
        .route("/resend-verification", post(resend_verification))
}

/// Request for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        collect([
            validate_username(&self.username),
            validate_email(&self.email),
            validate_password(&self.password, "Password"),
        ])
    }
}

/// Request for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        collect([
            validate_email(&self.email),
            validate_required(&self.password, "Password is required"),
        ])
    }
}

/// Response for a successful login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request carrying only an email address
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: String,
}

impl Validate for EmailRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        collect([validate_email(&self.email)])
    }
}

/// Profile update; fields left out stay unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        collect([
            self.username.as_deref().map_or(Ok(()), validate_username),
            self.email.as_deref().map_or(Ok(()), validate_email),
        ])
    }
}

/// Query string carrying a single-use token
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Register a new, unverified account and mail the verification link
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let username = payload.username.trim().to_string();
    let email = normalize_email(&payload.email);

    info!("Registration attempt for user: {}", username);

    if state
        .users
        .find_by_username_or_email(&username, &email)
        .await?
        .is_some()
    {
        warn!("Registration rejected, username or email taken: {}", username);
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let password_hash = spawn_hash_password(payload.password)
        .await
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            ApiError::InternalServerError
        })?;

    let token = generate_token();
    let expires_at = Utc::now() + state.config.verification_token_ttl;

    let user = state
        .users
        .create(NewUser {
            username,
            email,
            password_hash,
            verification_token_hash: Some(hash_token(&token)),
            verification_expires_at: Some(expires_at),
        })
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::BadRequest("User already exists".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

    info!("User registered: {}", user.id);

    let email_sent = send_verification(&state, &user, &token).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully. Please check your email to verify your account.",
            "emailSent": email_sent,
        })),
    ))
}

/// Exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = normalize_email(&payload.email);

    if !state.rate_limiter.is_allowed(&email).await {
        warn!("Login throttled for {}", email);
        return Err(ApiError::TooManyRequests);
    }

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!("Login failed, unknown email: {}", email);
        return Err(ApiError::BadRequest("Invalid credentials".to_string()));
    };

    let matches = spawn_verify_password(payload.password, user.password_hash.clone())
        .await
        .map_err(|e| {
            error!("Failed to verify password for user {}: {}", user.id, e);
            ApiError::InternalServerError
        })?;

    if !matches {
        warn!("Login failed, wrong password for user: {}", user.id);
        return Err(ApiError::BadRequest("Invalid credentials".to_string()));
    }

    state.rate_limiter.reset(&email).await;

    let token = state.jwt_service.generate_token(user.id).map_err(|e| {
        error!("Failed to generate token: {}", e);
        ApiError::InternalServerError
    })?;

    info!("User logged in: {}", user.id);

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.token_expiry(),
    }))
}

/// Profile of the caller
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let user = state
        .users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Change the caller's username or email
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    let changes = ProfileChanges {
        username: payload.username.map(|username| username.trim().to_string()),
        email: payload.email.as_deref().map(normalize_email),
    };

    let user = state
        .users
        .update_profile(auth.user_id, changes)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::BadRequest("Username or email already in use".to_string())
            } else {
                ApiError::Database(e)
            }
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!("Profile updated for user: {}", user.id);
    Ok(Json(user.into()))
}

/// Confirm an email address from the link sent at registration
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<Value>> {
    let token = query
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Invalid verification token".to_string()))?;

    let user = state
        .users
        .consume_verification_token(&hash_token(token), Utc::now())
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("Invalid or expired verification token".to_string())
        })?;

    info!("Email verified for user: {}", user.id);

    Ok(Json(json!({
        "message": "Email verified successfully. You can now log in.",
    })))
}

/// Issue a fresh verification link
pub async fn resend_verification(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EmailRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let email = normalize_email(&payload.email);

    let user = match state.users.find_by_email(&email).await? {
        Some(user) if !user.email_verified => user,
        _ => return Ok((StatusCode::OK, Json(json!({ "message": RESEND_MESSAGE })))),
    };

    let token = generate_token();
    let expires_at = Utc::now() + state.config.verification_token_ttl;
    state
        .users
        .set_verification_token(user.id, &hash_token(&token), expires_at)
        .await?;

    if send_verification(&state, &user, &token).await {
        Ok((
            StatusCode::OK,
            Json(json!({ "message": RESEND_MESSAGE, "emailSent": true })),
        ))
    } else {
        Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Failed to send verification email. Please try again later.",
                "emailSent": false,
            })),
        ))
    }
}

/// Mail the verification link, reporting whether delivery succeeded
async fn send_verification(state: &AppState, user: &User, token: &str) -> bool {
    let valid_for = crate::email::templates::describe_minutes(
        state.config.verification_token_ttl.num_minutes(),
    );
    let message = state
        .templates
        .verification_email(&user.email, &user.username, token, &valid_for);

    match state.mailer.send(&message).await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to send verification email to user {}: {}", user.id, e);
            false
        }
    }
}
