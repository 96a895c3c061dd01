//! Password reset: request a link, check it, use it

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::{
    email::templates::describe_minutes,
    error::{ApiError, ApiResult},
    extractors::ValidatedJson,
    password::spawn_hash_password,
    routes::auth::{EmailRequest, TokenQuery},
    state::AppState,
    tokens::{generate_token, hash_token},
    validation::{Validate, collect, normalize_email, validate_password, validate_required},
};

const REQUESTED_MESSAGE: &str =
    "If a user with that email exists, a password reset link has been sent.";

/// Routes mounted under `/api/auth` alongside the account routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forgot-password", post(request_password_reset))
        .route("/reset-password", post(reset_password))
        .route("/verify-reset-token", get(verify_reset_token))
}

/// Request to set a new password with a reset token
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

impl Validate for ResetPasswordRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        collect([
            validate_required(&self.token, "Reset token is required"),
            validate_password(&self.new_password, "New password"),
        ])
    }
}

/// Mail a reset link; the answer is the same whether or not the account exists
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EmailRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let email = normalize_email(&payload.email);

    let Some(user) = state.users.find_by_email(&email).await? else {
        info!("Password reset requested for unknown email");
        return Ok((StatusCode::OK, Json(json!({ "message": REQUESTED_MESSAGE }))));
    };

    let token = generate_token();
    let token_hash = hash_token(&token);
    let expires_at = Utc::now() + state.config.reset_token_ttl;
    state
        .users
        .set_password_reset_token(user.id, Some((token_hash.as_str(), expires_at)))
        .await?;

    let valid_for = describe_minutes(state.config.reset_token_ttl.num_minutes());
    let message = state
        .templates
        .password_reset_email(&user.email, &user.username, &token, &valid_for);

    if let Err(e) = state.mailer.send(&message).await {
        error!("Failed to send password reset email to user {}: {}", user.id, e);

        state.users.set_password_reset_token(user.id, None).await?;

        return Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Failed to send password reset email. Please try again later.",
                "emailSent": false,
            })),
        ));
    }

    info!("Password reset link sent to user: {}", user.id);

    Ok((
        StatusCode::OK,
        Json(json!({ "message": REQUESTED_MESSAGE, "emailSent": true })),
    ))
}

/// Replace the password of the account owning a live reset token
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<Value>> {
    let token_hash = hash_token(payload.token.trim());
    let password_hash = spawn_hash_password(payload.new_password)
        .await
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            ApiError::InternalServerError
        })?;

    let user = state
        .users
        .consume_password_reset_token(&token_hash, &password_hash, Utc::now())
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("Invalid or expired password reset token".to_string())
        })?;

    info!("Password reset for user: {}", user.id);

    Ok(Json(json!({
        "message": "Password has been reset successfully. You can now log in with your new password.",
    })))
}

/// Tell the client whether a reset link can still be used
pub async fn verify_reset_token(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let token = query
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Invalid reset token".to_string()))?;

    let user = state
        .users
        .find_by_password_reset_token(&hash_token(token), Utc::now())
        .await?;

    if user.is_none() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Invalid or expired password reset token",
                "valid": false,
            })),
        ));
    }

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Reset token is valid", "valid": true })),
    ))
}
