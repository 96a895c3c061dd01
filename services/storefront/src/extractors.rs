//! Request extractors: bearer authentication and validated JSON bodies

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use serde::de::DeserializeOwned;
use tracing::warn;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState, validation::Validate};

/// The caller, identified by a valid bearer token
///
/// Adding this to a handler's arguments makes the route require
/// authentication.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer =
            Option::<TypedHeader<Authorization<Bearer>>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized("No token provided"))?;

        let Some(TypedHeader(Authorization(bearer))) = bearer else {
            return Err(ApiError::Unauthorized("No token provided"));
        };

        let claims = state.jwt_service.validate_token(bearer.token()).map_err(|e| {
            warn!("Rejected bearer token: {}", e);
            ApiError::Unauthorized("Invalid token")
        })?;

        Ok(Self {
            user_id: claims.sub,
        })
    }
}

/// JSON body that has passed [`Validate`]
///
/// Malformed JSON is a plain 400; field rule violations become
/// [`ApiError::Validation`] listing every message.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        data.validate().map_err(ApiError::Validation)?;

        Ok(Self(data))
    }
}

/// Parse a product id taken from the path
pub fn parse_product_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid product ID".to_string()))
}
