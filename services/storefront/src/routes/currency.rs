//! Product price in another currency

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    currency::{CurrencyCode, CurrencyError, convert},
    error::{ApiError, ApiResult},
    extractors::parse_product_id,
    routes::products::find_product,
    state::AppState,
};

/// Converted price of a product
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInCurrency {
    pub product_id: Uuid,
    pub product_name: String,
    pub original_price: f64,
    pub currency: String,
    pub converted_price: f64,
    pub exchange_rate: f64,
}

impl From<CurrencyError> for ApiError {
    fn from(err: CurrencyError) -> Self {
        match err {
            CurrencyError::InvalidCode(_) => ApiError::BadRequest(
                "Invalid currency code. Must be 3 letters (e.g., EUR, GBP)".to_string(),
            ),
            CurrencyError::Upstream(_) | CurrencyError::Decode(_) => {
                ApiError::ServiceUnavailable("Currency conversion service unavailable".to_string())
            }
            CurrencyError::Unreachable(_) => ApiError::ServiceUnavailable(
                "Unable to reach currency conversion service".to_string(),
            ),
        }
    }
}

/// `GET /api/products/:id/price-in/:currency`
pub async fn price_in_currency(
    State(state): State<AppState>,
    Path((id, currency)): Path<(String, String)>,
) -> ApiResult<Json<PriceInCurrency>> {
    let id = parse_product_id(&id)?;
    let product = find_product(&state, id).await?;
    let code = CurrencyCode::parse(&currency)?;

    let exchange_rate = if code.is_base() {
        1.0
    } else {
        let rates = state.exchange_rates.latest().await?;
        rates
            .rate_for(&code)
            .ok_or_else(|| ApiError::BadRequest(format!("Currency {} not supported", code)))?
    };

    let converted_price = if code.is_base() {
        product.price
    } else {
        convert(product.price, exchange_rate)
    };

    info!("Converted product {} to {}", product.id, code);

    Ok(Json(PriceInCurrency {
        product_id: product.id,
        product_name: product.name,
        original_price: product.price,
        currency: code.to_string(),
        converted_price,
        exchange_rate,
    }))
}
