use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::db::models::Direction;
use crate::error::AppError;
use crate::services::payment::PaymentRequest;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct PaymentPayload {
    #[serde(rename = "bandId")]
    pub band_id: String,
    pub amount: i64,
    pub description: Option<String>,
    pub pin: Option<String>,
    #[serde(rename = "sellerId")]
    pub seller_id: Option<Uuid>,
}

/// Seller-initiated debit. The PIN authorizes the payer; the seller's own
/// session is established separately and only attributes the transaction.
pub async fn process_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_amount(payload.amount)?;

    if let Some(seller_id) = payload.seller_id {
        crate::db::queries::get_seller(&state.db, seller_id)
            .await?
            .ok_or_else(|| AppError::InvalidInput("unknown seller".to_string()))?;
    }

    let description = payload
        .description
        .map(|d| validation::sanitize_string(&d))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "Payment".to_string());
    validation::validate_max_len("description", &description, validation::DESCRIPTION_MAX_LEN)?;

    let receipt = state
        .payments
        .process(PaymentRequest {
            band_code: validation::normalize_band_code(&payload.band_id),
            amount_minor: payload.amount,
            direction: Direction::Debit,
            description,
            pin: payload.pin,
            seller_id: payload.seller_id,
            idempotency_key: super::idempotency_key(&headers),
        })
        .await?;

    Ok(Json(json!({
        "message": "Payment processed",
        "current_balance": receipt.balance_minor,
        "transaction_id": receipt.transaction_id,
    })))
}
