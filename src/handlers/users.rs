use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::AppState;
use crate::db::models::{BandAccount, Direction, LedgerEntry};
use crate::db::queries;
use crate::error::AppError;
use crate::services::payment::PaymentRequest;
use crate::services::registry;
use crate::validation;

/// The UI shows the last few movements on the balance-check screen.
const RECENT_TRANSACTIONS_LIMIT: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct CreateUserPayload {
    pub name: String,
    pub phone: String,
    pub pin: String,
    /// Clients may echo a band id; the registry always issues its own.
    #[serde(rename = "bandId")]
    pub band_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BandPayload {
    #[serde(rename = "bandId")]
    pub band_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FundPayload {
    #[serde(rename = "bandId")]
    pub band_id: String,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: BandAccount,
    pub transactions: Vec<LedgerEntry>,
}

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = queries::list_band_accounts(&state.db).await?;

    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(band_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = queries::find_band_account(&state.db, &band_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let transactions =
        queries::recent_ledger_entries(&state.db, user.id, RECENT_TRANSACTIONS_LIMIT).await?;

    Ok(Json(UserDetail { user, transactions }))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let name = validation::sanitize_string(&payload.name);
    let phone = validation::sanitize_string(&payload.phone);
    validation::validate_name(&name)?;
    validation::validate_phone(&phone)?;
    validation::validate_pin(&payload.pin)?;

    if payload.band_id.is_some() {
        tracing::debug!("ignoring client-supplied band id on registration");
    }

    let created = registry::register_user(
        &state.db,
        &state.config.band_code_prefix,
        &name,
        &phone,
        &payload.pin,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn fund_band(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<FundPayload>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_amount(payload.amount)?;

    let receipt = state
        .payments
        .process(PaymentRequest {
            band_code: validation::normalize_band_code(&payload.band_id),
            amount_minor: payload.amount,
            direction: Direction::Credit,
            description: "Top-up".to_string(),
            pin: None,
            seller_id: None,
            idempotency_key: super::idempotency_key(&headers),
        })
        .await?;

    Ok(Json(json!({
        "message": "Fund added successfully",
        "current_balance": receipt.balance_minor,
        "transaction_id": receipt.transaction_id,
    })))
}

/// Wire-level toggle over the idempotent `set_blocked` registry operation.
pub async fn toggle_block(
    State(state): State<AppState>,
    Json(payload): Json<BandPayload>,
) -> Result<impl IntoResponse, AppError> {
    let current = queries::find_band_account(&state.db, &payload.band_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let user = queries::set_blocked(&state.db, &payload.band_id, !current.is_blocked)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let status_msg = if user.is_blocked { "blocked" } else { "unblocked" };

    Ok(Json(json!({
        "message": format!("Band {} successfully", status_msg),
        "is_blocked": user.is_blocked,
    })))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Json(payload): Json<BandPayload>,
) -> Result<impl IntoResponse, AppError> {
    queries::soft_delete_band_account(&state.db, &payload.band_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "message": "User deleted successfully",
    })))
}
