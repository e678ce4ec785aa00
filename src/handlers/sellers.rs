use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::AppState;
use crate::error::AppError;
use crate::services::directory;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct RegisterSellerPayload {
    pub name: String,
    pub business_name: String,
    pub phone: String,
    pub pin: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub phone: String,
    pub pin: String,
}

pub async fn register_seller(
    State(state): State<AppState>,
    Json(payload): Json<RegisterSellerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let name = validation::sanitize_string(&payload.name);
    let business_name = validation::sanitize_string(&payload.business_name);
    let phone = validation::sanitize_string(&payload.phone);
    validation::validate_name(&name)?;
    validation::validate_required("business_name", &business_name)?;
    validation::validate_max_len("business_name", &business_name, validation::NAME_MAX_LEN)?;
    validation::validate_phone(&phone)?;
    validation::validate_pin(&payload.pin)?;

    let created =
        directory::register_seller(&state.db, &name, &business_name, &phone, &payload.pin).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn seller_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    let phone = validation::sanitize_string(&payload.phone);

    // Brute-force hardening, keyed per phone. Not part of the API contract.
    if state.login_limiter.check_key(&phone).is_err() {
        tracing::warn!("login rate limit hit");
        return Err(AppError::RateLimited(
            "too many login attempts, try again later".to_string(),
        ));
    }

    let seller = directory::authenticate_seller(&state.db, &phone, &payload.pin).await?;

    Ok(Json(seller))
}
