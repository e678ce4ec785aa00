//! Seller directory: self-registration and phone+PIN authentication.

use sqlx::PgPool;

use crate::db::{models::Seller, queries};
use crate::error::AppError;
use crate::services::pin;

pub async fn register_seller(
    pool: &PgPool,
    name: &str,
    business_name: &str,
    phone: &str,
    pin: &str,
) -> Result<Seller, AppError> {
    let (pin_salt, pin_hash) = pin::hash_pin(pin);
    let seller = Seller::new(
        name.to_string(),
        business_name.to_string(),
        phone.to_string(),
        pin_salt,
        pin_hash,
    );

    match queries::insert_seller(pool, &seller).await {
        Ok(created) => {
            tracing::info!(seller_id = %created.id, "registered seller");
            Ok(created)
        }
        Err(e) if queries::is_unique_violation(&e, "sellers_phone_key") => {
            Err(AppError::Conflict("phone already registered".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Unknown phone and wrong PIN are indistinguishable to the caller.
pub async fn authenticate_seller(
    pool: &PgPool,
    phone: &str,
    pin_input: &str,
) -> Result<Seller, AppError> {
    let invalid = || AppError::Unauthorized("invalid credentials".to_string());

    let seller = queries::find_seller_by_phone(pool, phone)
        .await?
        .ok_or_else(invalid)?;

    if !pin::verify_pin(pin_input, &seller.pin_salt, &seller.pin_hash) {
        return Err(invalid());
    }

    Ok(seller)
}
