//! Band registry: account creation with band code issue.
//!
//! Codes are allocated by insert-and-retry against the uniqueness index
//! rather than check-then-insert, so two concurrent registrations can
//! never race into the same code.

use sqlx::PgPool;

use crate::db::{models::BandAccount, queries};
use crate::error::AppError;
use crate::services::{band_codes, pin};

const MAX_CODE_ATTEMPTS: u32 = 8;

pub async fn register_user(
    pool: &PgPool,
    band_code_prefix: &str,
    name: &str,
    phone: &str,
    pin: &str,
) -> Result<BandAccount, AppError> {
    // Friendly pre-check; the partial unique index still backstops races.
    if queries::find_band_account_by_phone(pool, phone).await?.is_some() {
        return Err(AppError::Conflict("phone already registered".to_string()));
    }

    let (pin_salt, pin_hash) = pin::hash_pin(pin);

    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let band_code = band_codes::generate_band_code(band_code_prefix);
        let account = BandAccount::new(
            name.to_string(),
            phone.to_string(),
            band_code,
            pin_salt.clone(),
            pin_hash.clone(),
        );

        let mut tx = pool.begin().await?;
        match queries::insert_band_account(&mut tx, &account).await {
            Ok(created) => {
                tx.commit().await?;
                tracing::info!(band_code = %created.band_code, "registered band account");
                return Ok(created);
            }
            Err(e) if queries::is_unique_violation(&e, "band_accounts_phone_live_key") => {
                return Err(AppError::Conflict("phone already registered".to_string()));
            }
            Err(e) if queries::is_unique_violation(&e, "band_accounts_band_code_key") => {
                // 36^7 codes; consecutive collisions mean something is off,
                // but retry a few times before giving up.
                tracing::warn!(attempt, "band code collision, retrying");
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(
        "could not allocate a unique band code".to_string(),
    ))
}
