//! The payment processor: validates and atomically applies credits and
//! debits against a band account.
//!
//! Every request runs inside one database transaction holding a row lock
//! on the account (`SELECT ... FOR UPDATE`), so concurrent payments
//! against the same band serialize on the check-and-apply step while
//! payments against different bands proceed in parallel. The running
//! balance update and the ledger append commit together or not at all.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{Direction, LedgerEntry};
use crate::db::queries;
use crate::error::AppError;
use crate::services::pin;

#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub band_code: String,
    pub amount_minor: i64,
    pub direction: Direction,
    pub description: String,
    /// Required for debits: the PIN authorizes the payer, not the seller.
    pub pin: Option<String>,
    pub seller_id: Option<Uuid>,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub transaction_id: Uuid,
    pub balance_minor: i64,
    /// True when an already-committed attempt with the same idempotency
    /// key was found and returned instead of charging again.
    pub replayed: bool,
}

#[derive(Clone)]
pub struct PaymentProcessor {
    pool: PgPool,
}

impl PaymentProcessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn process(&self, request: PaymentRequest) -> Result<PaymentReceipt, AppError> {
        if request.amount_minor <= 0 {
            return Err(AppError::InvalidInput(
                "amount must be a positive integer in minor units".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        // A replayed attempt returns the committed outcome, charging nothing.
        if let Some(key) = request.idempotency_key.as_deref() {
            if let Some(existing) = queries::find_ledger_entry_by_key(&mut tx, key).await? {
                tracing::info!(idempotency_key = key, "replaying committed payment");
                return Ok(PaymentReceipt {
                    transaction_id: existing.id,
                    balance_minor: existing.balance_after_minor,
                    replayed: true,
                });
            }
        }

        let account = queries::lock_band_account(&mut tx, &request.band_code)
            .await?
            .ok_or_else(|| AppError::NotFound("Band not found".to_string()))?;

        if account.is_blocked {
            return Err(AppError::Conflict("band is blocked".to_string()));
        }

        if request.direction == Direction::Debit {
            let supplied = request
                .pin
                .as_deref()
                .ok_or_else(|| AppError::Unauthorized("PIN required".to_string()))?;

            if !pin::verify_pin(supplied, &account.pin_salt, &account.pin_hash) {
                return Err(AppError::Unauthorized("invalid PIN".to_string()));
            }

            if account.balance_minor < request.amount_minor {
                return Err(AppError::InsufficientFunds(format!(
                    "balance {} is less than amount {}",
                    account.balance_minor, request.amount_minor
                )));
            }
        }

        let new_balance = match request.direction {
            Direction::Credit => account
                .balance_minor
                .checked_add(request.amount_minor)
                .ok_or_else(|| AppError::InvalidInput("amount out of range".to_string()))?,
            Direction::Debit => account.balance_minor - request.amount_minor,
        };

        queries::update_balance(&mut tx, account.id, new_balance).await?;

        let entry = LedgerEntry::new(
            account.id,
            account.band_code.clone(),
            request.amount_minor,
            request.direction,
            request.description.clone(),
            request.seller_id,
            new_balance,
            request.idempotency_key.clone(),
        );

        match queries::insert_ledger_entry(&mut tx, &entry).await {
            Ok(inserted) => {
                tx.commit().await?;
                tracing::info!(
                    transaction_id = %inserted.id,
                    band_code = %inserted.band_code,
                    direction = %inserted.direction,
                    amount_minor = inserted.amount_minor,
                    "payment committed"
                );
                Ok(PaymentReceipt {
                    transaction_id: inserted.id,
                    balance_minor: new_balance,
                    replayed: false,
                })
            }
            Err(e) if queries::is_unique_violation(&e, "ledger_entries_idempotency_key") => {
                // A concurrent duplicate won the race and committed first;
                // our transaction is aborted, hand back its outcome.
                drop(tx);
                let key = request.idempotency_key.as_deref().unwrap_or_default();
                let existing = queries::get_ledger_entry_by_key(&self.pool, key)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal("idempotent entry vanished after conflict".to_string())
                    })?;

                Ok(PaymentReceipt {
                    transaction_id: existing.id,
                    balance_minor: existing.balance_after_minor,
                    replayed: true,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
