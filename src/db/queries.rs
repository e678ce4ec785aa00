use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Result, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::db::models::{BandAccount, LedgerEntry, Seller};

// --- Band account queries ---

pub async fn insert_band_account(
    executor: &mut SqlxTransaction<'_, Postgres>,
    account: &BandAccount,
) -> Result<BandAccount> {
    sqlx::query_as::<_, BandAccount>(
        r#"
        INSERT INTO band_accounts (
            id, name, phone, band_code, pin_salt, pin_hash,
            balance_minor, is_blocked, created_at, deleted_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(account.id)
    .bind(&account.name)
    .bind(&account.phone)
    .bind(&account.band_code)
    .bind(&account.pin_salt)
    .bind(&account.pin_hash)
    .bind(account.balance_minor)
    .bind(account.is_blocked)
    .bind(account.created_at)
    .bind(account.deleted_at)
    .fetch_one(&mut **executor)
    .await
}

/// Case-insensitive lookup among live accounts.
pub async fn find_band_account(pool: &PgPool, band_code: &str) -> Result<Option<BandAccount>> {
    sqlx::query_as::<_, BandAccount>(
        "SELECT * FROM band_accounts WHERE UPPER(band_code) = UPPER($1) AND deleted_at IS NULL",
    )
    .bind(band_code)
    .fetch_optional(pool)
    .await
}

pub async fn find_band_account_by_phone(pool: &PgPool, phone: &str) -> Result<Option<BandAccount>> {
    sqlx::query_as::<_, BandAccount>(
        "SELECT * FROM band_accounts WHERE phone = $1 AND deleted_at IS NULL",
    )
    .bind(phone)
    .fetch_optional(pool)
    .await
}

/// Locks the account row for the duration of the enclosing transaction.
/// Concurrent payments against the same band serialize here.
pub async fn lock_band_account(
    executor: &mut SqlxTransaction<'_, Postgres>,
    band_code: &str,
) -> Result<Option<BandAccount>> {
    sqlx::query_as::<_, BandAccount>(
        r#"
        SELECT * FROM band_accounts
        WHERE UPPER(band_code) = UPPER($1) AND deleted_at IS NULL
        FOR UPDATE
        "#,
    )
    .bind(band_code)
    .fetch_optional(&mut **executor)
    .await
}

pub async fn list_band_accounts(pool: &PgPool) -> Result<Vec<BandAccount>> {
    sqlx::query_as::<_, BandAccount>(
        "SELECT * FROM band_accounts WHERE deleted_at IS NULL ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await
}

/// True if the code was ever issued, tombstoned accounts included.
/// Deleted codes stay reserved so a stale client can never credit a
/// band reassigned to somebody else.
pub async fn band_code_exists(pool: &PgPool, band_code: &str) -> Result<bool> {
    let exists: Option<(i32,)> = sqlx::query_as(
        "SELECT 1 FROM band_accounts WHERE UPPER(band_code) = UPPER($1) LIMIT 1",
    )
    .bind(band_code)
    .fetch_optional(pool)
    .await?;

    Ok(exists.is_some())
}

pub async fn set_blocked(
    pool: &PgPool,
    band_code: &str,
    blocked: bool,
) -> Result<Option<BandAccount>> {
    sqlx::query_as::<_, BandAccount>(
        r#"
        UPDATE band_accounts SET is_blocked = $2
        WHERE UPPER(band_code) = UPPER($1) AND deleted_at IS NULL
        RETURNING *
        "#,
    )
    .bind(band_code)
    .bind(blocked)
    .fetch_optional(pool)
    .await
}

/// Tombstones the account. Ledger history survives and the code is never
/// reissued (uniqueness index spans tombstones).
pub async fn soft_delete_band_account(pool: &PgPool, band_code: &str) -> Result<Option<Uuid>> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        UPDATE band_accounts SET deleted_at = NOW()
        WHERE UPPER(band_code) = UPPER($1) AND deleted_at IS NULL
        RETURNING id
        "#,
    )
    .bind(band_code)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id,)| id))
}

pub async fn update_balance(
    executor: &mut SqlxTransaction<'_, Postgres>,
    account_id: Uuid,
    balance_minor: i64,
) -> Result<()> {
    sqlx::query("UPDATE band_accounts SET balance_minor = $2 WHERE id = $1")
        .bind(account_id)
        .bind(balance_minor)
        .execute(&mut **executor)
        .await?;

    Ok(())
}

// --- Ledger queries ---

pub async fn insert_ledger_entry(
    executor: &mut SqlxTransaction<'_, Postgres>,
    entry: &LedgerEntry,
) -> Result<LedgerEntry> {
    sqlx::query_as::<_, LedgerEntry>(
        r#"
        INSERT INTO ledger_entries (
            id, band_account_id, band_code, amount_minor, direction,
            description, seller_id, balance_after_minor, idempotency_key, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(entry.id)
    .bind(entry.band_account_id)
    .bind(&entry.band_code)
    .bind(entry.amount_minor)
    .bind(&entry.direction)
    .bind(&entry.description)
    .bind(entry.seller_id)
    .bind(entry.balance_after_minor)
    .bind(&entry.idempotency_key)
    .bind(entry.created_at)
    .fetch_one(&mut **executor)
    .await
}

pub async fn find_ledger_entry_by_key(
    executor: &mut SqlxTransaction<'_, Postgres>,
    idempotency_key: &str,
) -> Result<Option<LedgerEntry>> {
    sqlx::query_as::<_, LedgerEntry>("SELECT * FROM ledger_entries WHERE idempotency_key = $1")
        .bind(idempotency_key)
        .fetch_optional(&mut **executor)
        .await
}

pub async fn get_ledger_entry_by_key(
    pool: &PgPool,
    idempotency_key: &str,
) -> Result<Option<LedgerEntry>> {
    sqlx::query_as::<_, LedgerEntry>("SELECT * FROM ledger_entries WHERE idempotency_key = $1")
        .bind(idempotency_key)
        .fetch_optional(pool)
        .await
}

pub async fn recent_ledger_entries(
    pool: &PgPool,
    band_account_id: Uuid,
    limit: i64,
) -> Result<Vec<LedgerEntry>> {
    sqlx::query_as::<_, LedgerEntry>(
        r#"
        SELECT * FROM ledger_entries
        WHERE band_account_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(band_account_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Credits minus debits over the full history. Must equal the running
/// balance on the account row at all times.
pub async fn ledger_balance(pool: &PgPool, band_account_id: Uuid) -> Result<i64> {
    let (sum,): (i64,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(
            CASE direction WHEN 'credit' THEN amount_minor ELSE -amount_minor END
        ), 0)::BIGINT
        FROM ledger_entries
        WHERE band_account_id = $1
        "#,
    )
    .bind(band_account_id)
    .fetch_one(pool)
    .await?;

    Ok(sum)
}

// --- Seller queries ---

pub async fn insert_seller(pool: &PgPool, seller: &Seller) -> Result<Seller> {
    sqlx::query_as::<_, Seller>(
        r#"
        INSERT INTO sellers (
            id, name, business_name, phone, pin_salt, pin_hash, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(seller.id)
    .bind(&seller.name)
    .bind(&seller.business_name)
    .bind(&seller.phone)
    .bind(&seller.pin_salt)
    .bind(&seller.pin_hash)
    .bind(seller.created_at)
    .fetch_one(pool)
    .await
}

pub async fn find_seller_by_phone(pool: &PgPool, phone: &str) -> Result<Option<Seller>> {
    sqlx::query_as::<_, Seller>("SELECT * FROM sellers WHERE phone = $1")
        .bind(phone)
        .fetch_optional(pool)
        .await
}

pub async fn get_seller(pool: &PgPool, id: Uuid) -> Result<Option<Seller>> {
    sqlx::query_as::<_, Seller>("SELECT * FROM sellers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

// --- Stats queries ---

pub async fn registry_totals(pool: &PgPool) -> Result<(i64, i64, i64, i64)> {
    sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(balance_minor), 0)::BIGINT,
               COUNT(*) FILTER (WHERE NOT is_blocked),
               COUNT(*) FILTER (WHERE is_blocked)
        FROM band_accounts
        WHERE deleted_at IS NULL
        "#,
    )
    .fetch_one(pool)
    .await
}

pub async fn ledger_totals_between(
    pool: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(i64, i64)> {
    sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(amount_minor), 0)::BIGINT
        FROM ledger_entries
        WHERE created_at >= $1 AND created_at < $2
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await
}

/// Detects a unique-constraint violation on a named index, used to map
/// duplicate phones and idempotency-key races to their domain outcomes.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
