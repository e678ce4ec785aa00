use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const DIRECTION_CREDIT: &str = "credit";
pub const DIRECTION_DEBIT: &str = "debit";

/// Direction of a balance movement. Stored as text in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Credit => DIRECTION_CREDIT,
            Direction::Debit => DIRECTION_DEBIT,
        }
    }
}

/// A user account bound 1:1 to a physical NFC band.
///
/// The PIN is stored only as a salted hash; neither the salt nor the hash
/// is ever serialized. `balance_minor` is the running total maintained by
/// the payment processor; the ledger remains the auditable source of truth.
#[derive(Debug, FromRow, Serialize, Deserialize, ToSchema)]
pub struct BandAccount {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(rename = "band_id")]
    pub band_code: String,
    #[serde(skip_serializing)]
    pub pin_salt: String,
    #[serde(skip_serializing)]
    pub pin_hash: String,
    #[serde(rename = "balance")]
    pub balance_minor: i64,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl BandAccount {
    pub fn new(
        name: String,
        phone: String,
        band_code: String,
        pin_salt: String,
        pin_hash: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            phone,
            band_code,
            pin_salt,
            pin_hash,
            balance_minor: 0,
            is_blocked: false,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }
}

/// An authenticated operator entity, distinct from a band account.
#[derive(Debug, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Seller {
    pub id: Uuid,
    pub name: String,
    pub business_name: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub pin_salt: String,
    #[serde(skip_serializing)]
    pub pin_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Seller {
    pub fn new(
        name: String,
        business_name: String,
        phone: String,
        pin_salt: String,
        pin_hash: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            business_name,
            phone,
            pin_salt,
            pin_hash,
            created_at: Utc::now(),
        }
    }
}

/// Immutable record of one balance movement. Never updated or deleted:
/// the sum of a band's entries in timestamp order reconstructs its
/// balance exactly.
#[derive(Debug, FromRow, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntry {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub band_account_id: Uuid,
    #[serde(rename = "band_id")]
    pub band_code: String,
    #[serde(rename = "amount")]
    pub amount_minor: i64,
    pub direction: String,
    pub description: String,
    pub seller_id: Option<Uuid>,
    #[serde(rename = "balance_after")]
    pub balance_after_minor: i64,
    #[serde(skip_serializing)]
    pub idempotency_key: Option<String>,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        band_account_id: Uuid,
        band_code: String,
        amount_minor: i64,
        direction: Direction,
        description: String,
        seller_id: Option<Uuid>,
        balance_after_minor: i64,
        idempotency_key: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            band_account_id,
            band_code,
            amount_minor,
            direction: direction.as_str().to_string(),
            description,
            seller_id,
            balance_after_minor,
            idempotency_key,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_starts_empty_and_unblocked() {
        let account = BandAccount::new(
            "Asha Verma".to_string(),
            "9000000001".to_string(),
            "NKM-A1B2C3D".to_string(),
            "73616c74".to_string(),
            "deadbeef".to_string(),
        );

        assert_eq!(account.balance_minor, 0);
        assert!(!account.is_blocked);
        assert!(account.deleted_at.is_none());
    }

    #[test]
    fn account_serialization_hides_pin_material() {
        let account = BandAccount::new(
            "Asha Verma".to_string(),
            "9000000001".to_string(),
            "NKM-A1B2C3D".to_string(),
            "73616c74".to_string(),
            "deadbeef".to_string(),
        );

        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("pin_salt").is_none());
        assert!(json.get("pin_hash").is_none());
        assert_eq!(json["band_id"], "NKM-A1B2C3D");
        assert_eq!(json["balance"], 0);
    }

    #[test]
    fn ledger_entry_serializes_wire_names() {
        let entry = LedgerEntry::new(
            Uuid::new_v4(),
            "NKM-A1B2C3D".to_string(),
            200,
            Direction::Debit,
            "Payment".to_string(),
            None,
            300,
            Some("attempt-1".to_string()),
        );

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["amount"], 200);
        assert_eq!(json["direction"], "debit");
        assert_eq!(json["balance_after"], 300);
        assert!(json.get("idempotency_key").is_none());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn direction_round_trips_as_lowercase() {
        assert_eq!(Direction::Credit.as_str(), "credit");
        assert_eq!(Direction::Debit.as_str(), "debit");
        let parsed: Direction = serde_json::from_str("\"debit\"").unwrap();
        assert_eq!(parsed, Direction::Debit);
    }
}
