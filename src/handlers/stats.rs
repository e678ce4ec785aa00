use axum::{Json, extract::State, response::IntoResponse};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;
use crate::db::queries;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_balance: i64,
    pub active_bands: i64,
    pub blocked_bands: i64,
    pub today_transactions: i64,
    pub today_volume: i64,
}

#[utoipa::path(
    get,
    path = "/api/stats/",
    responses(
        (status = 200, description = "Dashboard aggregates", body = DashboardStats)
    ),
    tag = "Stats"
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let (total_users, total_balance, active_bands, blocked_bands) =
        queries::registry_totals(&state.db).await?;

    let (start, end) = today_window(Utc::now(), state.config.stats_utc_offset_minutes);
    let (today_transactions, today_volume) =
        queries::ledger_totals_between(&state.db, start, end).await?;

    Ok(Json(DashboardStats {
        total_users,
        total_balance,
        active_bands,
        blocked_bands,
        today_transactions,
        today_volume,
    }))
}

/// "Today" is the calendar day at a fixed configured UTC offset
/// (STATS_UTC_OFFSET_MINUTES, default 0).
fn today_window(now: DateTime<Utc>, offset_minutes: i32) -> (DateTime<Utc>, DateTime<Utc>) {
    let offset = Duration::minutes(offset_minutes as i64);
    let local_now = now + offset;
    let local_midnight = local_now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time");
    let start = DateTime::<Utc>::from_naive_utc_and_offset(local_midnight, Utc) - offset;

    (start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn utc_window_covers_the_calendar_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap();
        let (start, end) = today_window(now, 0);

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn positive_offset_shifts_the_window_back() {
        // IST (+05:30): local midnight is 18:30 UTC the previous day.
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap();
        let (start, end) = today_window(now, 330);

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 13, 18, 30, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 14, 18, 30, 0).unwrap());
    }

    #[test]
    fn offset_rolls_the_local_date_forward() {
        // 23:00 UTC at +05:30 is already the next local day.
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 23, 0, 0).unwrap();
        let (start, _end) = today_window(now, 330);

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 14, 18, 30, 0).unwrap());
    }
}
