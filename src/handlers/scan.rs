use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::AppState;
use crate::services::scan::ScanEvent;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct ScanPayload {
    #[serde(rename = "bandId", default)]
    pub band_id: Option<String>,
}

/// Hardware-facing ingest. Malformed payloads (no band identifier) are
/// dropped silently rather than surfaced as errors; the device retries
/// on its own schedule and has no use for a 4xx.
pub async fn scan_ingest(
    State(state): State<AppState>,
    Json(payload): Json<ScanPayload>,
) -> impl IntoResponse {
    match payload
        .band_id
        .as_deref()
        .map(validation::normalize_band_code)
        .filter(|code| !code.is_empty())
    {
        Some(band_code) => {
            state.scan_hub.publish(ScanEvent::new(band_code));
        }
        None => {
            tracing::debug!("dropping scan event without band identifier");
        }
    }

    StatusCode::ACCEPTED
}

/// One SSE stream per subscribed UI session. Subscribers only see scans
/// published after they connected; a lagging consumer skips the events
/// it missed and the stream carries on.
pub async fn scan_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.scan_hub.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    match Event::default().json_data(&event) {
                        Ok(sse_event) => yield Ok(sse_event),
                        Err(e) => {
                            tracing::error!("failed to serialize scan event: {}", e);
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("scan subscriber lagged behind by {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("scan hub closed");
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
