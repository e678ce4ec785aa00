//! In-process scan event hub: one hardware producer, many subscribed UI
//! sessions. Events are ephemeral: nothing is persisted, new subscribers
//! never see historical scans, and a scan with no listeners is lost.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    #[serde(rename = "bandId")]
    pub band_code: String,
    pub timestamp: DateTime<Utc>,
}

impl ScanEvent {
    pub fn new(band_code: String) -> Self {
        Self {
            band_code,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct ScanHub {
    tx: broadcast::Sender<ScanEvent>,
}

impl ScanHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Fans the event out to every current subscriber. The send error
    /// (no receivers) is deliberately ignored.
    pub fn publish(&self, event: ScanEvent) {
        let delivered = self.tx.send(event).unwrap_or(0);
        tracing::debug!(subscribers = delivered, "scan event published");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_all_subscribers() {
        let hub = ScanHub::new(8);
        let mut rx_a = hub.subscribe();
        let mut rx_b = hub.subscribe();

        hub.publish(ScanEvent::new("NKM-A1B2C3D".to_string()));

        assert_eq!(rx_a.recv().await.unwrap().band_code, "NKM-A1B2C3D");
        assert_eq!(rx_b.recv().await.unwrap().band_code, "NKM-A1B2C3D");
    }

    #[tokio::test]
    async fn no_replay_for_late_subscribers() {
        let hub = ScanHub::new(8);
        let mut early = hub.subscribe();

        hub.publish(ScanEvent::new("NKM-0000001".to_string()));

        let mut late = hub.subscribe();
        hub.publish(ScanEvent::new("NKM-0000002".to_string()));

        // The early subscriber sees both, the late one only the second.
        assert_eq!(early.recv().await.unwrap().band_code, "NKM-0000001");
        assert_eq!(early.recv().await.unwrap().band_code, "NKM-0000002");
        assert_eq!(late.recv().await.unwrap().band_code, "NKM-0000002");
        assert!(late.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_lost() {
        let hub = ScanHub::new(8);
        hub.publish(ScanEvent::new("NKM-LOSTONE".to_string()));

        let mut rx = hub.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn event_serializes_wire_names() {
        let event = ScanEvent::new("NKM-A1B2C3D".to_string());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["bandId"], "NKM-A1B2C3D");
        assert!(json.get("timestamp").is_some());
    }
}
