//! Which reports are current and close to a point.
//!
//! Full scan of the recency window followed by a radius filter.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tracing::{debug, warn};

use trafficwatch_common::config::DEFAULT_SCAN_TIMEOUT;
use trafficwatch_common::{
    haversine_km, now_millis, recency_cutoff, EventsQuery, TrafficEvent, TrafficWatchError,
};
use trafficwatch_events::{EventStore, StoredRecord};

/// Recency and radius test for a single event. Both bounds are inclusive.
pub fn is_nearby(event: &TrafficEvent, query: &EventsQuery, cutoff_ms: i64) -> bool {
    if event.timestamp < cutoff_ms {
        return false;
    }
    let dist = haversine_km(query.latitude, query.longitude, event.latitude, event.longitude);
    dist <= query.radius_km
}

/// Counters from one scan, logged at debug level.
#[derive(Debug, Default)]
struct ScanStats {
    scanned: u32,
    undecodable: u32,
    out_of_range: u32,
}

#[derive(Clone)]
pub struct EventQueryService {
    store: Arc<dyn EventStore>,
    scan_timeout: Duration,
}

impl EventQueryService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }

    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Events from the last two hours within `query.radius_km` of the query
    /// point. Result order is whatever the store yields.
    pub async fn find_nearby(&self, query: &EventsQuery) -> Result<Vec<TrafficEvent>, TrafficWatchError> {
        self.find_nearby_at(query, now_millis()).await
    }

    /// [`find_nearby`](Self::find_nearby) against an explicit clock.
    pub async fn find_nearby_at(
        &self,
        query: &EventsQuery,
        now_ms: i64,
    ) -> Result<Vec<TrafficEvent>, TrafficWatchError> {
        let cutoff = recency_cutoff(now_ms);

        let scan = tokio::time::timeout(self.scan_timeout, self.collect_nearby(query, cutoff)).await;
        match scan {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = self.scan_timeout.as_millis() as u64, "Event scan timed out");
                Err(TrafficWatchError::Retrieval(format!(
                    "event scan timed out after {:?}",
                    self.scan_timeout
                )))
            }
        }
    }

    async fn collect_nearby(
        &self,
        query: &EventsQuery,
        cutoff: i64,
    ) -> Result<Vec<TrafficEvent>, TrafficWatchError> {
        let mut records = self.store.scan(cutoff).await.map_err(|e| {
            warn!(error = %e, "Failed to open event scan");
            TrafficWatchError::retrieval(format!("{e:#}"))
        })?;

        let mut stats = ScanStats::default();
        let mut events = Vec::new();

        while let Some(item) = records.next().await {
            let record = item.map_err(|e| {
                warn!(error = %e, scanned = stats.scanned, "Event scan failed mid-stream");
                TrafficWatchError::retrieval(format!("{e:#}"))
            })?;
            stats.scanned += 1;

            let Some(event) = decode(record) else {
                stats.undecodable += 1;
                continue;
            };

            if is_nearby(&event, query, cutoff) {
                events.push(event);
            } else {
                stats.out_of_range += 1;
            }
        }

        debug!(
            scanned = stats.scanned,
            undecodable = stats.undecodable,
            out_of_range = stats.out_of_range,
            matched = events.len(),
            radius_km = query.radius_km,
            "Nearby scan complete"
        );

        Ok(events)
    }
}

/// Soft failure: an undecodable record is logged and dropped, never fatal.
fn decode(record: StoredRecord) -> Option<TrafficEvent> {
    match serde_json::from_value::<TrafficEvent>(record.payload) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(key = %record.key, error = %e, "Skipping undecodable event record");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trafficwatch_common::EventType;

    const NOW: i64 = 1_700_000_000_000;
    const MINUTE: i64 = 60 * 1000;

    fn event_at(lat: f64, lng: f64, timestamp: i64) -> TrafficEvent {
        TrafficEvent {
            id: "e".into(),
            event_type: EventType::TrafficJam,
            latitude: lat,
            longitude: lng,
            timestamp,
            user_id: "anonymous".into(),
        }
    }

    #[test]
    fn same_point_recent_is_nearby() {
        let query = EventsQuery::new(40.0, -74.0, 5.0);
        assert!(is_nearby(&event_at(40.0, -74.0, NOW - 10 * MINUTE), &query, recency_cutoff(NOW)));
    }

    #[test]
    fn far_event_is_not_nearby() {
        // ~8km north
        let query = EventsQuery::new(40.0, -74.0, 5.0);
        assert!(!is_nearby(&event_at(40.072, -74.0, NOW - 10 * MINUTE), &query, recency_cutoff(NOW)));
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let event = event_at(40.05, -74.0, NOW);
        let exact = haversine_km(40.0, -74.0, 40.05, -74.0);
        let query = EventsQuery::new(40.0, -74.0, exact);
        assert!(is_nearby(&event, &query, recency_cutoff(NOW)));

        let query = EventsQuery::new(40.0, -74.0, exact - 1e-9);
        assert!(!is_nearby(&event, &query, recency_cutoff(NOW)));
    }

    #[test]
    fn cutoff_boundary() {
        let query = EventsQuery::new(40.0, -74.0, 5.0);
        let cutoff = recency_cutoff(NOW);
        assert!(is_nearby(&event_at(40.0, -74.0, cutoff), &query, cutoff));
        assert!(!is_nearby(&event_at(40.0, -74.0, cutoff - 1), &query, cutoff));
    }

    #[test]
    fn decode_skips_garbage() {
        let record = StoredRecord {
            key: "bad".into(),
            ts: NOW,
            payload: serde_json::json!({"latitude": "north"}),
        };
        assert!(decode(record).is_none());
    }
}
