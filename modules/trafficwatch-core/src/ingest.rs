//! Validation and persistence of new reports.
//!
//! Every check runs before the store is touched; an invalid report never
//! produces an append.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use trafficwatch_common::{
    now_millis, EventReport, TrafficEvent, TrafficWatchError, ValidationError, ANONYMOUS_USER,
};
use trafficwatch_events::{AppendRecord, EventStore};

/// Type, then latitude, then longitude. First failure wins.
pub fn validate_report(report: &EventReport) -> Result<(), ValidationError> {
    if !report.event_type.is_valid() {
        return Err(ValidationError::InvalidType(report.event_type.to_string()));
    }
    // `contains` is false for NaN, so non-finite coordinates are rejected too.
    if !(-90.0..=90.0).contains(&report.latitude) {
        return Err(ValidationError::InvalidLatitude(report.latitude));
    }
    if !(-180.0..=180.0).contains(&report.longitude) {
        return Err(ValidationError::InvalidLongitude(report.longitude));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ReportIngestor {
    store: Arc<dyn EventStore>,
}

impl ReportIngestor {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Validate, fill defaults, persist. Returns the event as stored.
    pub async fn submit(&self, report: EventReport) -> Result<TrafficEvent, TrafficWatchError> {
        self.submit_at(report, now_millis()).await
    }

    /// [`submit`](Self::submit) with `now_ms` standing in for the clock when
    /// the report carries no timestamp.
    pub async fn submit_at(&self, report: EventReport, now_ms: i64) -> Result<TrafficEvent, TrafficWatchError> {
        validate_report(&report)?;

        let event = TrafficEvent {
            id: if report.id.is_empty() {
                Uuid::new_v4().to_string()
            } else {
                report.id
            },
            event_type: report.event_type,
            latitude: report.latitude,
            longitude: report.longitude,
            timestamp: report.timestamp.unwrap_or(now_ms),
            user_id: if report.user_id.is_empty() {
                ANONYMOUS_USER.to_string()
            } else {
                report.user_id
            },
        };

        let payload = serde_json::to_value(&event).map_err(TrafficWatchError::persistence)?;
        let record = AppendRecord::new(event.id.clone(), event.timestamp, payload);

        if let Err(e) = self.store.append(record).await {
            warn!(id = %event.id, error = %e, "Failed to save event");
            return Err(TrafficWatchError::persistence(format!("{e:#}")));
        }

        // Log without coordinates (reporter location)
        info!(id = %event.id, event_type = %event.event_type, "Traffic report stored");
        Ok(event)
    }
}
