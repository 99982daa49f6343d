use chrono::Utc;
use serde::{Deserialize, Serialize};

// --- Policy ---

/// Lookback beyond which an event no longer counts as current.
pub const RECENCY_WINDOW_HOURS: i64 = 2;

/// Radius applied by the request boundary when the caller gives none.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Reporter id substituted when a report carries none.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Milliseconds since the Unix epoch, the unit of every event timestamp.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Earliest timestamp still inside the recency window as of `now_ms`.
pub fn recency_cutoff(now_ms: i64) -> i64 {
    now_ms - chrono::Duration::hours(RECENCY_WINDOW_HOURS).num_milliseconds()
}

// --- Event type ---

/// Kind of reported incident.
///
/// Any wire value outside the four known kinds lands in `Unknown` so that
/// decoding never fails on the type alone; ingestion rejects it through
/// [`EventType::is_valid`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    TrafficJam,
    Accident,
    Construction,
    Police,
    Unknown(String),
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::TrafficJam,
        EventType::Accident,
        EventType::Construction,
        EventType::Police,
    ];

    pub fn is_valid(&self) -> bool {
        !matches!(self, EventType::Unknown(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::TrafficJam => "traffic_jam",
            EventType::Accident => "accident",
            EventType::Construction => "construction",
            EventType::Police => "police",
            EventType::Unknown(raw) => raw,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            EventType::TrafficJam => "Traffic Jam",
            EventType::Accident => "Accident",
            EventType::Construction => "Construction",
            EventType::Police => "Police",
            EventType::Unknown(_) => "Unknown",
        }
    }

    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "traffic_jam" => Self::TrafficJam,
            "accident" => Self::Accident,
            "construction" => Self::Construction,
            "police" => Self::Police,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        match Self::from_str_loose(&s) {
            Self::Unknown(_) => Self::Unknown(s),
            known => known,
        }
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        match t {
            EventType::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

// --- Events ---

/// A single reported incident as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub latitude: f64,
    pub longitude: f64,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub user_id: String,
}

impl TrafficEvent {
    /// Build a fresh report stamped with the current time. The id is left
    /// empty; ingestion assigns one.
    pub fn new(event_type: EventType, latitude: f64, longitude: f64, user_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            event_type,
            latitude,
            longitude,
            timestamp: now_millis(),
            user_id: user_id.into(),
        }
    }
}

/// A caller-supplied candidate event, before validation and defaulting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReport {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub user_id: String,
}

impl EventReport {
    pub fn new(event_type: EventType, latitude: f64, longitude: f64) -> Self {
        Self {
            id: String::new(),
            event_type,
            latitude,
            longitude,
            timestamp: None,
            user_id: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

impl From<TrafficEvent> for EventReport {
    fn from(event: TrafficEvent) -> Self {
        Self {
            id: event.id,
            event_type: event.event_type,
            latitude: event.latitude,
            longitude: event.longitude,
            timestamp: Some(event.timestamp),
            user_id: event.user_id,
        }
    }
}

// --- Queries ---

/// "What is happening near here?" Built per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventsQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

impl EventsQuery {
    pub fn new(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_km,
        }
    }
}
