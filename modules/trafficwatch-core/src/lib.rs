//! Geospatial, time-windowed retrieval of traffic reports, and validated
//! ingestion of new ones. Holds no state of its own; every call works on
//! data fetched fresh from the injected [`EventStore`].

pub mod ingest;
pub mod nearby;

pub use ingest::{validate_report, ReportIngestor};
pub use nearby::{is_nearby, EventQueryService};

pub use trafficwatch_events::EventStore;
