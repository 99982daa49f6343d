//! Generic, domain-agnostic append/scan record store.
//!
//! Stores opaque JSON payloads keyed by id and stamped with an epoch-millis
//! timestamp. Zero knowledge of traffic events; consumers encode and decode
//! their own payloads.

pub mod memory;
pub mod postgres;
pub mod store;
pub mod types;

pub use memory::MemoryEventStore;
pub use postgres::PgEventStore;
pub use store::{EventStore, RecordStream};
pub use types::{AppendRecord, StoredRecord};
