//! Core types for the record store. Domain-agnostic.

use serde::{Deserialize, Serialize};

/// A record as returned by a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub key: String,
    /// Epoch milliseconds. The only column scans filter on.
    pub ts: i64,
    pub payload: serde_json::Value,
}

/// A record to be appended. The caller builds this.
#[derive(Debug, Clone)]
pub struct AppendRecord {
    pub key: String,
    pub ts: i64,
    pub payload: serde_json::Value,
}

impl AppendRecord {
    pub fn new(key: impl Into<String>, ts: i64, payload: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            ts,
            payload,
        }
    }
}

impl From<AppendRecord> for StoredRecord {
    fn from(record: AppendRecord) -> Self {
        Self {
            key: record.key,
            ts: record.ts,
            payload: record.payload,
        }
    }
}
