use std::pin::Pin;

use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;

use crate::types::{AppendRecord, StoredRecord};

/// Lazily enumerated scan results. An `Err` item means enumeration broke
/// partway through; callers must not treat what came before as complete.
pub type RecordStream = Pin<Box<dyn Stream<Item = Result<StoredRecord>> + Send>>;

/// The storage collaborator: append one record, scan by minimum timestamp.
///
/// Implementations are cheap handles, constructed once and shared by every
/// request. Scans carry no ordering guarantee.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist one record.
    async fn append(&self, record: AppendRecord) -> Result<()>;

    /// Every record with `ts >= min_ts`.
    async fn scan(&self, min_ts: i64) -> Result<RecordStream>;
}
