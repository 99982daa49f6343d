//! MemoryEventStore: process-local record store.
//!
//! Backs the API when no database is configured and stands in for Postgres
//! in tests: no network, no Docker. Failure toggles let tests drive every
//! error path of the storage contract.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::store::{EventStore, RecordStream};
use crate::types::{AppendRecord, StoredRecord};

#[derive(Default)]
struct MemoryEventStoreInner {
    records: Vec<StoredRecord>,
    fail_on_append: bool,
    fail_on_scan: bool,
    /// Break enumeration after this many records.
    fail_after: Option<usize>,
    scan_delay: Option<Duration>,
}

/// Thread-safe via interior Mutex. Appends push, scans filter a snapshot.
#[derive(Default)]
pub struct MemoryEventStore {
    inner: Mutex<MemoryEventStoreInner>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `append` return an error for every call.
    pub fn failing_appends(self) -> Self {
        self.lock().fail_on_append = true;
        self
    }

    /// Make `scan` refuse to open.
    pub fn failing_scans(self) -> Self {
        self.lock().fail_on_scan = true;
        self
    }

    /// Make every scan yield `n` records and then an error.
    pub fn failing_after(self, n: usize) -> Self {
        self.lock().fail_after = Some(n);
        self
    }

    /// Stall each scan for `delay` before yielding anything.
    pub fn with_scan_delay(self, delay: Duration) -> Self {
        self.lock().scan_delay = Some(delay);
        self
    }

    /// Store a record as-is, bypassing any caller-side encoding.
    pub fn insert_raw(&self, record: StoredRecord) {
        self.lock().records.push(record);
    }

    pub fn records(&self) -> Vec<StoredRecord> {
        self.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryEventStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append(&self, record: AppendRecord) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_on_append {
            bail!("MemoryEventStore: append forced failure");
        }
        // Same uniqueness rule as the Postgres primary key.
        if inner.records.iter().any(|r| r.key == record.key) {
            bail!("MemoryEventStore: duplicate key {}", record.key);
        }
        inner.records.push(record.into());
        Ok(())
    }

    async fn scan(&self, min_ts: i64) -> Result<RecordStream> {
        let (snapshot, fail_after, delay) = {
            let inner = self.lock();
            if inner.fail_on_scan {
                bail!("MemoryEventStore: scan forced failure");
            }
            let snapshot: Vec<StoredRecord> = inner
                .records
                .iter()
                .filter(|r| r.ts >= min_ts)
                .cloned()
                .collect();
            (snapshot, inner.fail_after, inner.scan_delay)
        };

        let stream = async_stream::stream! {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            for (i, record) in snapshot.into_iter().enumerate() {
                if fail_after == Some(i) {
                    break;
                }
                yield Ok(record);
            }
            if let Some(n) = fail_after {
                yield Err(anyhow::anyhow!("MemoryEventStore: scan broke after {n} records"));
            }
        };

        Ok(Box::pin(stream))
    }
}
