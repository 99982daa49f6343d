//! PgEventStore: the record store backed by Postgres.
//!
//! One row per record: the key, an indexed epoch-millis column for scans, and
//! the payload as JSONB.

use anyhow::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::PgPool;
use tracing::info;

use crate::store::{EventStore, RecordStream};
use crate::types::{AppendRecord, StoredRecord};

#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Create the table and its scan index if they don't exist.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS traffic_events (
                key      TEXT    PRIMARY KEY,
                ts       BIGINT  NOT NULL,
                payload  JSONB   NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS traffic_events_ts_idx ON traffic_events (ts)")
            .execute(&self.pool)
            .await?;

        info!("traffic_events schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn append(&self, record: AppendRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO traffic_events (key, ts, payload)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&record.key)
        .bind(record.ts)
        .bind(&record.payload)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn scan(&self, min_ts: i64) -> Result<RecordStream> {
        let pool = self.pool.clone();

        let stream = async_stream::stream! {
            let mut rows = sqlx::query_as::<_, (String, i64, serde_json::Value)>(
                r#"
                SELECT key, ts, payload
                FROM traffic_events
                WHERE ts >= $1
                "#,
            )
            .bind(min_ts)
            .fetch(&pool);

            loop {
                match rows.try_next().await {
                    Ok(Some((key, ts, payload))) => yield Ok(StoredRecord { key, ts, payload }),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(anyhow::Error::from(e));
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
