use meter_store::db;
use meter_store::domain::{Consumer, MeterReading};
use sqlx::PgPool;

use super::{ReadingStore, StoreError};
use crate::engine::hourly::DateRange;

/// [`ReadingStore`] over the `ht_blp` table.
#[derive(Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn query_error(e: anyhow::Error) -> StoreError {
    metrics::counter!("store_query_errors_total").increment(1);
    StoreError::Query(e.to_string())
}

#[async_trait::async_trait]
impl ReadingStore for PgReadingStore {
    async fn consumers(&self) -> Result<Vec<Consumer>, StoreError> {
        db::consumers(&self.pool).await.map_err(query_error)
    }

    async fn readings(&self, consumer_id: &str, range: Option<DateRange>) -> Result<Vec<MeterReading>, StoreError> {
        let rows = match range {
            Some(range) => db::readings_between(&self.pool, consumer_id, range.start(), range.end()).await,
            None => db::consumer_history(&self.pool, consumer_id).await,
        };

        let rows = rows.map_err(query_error)?;
        tracing::debug!(consumer_id, rows = rows.len(), "readings fetched");
        Ok(rows)
    }

    async fn all_readings(&self) -> Result<Vec<MeterReading>, StoreError> {
        db::all_readings(&self.pool).await.map_err(query_error)
    }
}
