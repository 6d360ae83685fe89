use std::collections::HashMap;

use meter_store::domain::{Consumer, MeterReading};

use crate::engine::hourly::DateRange;

pub mod csv_file;
pub mod postgres;

pub use csv_file::CsvReadingStore;
pub use postgres::PgReadingStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("query error: {0}")]
    Query(String),
    #[error("source error: {0}")]
    Source(String),
}

/// Read-only access to raw meter readings.
///
/// Implementations return readings ordered by consumer and then timestamp.
#[async_trait::async_trait]
pub trait ReadingStore: Send + Sync {
    async fn consumers(&self) -> Result<Vec<Consumer>, StoreError>;

    /// Readings of one consumer; `None` means the whole history.
    ///
    /// A bounded range also returns the `00:00` sample of `range.end()` since
    /// it closes the last hour of the range.
    async fn readings(&self, consumer_id: &str, range: Option<DateRange>) -> Result<Vec<MeterReading>, StoreError>;

    async fn all_readings(&self) -> Result<Vec<MeterReading>, StoreError>;
}

/// Pair every consumer with its readings, in consumer order.
///
/// Readings of consumers missing from `consumers` get a bare entry with no
/// name.
pub fn group_by_consumer(
    consumers: Vec<Consumer>,
    readings: Vec<MeterReading>,
) -> Vec<(Consumer, Vec<MeterReading>)> {
    let mut by_id: HashMap<String, Vec<MeterReading>> = HashMap::new();
    for reading in readings {
        by_id.entry(reading.consumer_id.clone()).or_default().push(reading);
    }

    let mut grouped: Vec<(Consumer, Vec<MeterReading>)> = consumers
        .into_iter()
        .map(|c| {
            let readings = by_id.remove(&c.consumer_id).unwrap_or_default();
            (c, readings)
        })
        .collect();

    let mut orphans: Vec<_> = by_id.into_iter().collect();
    orphans.sort_by(|a, b| a.0.cmp(&b.0));
    grouped.extend(orphans.into_iter().map(|(consumer_id, readings)| {
        (
            Consumer {
                consumer_id,
                short_name: None,
            },
            readings,
        )
    }));

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn reading(id: &str) -> MeterReading {
        MeterReading {
            consumer_id: id.to_string(),
            ts: datetime!(2025-10-01 00:30),
            wh_imp: 1.0,
        }
    }

    #[test]
    fn groups_readings_under_their_consumer() {
        let consumers = vec![
            Consumer { consumer_id: "a".to_string(), short_name: Some("A".to_string()) },
            Consumer { consumer_id: "b".to_string(), short_name: None },
        ];
        let readings = vec![reading("a"), reading("z"), reading("a")];

        let grouped = group_by_consumer(consumers, readings);

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0].0.consumer_id, "a");
        assert_eq!(grouped[0].1.len(), 2);
        assert!(grouped[1].1.is_empty());
        assert_eq!(grouped[2].0.consumer_id, "z");
        assert_eq!(grouped[2].0.short_name, None);
    }
}
