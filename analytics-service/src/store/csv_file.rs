use std::{fs::File, io::Read, path::Path};

use csv::StringRecord;
use meter_store::domain::{Consumer, MeterReading};
use time::{macros::format_description, Duration, PrimitiveDateTime};

use super::{ReadingStore, StoreError};
use crate::engine::hourly::DateRange;

/// In-memory [`ReadingStore`] loaded from a CSV export of the readings table.
///
/// Expected header columns (by name):
/// - scno
/// - short_name (optional)
/// - ts (local `YYYY-MM-DD HH:MM:SS`)
/// - wh_imp
#[derive(Debug, Clone, Default)]
pub struct CsvReadingStore {
    consumers: Vec<Consumer>,
    readings: Vec<MeterReading>,
}

impl CsvReadingStore {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let file = File::open(path.as_ref())
            .map_err(|e| StoreError::Source(format!("failed to open CSV file: {e}")))?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| StoreError::Source(format!("failed to read CSV headers: {e}")))?
            .clone();

        let mut consumers: Vec<Consumer> = Vec::new();
        let mut readings = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| StoreError::Source(format!("failed to read CSV record: {e}")))?;
            let (consumer, reading) = match record_to_reading(&record, &headers) {
                Ok(parsed) => parsed,
                Err(e) => {
                    metrics::counter!("csv_reading_parse_errors_total").increment(1);
                    return Err(e);
                }
            };

            match consumers.iter_mut().find(|c| c.consumer_id == consumer.consumer_id) {
                Some(known) if known.short_name.is_none() => known.short_name = consumer.short_name,
                Some(_) => {}
                None => consumers.push(consumer),
            }
            readings.push(reading);
        }

        consumers.sort_by(|a, b| a.consumer_id.cmp(&b.consumer_id));
        readings.sort_by(|a, b| a.consumer_id.cmp(&b.consumer_id).then(a.ts.cmp(&b.ts)));

        tracing::info!(consumers = consumers.len(), readings = readings.len(), "CSV readings loaded");

        Ok(Self { consumers, readings })
    }
}

fn parse_optional_string(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn record_to_reading(record: &StringRecord, headers: &StringRecord) -> Result<(Consumer, MeterReading), StoreError> {
    let get = |name: &str| -> Result<&str, StoreError> {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| record.get(idx))
            .ok_or_else(|| StoreError::Source(format!("missing column '{name}' in CSV record")))
    };

    let consumer_id = get("scno")?.trim().to_string();
    let short_name = get("short_name").ok().and_then(parse_optional_string);

    let ts_str = get("ts")?;
    let ts = PrimitiveDateTime::parse(
        ts_str.trim(),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .map_err(|e| StoreError::Source(format!("invalid ts '{ts_str}': {e}")))?;

    let wh_str = get("wh_imp")?;
    let wh_imp: f64 = wh_str
        .trim()
        .parse()
        .map_err(|e| StoreError::Source(format!("invalid wh_imp '{wh_str}': {e}")))?;

    Ok((
        Consumer {
            consumer_id: consumer_id.clone(),
            short_name,
        },
        MeterReading {
            consumer_id,
            ts,
            wh_imp,
        },
    ))
}

#[async_trait::async_trait]
impl ReadingStore for CsvReadingStore {
    async fn consumers(&self) -> Result<Vec<Consumer>, StoreError> {
        Ok(self.consumers.clone())
    }

    async fn readings(&self, consumer_id: &str, range: Option<DateRange>) -> Result<Vec<MeterReading>, StoreError> {
        let bounds = range.map(|r| (r.start().midnight(), r.end().midnight() + Duration::minutes(30)));

        Ok(self
            .readings
            .iter()
            .filter(|r| r.consumer_id == consumer_id)
            .filter(|r| bounds.map_or(true, |(lower, upper)| lower <= r.ts && r.ts < upper))
            .cloned()
            .collect())
    }

    async fn all_readings(&self) -> Result<Vec<MeterReading>, StoreError> {
        Ok(self.readings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    const SAMPLE: &str = "\
scno,short_name,ts,wh_imp
B-2,,2025-10-01 00:30:00,100
A-1,Mill,2025-10-01 01:00:00,150
A-1,Mill,2025-10-01 00:30:00,100
A-1,Mill,2025-10-02 00:00:00,80
A-1,Mill,2025-10-02 00:30:00,90
B-2,Bakery,2025-10-01 01:00:00,50
";

    #[tokio::test]
    async fn loads_and_sorts_readings() {
        let store = CsvReadingStore::from_reader(SAMPLE.as_bytes()).unwrap();

        let consumers = store.consumers().await.unwrap();
        assert_eq!(consumers.len(), 2);
        assert_eq!(consumers[0].consumer_id, "A-1");
        assert_eq!(consumers[1].short_name.as_deref(), Some("Bakery"));

        let readings = store.readings("A-1", None).await.unwrap();
        assert_eq!(readings.len(), 4);
        assert_eq!(readings[0].ts, datetime!(2025-10-01 00:30));
        assert_eq!(readings[1].wh_imp, 150.0);
    }

    #[tokio::test]
    async fn range_includes_closing_midnight_sample() {
        let store = CsvReadingStore::from_reader(SAMPLE.as_bytes()).unwrap();

        let readings = store
            .readings("A-1", Some(DateRange::day(date!(2025-10-01))))
            .await
            .unwrap();

        let stamps: Vec<_> = readings.iter().map(|r| r.ts).collect();
        assert_eq!(
            stamps,
            vec![
                datetime!(2025-10-01 00:30),
                datetime!(2025-10-01 01:00),
                datetime!(2025-10-02 00:00),
            ]
        );
    }

    #[test]
    fn rejects_malformed_rows() {
        let bad_ts = "scno,ts,wh_imp\nA-1,yesterday,10\n";
        assert!(matches!(
            CsvReadingStore::from_reader(bad_ts.as_bytes()),
            Err(StoreError::Source(_))
        ));

        let missing_column = "scno,ts\nA-1,2025-10-01 00:30:00\n";
        assert!(matches!(
            CsvReadingStore::from_reader(missing_column.as_bytes()),
            Err(StoreError::Source(_))
        ));
    }
}
