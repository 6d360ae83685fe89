use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::hourly::HourlyConsumption;
use crate::error::AnalyticsError;

/// A named tariff period covering the local hours `[start_hour, end_hour)`.
///
/// `end_hour` may be 24. A window whose end is before its start wraps past
/// midnight, e.g. `22..6`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffWindow {
    pub start_hour: u8,
    pub end_hour: u8,
    pub bucket: String,
}

impl TariffWindow {
    pub fn new(start_hour: u8, end_hour: u8, bucket: &str) -> Self {
        Self {
            start_hour,
            end_hour,
            bucket: bucket.to_string(),
        }
    }

    fn hours(&self) -> Result<Vec<u8>, AnalyticsError> {
        let (start, end) = (self.start_hour, self.end_hour);
        if start > 23 || end > 24 || start == end || self.bucket.trim().is_empty() {
            return Err(AnalyticsError::TariffWindowRange {
                bucket: self.bucket.clone(),
                start,
                end,
            });
        }

        Ok(if start < end {
            (start..end).collect()
        } else {
            (start..24).chain(0..end).collect()
        })
    }
}

/// Bucket windows plus the energy rate of each bucket in rupees per kWh.
///
/// Buckets without a rate are charged nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffConfig {
    pub windows: Vec<TariffWindow>,
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
}

impl Default for TariffConfig {
    fn default() -> Self {
        // peak hours at 125% and off-peak at 95% of the normal rate
        let rates = [("Normal", 7.5), ("Peak-1", 9.375), ("Peak-2", 9.375), ("Off-Peak", 7.125)]
            .into_iter()
            .map(|(bucket, rate)| (bucket.to_string(), rate))
            .collect();

        Self {
            windows: vec![
                TariffWindow::new(0, 6, "Off-Peak"),
                TariffWindow::new(6, 10, "Peak-1"),
                TariffWindow::new(10, 15, "Off-Peak"),
                TariffWindow::new(15, 18, "Normal"),
                TariffWindow::new(18, 22, "Peak-2"),
                TariffWindow::new(22, 24, "Normal"),
            ],
            rates,
        }
    }
}

impl TariffConfig {
    /// Windows only, every bucket charged at zero.
    pub fn unpriced(windows: Vec<TariffWindow>) -> Self {
        Self {
            windows,
            rates: BTreeMap::new(),
        }
    }
}

/// Validated hour-of-day to tariff bucket mapping.
///
/// Construction guarantees that every hour 0-23 belongs to exactly one
/// window, so [`TariffTable::bucket_for`] is total over the day.
#[derive(Debug, Clone)]
pub struct TariffTable {
    buckets: Vec<String>,
    rates: Vec<f64>,
    by_hour: [usize; 24],
}

impl TariffTable {
    pub fn new(config: &TariffConfig) -> Result<Self, AnalyticsError> {
        let mut buckets: Vec<String> = Vec::new();
        let mut assigned: [Option<usize>; 24] = [None; 24];

        for window in &config.windows {
            let idx = match buckets.iter().position(|b| *b == window.bucket) {
                Some(idx) => idx,
                None => {
                    buckets.push(window.bucket.clone());
                    buckets.len() - 1
                }
            };

            for hour in window.hours()? {
                let slot = &mut assigned[usize::from(hour)];
                if slot.is_some() {
                    return Err(AnalyticsError::TariffOverlap(hour));
                }
                *slot = Some(idx);
            }
        }

        let mut by_hour = [0usize; 24];
        for (hour, slot) in assigned.iter().enumerate() {
            // hour < 24, the cast cannot truncate
            by_hour[hour] = slot.ok_or(AnalyticsError::TariffGap(hour as u8))?;
        }

        for (bucket, rate) in &config.rates {
            if !buckets.contains(bucket) {
                return Err(AnalyticsError::UnknownValue {
                    kind: "tariff bucket",
                    value: bucket.clone(),
                });
            }
            if !rate.is_finite() || *rate < 0.0 {
                return Err(AnalyticsError::InvalidParameter(format!(
                    "rate of tariff bucket '{bucket}' must be a non-negative number, got {rate}"
                )));
            }
        }
        let rates = buckets
            .iter()
            .map(|b| config.rates.get(b).copied().unwrap_or(0.0))
            .collect();

        Ok(Self { buckets, rates, by_hour })
    }

    /// Bucket names in the order they first appear in the configuration.
    pub fn buckets(&self) -> &[String] {
        &self.buckets
    }

    /// Bucket of a local hour, `None` for hours outside 0-23.
    pub fn bucket_for(&self, hour: u8) -> Option<&str> {
        self.by_hour
            .get(usize::from(hour))
            .map(|idx| self.buckets[*idx].as_str())
    }

    /// Rate in rupees per kWh of a local hour, `None` for hours outside 0-23.
    pub fn rate_for(&self, hour: u8) -> Option<f64> {
        self.by_hour.get(usize::from(hour)).map(|idx| self.rates[*idx])
    }

    /// Cost of `kwh` consumed during `hour`.
    pub fn cost(&self, hour: u8, kwh: f64) -> f64 {
        self.rate_for(hour).unwrap_or(0.0) * kwh
    }

    pub fn empty_totals(&self) -> BucketTotals {
        BucketTotals {
            total_kwh: 0.0,
            total_cost: 0.0,
            buckets: self
                .buckets
                .iter()
                .map(|name| BucketTotal {
                    bucket: name.clone(),
                    kwh: 0.0,
                    cost: 0.0,
                })
                .collect(),
        }
    }

    /// Add one hourly record into its bucket and the running totals.
    pub fn add(&self, totals: &mut BucketTotals, record: &HourlyConsumption) {
        if let Some(idx) = self.by_hour.get(usize::from(record.hour)) {
            if let Some(bucket) = totals.buckets.get_mut(*idx) {
                let cost = self.rates[*idx] * record.kwh;
                bucket.kwh += record.kwh;
                bucket.cost += cost;
                totals.total_kwh += record.kwh;
                totals.total_cost += cost;
            }
        }
    }

    /// Sum a sequence of hourly records into per-bucket totals.
    pub fn accumulate<'a, I>(&self, records: I) -> BucketTotals
    where
        I: IntoIterator<Item = &'a HourlyConsumption>,
    {
        let mut totals = self.empty_totals();
        for record in records {
            self.add(&mut totals, record);
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketTotal {
    pub bucket: String,
    pub kwh: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketTotals {
    pub total_kwh: f64,
    pub total_cost: f64,
    pub buckets: Vec<BucketTotal>,
}

impl BucketTotals {
    /// kWh of a bucket.
    pub fn get(&self, bucket: &str) -> Option<f64> {
        self.buckets.iter().find(|b| b.bucket == bucket).map(|b| b.kwh)
    }

    pub fn cost_of(&self, bucket: &str) -> Option<f64> {
        self.buckets.iter().find(|b| b.bucket == bucket).map(|b| b.cost)
    }
}
