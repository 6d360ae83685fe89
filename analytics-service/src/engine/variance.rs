//! High/low/average of hour-of-day profiles across the whole consumer
//! population.
//!
//! Each consumer's long-run mean per hour of day is rolled up into a
//! [`PeriodAggregate`]; the spread of the per-consumer percentage deviations
//! is then summarized for every weekday type.

use std::str::FromStr;

use meter_store::domain::Consumer;
use serde::Serialize;
use time::Month;

use crate::engine::hourly::{hour_label, DateRange, HourlyConsumption};
use crate::engine::rollup::{hour_of_day_means, rollup, LabeledValue, PeriodAggregate, WeekdayFilter};
use crate::error::AnalyticsError;

/// Period the population view is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarianceScope {
    /// Every reading on record.
    #[default]
    All,
    Year(i32),
    Month(i32, Month),
}

impl VarianceScope {
    /// `None` for the whole history.
    pub fn range(self) -> Result<Option<DateRange>, AnalyticsError> {
        match self {
            Self::All => Ok(None),
            Self::Year(year) => DateRange::year(year).map(Some),
            Self::Month(year, month) => DateRange::month(year, month).map(Some),
        }
    }
}

impl FromStr for VarianceScope {
    type Err = AnalyticsError;

    /// `all`, `YYYY` or `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnalyticsError::UnknownValue {
            kind: "variance scope",
            value: s.to_string(),
        };

        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match s.split_once('-') {
            None => s.parse().map(Self::Year).map_err(|_| invalid()),
            Some((year, month)) => {
                let year: i32 = year.parse().map_err(|_| invalid())?;
                let month: u8 = month.parse().map_err(|_| invalid())?;
                let month = Month::try_from(month).map_err(|_| invalid())?;
                Ok(Self::Month(year, month))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerVariance {
    pub consumer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub aggregate: PeriodAggregate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpreadStats {
    pub highest: Option<f64>,
    pub lowest: Option<f64>,
    pub average: Option<f64>,
}

impl SpreadStats {
    fn of<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut highest: Option<f64> = None;
        let mut lowest: Option<f64> = None;
        let mut sum = 0.0;
        let mut n = 0usize;
        for v in values {
            highest = Some(highest.map_or(v, |h| h.max(v)));
            lowest = Some(lowest.map_or(v, |l| l.min(v)));
            sum += v;
            n += 1;
        }

        Self {
            highest,
            lowest,
            average: (n > 0).then(|| sum / n as f64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayVariance {
    pub consumers: Vec<ConsumerVariance>,
    pub percent_increase_stats: SpreadStats,
    pub percent_decrease_stats: SpreadStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationVariance {
    #[serde(rename = "All")]
    pub all: WeekdayVariance,
    #[serde(rename = "Mon-Fri")]
    pub mon_fri: WeekdayVariance,
    #[serde(rename = "Sat")]
    pub sat: WeekdayVariance,
    #[serde(rename = "Sun")]
    pub sun: WeekdayVariance,
}

/// Roll up one consumer's hour-of-day means.
///
/// Only hours observed on matching days take part; with none the aggregate
/// is empty.
pub fn hour_of_day_rollup(records: &[HourlyConsumption], filter: WeekdayFilter) -> PeriodAggregate {
    let values: Vec<LabeledValue> = hour_of_day_means(records, filter)
        .into_iter()
        .map(|(hour, mean)| LabeledValue {
            label: hour_label(hour),
            value: mean,
        })
        .collect();
    rollup(&values)
}

/// Per-consumer rollups for one weekday type and the spread of their
/// percentage deviations.
///
/// Consumers with no matching hour are left out. Consumers whose mean is
/// zero are listed but do not count towards the spread.
pub fn weekday_variance(population: &[(Consumer, Vec<HourlyConsumption>)], filter: WeekdayFilter) -> WeekdayVariance {
    let consumers: Vec<ConsumerVariance> = population
        .iter()
        .filter_map(|(consumer, records)| {
            let aggregate = hour_of_day_rollup(records, filter);
            (aggregate.count > 0).then(|| ConsumerVariance {
                consumer_id: consumer.consumer_id.clone(),
                name: consumer.short_name.clone(),
                aggregate,
            })
        })
        .collect();

    WeekdayVariance {
        percent_increase_stats: SpreadStats::of(consumers.iter().filter_map(|c| c.aggregate.percent_increase)),
        percent_decrease_stats: SpreadStats::of(consumers.iter().filter_map(|c| c.aggregate.percent_decrease)),
        consumers,
    }
}

pub fn population_variance(population: &[(Consumer, Vec<HourlyConsumption>)]) -> PopulationVariance {
    PopulationVariance {
        all: weekday_variance(population, WeekdayFilter::All),
        mon_fri: weekday_variance(population, WeekdayFilter::MonFri),
        sat: weekday_variance(population, WeekdayFilter::Sat),
        sun: weekday_variance(population, WeekdayFilter::Sun),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use time::Date;

    fn consumer(id: &str) -> Consumer {
        Consumer {
            consumer_id: id.to_string(),
            short_name: None,
        }
    }

    /// One day of records, `kwh(hour)` each.
    fn day(date: Date, kwh: impl Fn(u8) -> f64) -> Vec<HourlyConsumption> {
        (0u8..24).map(|hour| HourlyConsumption { date, hour, kwh: kwh(hour) }).collect()
    }

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn parses_scopes() {
        assert_eq!("all".parse::<VarianceScope>().unwrap(), VarianceScope::All);
        assert_eq!("2025".parse::<VarianceScope>().unwrap(), VarianceScope::Year(2025));
        assert_eq!(
            "2025-10".parse::<VarianceScope>().unwrap(),
            VarianceScope::Month(2025, Month::October)
        );
        for bad in ["2025-13", "last-year", ""] {
            assert!(matches!(
                bad.parse::<VarianceScope>(),
                Err(AnalyticsError::UnknownValue { .. })
            ));
        }
    }

    #[test]
    fn scope_ranges() {
        assert_eq!(VarianceScope::All.range().unwrap(), None);
        let month = VarianceScope::Month(2025, Month::February).range().unwrap().unwrap();
        assert_eq!(month.start(), date!(2025-02-01));
        assert_eq!(month.end(), date!(2025-03-01));
    }

    #[test]
    fn hour_of_day_rollup_finds_peak_hour() {
        // 2025-10-13 is a Monday, 2025-10-14 a Tuesday
        let mut records = day(date!(2025-10-13), |h| if h == 18 { 5.0 } else { 1.0 });
        records.extend(day(date!(2025-10-14), |h| if h == 18 { 3.0 } else { 1.0 }));

        let agg = hour_of_day_rollup(&records, WeekdayFilter::All);

        assert_eq!(agg.count, 24);
        assert_eq!(agg.high.as_ref().unwrap().key, "18:00");
        assert_eq!(agg.high.as_ref().unwrap().value, 4.0);
        assert_eq!(agg.low.as_ref().unwrap().key, "00:00");
        assert!(close(agg.mean, 27.0 / 24.0));
    }

    #[test]
    fn spread_summarizes_consumers() {
        // 2025-10-13 is a Monday
        let monday = date!(2025-10-13);
        let population = vec![
            (consumer("flat"), day(monday, |_| 2.0)),
            (consumer("peaky"), day(monday, |h| if h == 12 { 25.0 } else { 1.0 })),
            (consumer("idle"), day(monday, |_| 0.0)),
        ];

        let report = population_variance(&population);

        let all = &report.all;
        assert_eq!(all.consumers.len(), 3);
        // flat deviates by 0%, peaky by (25 - 2) / 2 = 1150%
        assert!(close(all.percent_increase_stats.lowest, 0.0));
        assert!(close(all.percent_increase_stats.highest, 1150.0));
        assert!(close(all.percent_increase_stats.average, 575.0));
        assert!(close(all.percent_decrease_stats.highest, 50.0));

        assert_eq!(report.mon_fri.consumers.len(), 3);
        assert!(report.sat.consumers.is_empty());
        assert_eq!(report.sat.percent_increase_stats.average, None);
    }

    #[test]
    fn weekday_types_split_days() {
        // 2025-10-11 is a Saturday, 2025-10-12 a Sunday
        let mut records = day(date!(2025-10-11), |_| 1.0);
        records.extend(day(date!(2025-10-12), |h| if h < 12 { 3.0 } else { 1.0 }));
        let population = vec![(consumer("weekend"), records)];

        let report = population_variance(&population);

        assert!(close(report.sat.percent_increase_stats.highest, 0.0));
        assert!(close(report.sun.percent_increase_stats.highest, 50.0));
        assert!(report.mon_fri.consumers.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("Mon-Fri").is_some());
        assert_eq!(json["Sun"]["consumers"][0]["consumerId"], "weekend");
        assert!(json["Sun"]["percentIncreaseStats"]["highest"].is_number());
    }
}
