use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use time::{Date, Month, Weekday};

use crate::engine::hourly::{hour_label, HourlyConsumption};
use crate::error::AnalyticsError;

/// How hourly records are pre-summed before statistics are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// One value per hour of day (`"HH:00"`).
    Hour,
    /// One value per calendar day (`"YYYY-MM-DD"`).
    Day,
    /// One value per week of month (`"October Week-N"`, N = ceil(day / 7)).
    Week,
    /// One value per calendar month (`"January"`).
    Month,
    /// One value per year (`"2025"`).
    Year,
}

impl FromStr for Granularity {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(AnalyticsError::UnknownValue {
                kind: "granularity",
                value: s.to_string(),
            }),
        }
    }
}

/// Restricts records to a type of weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekdayFilter {
    #[default]
    All,
    MonFri,
    Sat,
    Sun,
}

impl WeekdayFilter {
    pub fn matches(self, date: Date) -> bool {
        match self {
            Self::All => true,
            Self::MonFri => !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday),
            Self::Sat => date.weekday() == Weekday::Saturday,
            Self::Sun => date.weekday() == Weekday::Sunday,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::MonFri => "Mon-Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }
}

impl FromStr for WeekdayFilter {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "All" | "all" => Ok(Self::All),
            "Mon-Fri" | "mon-fri" => Ok(Self::MonFri),
            "Sat" | "sat" => Ok(Self::Sat),
            "Sun" | "sun" => Ok(Self::Sun),
            _ => Err(AnalyticsError::UnknownValue {
                kind: "weekday type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extreme {
    pub key: String,
    pub value: f64,
}

/// Summary statistics over a grouped set of values.
///
/// With no values every statistic is `None`. When the mean is zero the
/// percentage fields are `None` rather than infinite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodAggregate {
    pub count: usize,
    pub sum: Option<f64>,
    pub mean: Option<f64>,
    pub high: Option<Extreme>,
    pub low: Option<Extreme>,
    pub percent_increase: Option<f64>,
    pub percent_decrease: Option<f64>,
}

/// Compute count/sum/mean/high/low over labeled values.
///
/// Ties for high and low go to the value that appears first.
pub fn rollup(values: &[LabeledValue]) -> PeriodAggregate {
    let Some(first) = values.first() else {
        return PeriodAggregate {
            count: 0,
            sum: None,
            mean: None,
            high: None,
            low: None,
            percent_increase: None,
            percent_decrease: None,
        };
    };

    let mut high = first;
    let mut low = first;
    let mut sum = 0.0;
    for v in values {
        if v.value > high.value {
            high = v;
        }
        if v.value < low.value {
            low = v;
        }
        sum += v.value;
    }

    let count = values.len();
    let mean = sum / count as f64;
    let (percent_increase, percent_decrease) = if mean == 0.0 {
        (None, None)
    } else {
        (
            Some((high.value - mean) / mean * 100.0),
            Some((mean - low.value) / mean * 100.0),
        )
    };

    PeriodAggregate {
        count,
        sum: Some(sum),
        mean: Some(mean),
        high: Some(Extreme {
            key: high.label.clone(),
            value: high.value,
        }),
        low: Some(Extreme {
            key: low.label.clone(),
            value: low.value,
        }),
        percent_increase,
        percent_decrease,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    Hour(u8),
    Day(Date),
    Week(i32, u8, u8),
    Month(i32, u8),
    Year(i32),
}

impl GroupKey {
    fn of(granularity: Granularity, record: &HourlyConsumption) -> Self {
        let date = record.date;
        match granularity {
            Granularity::Hour => Self::Hour(record.hour),
            Granularity::Day => Self::Day(date),
            Granularity::Week => Self::Week(date.year(), u8::from(date.month()), week_of_month(date)),
            Granularity::Month => Self::Month(date.year(), u8::from(date.month())),
            Granularity::Year => Self::Year(date.year()),
        }
    }

    fn label(self) -> String {
        match self {
            Self::Hour(hour) => hour_label(hour),
            Self::Day(date) => date.to_string(),
            Self::Week(_, month, n) => format!("{} Week-{n}", month_name(month)),
            Self::Month(_, month) => month_name(month),
            Self::Year(year) => year.to_string(),
        }
    }
}

fn month_name(month: u8) -> String {
    Month::try_from(month)
        .map(|m| m.to_string())
        .unwrap_or_else(|_| month.to_string())
}

/// Week of month as `ceil(day / 7)`, so days 29-31 form week 5.
pub fn week_of_month(date: Date) -> u8 {
    (date.day() + 6) / 7
}

/// Pre-sum hourly records into one labeled value per group.
///
/// Groups come out in chronological order (hour of day ascending for
/// [`Granularity::Hour`]); only groups with at least one record appear.
pub fn group_hourly<'a, I>(records: I, granularity: Granularity, filter: WeekdayFilter) -> Vec<LabeledValue>
where
    I: IntoIterator<Item = &'a HourlyConsumption>,
{
    let mut groups: BTreeMap<GroupKey, f64> = BTreeMap::new();
    for record in records {
        if !filter.matches(record.date) {
            continue;
        }
        *groups.entry(GroupKey::of(granularity, record)).or_insert(0.0) += record.kwh;
    }

    groups
        .into_iter()
        .map(|(key, value)| LabeledValue {
            label: key.label(),
            value,
        })
        .collect()
}

/// Mean kWh per hour of day over every matching record.
///
/// Hours that never occur are absent from the map.
pub fn hour_of_day_means<'a, I>(records: I, filter: WeekdayFilter) -> BTreeMap<u8, f64>
where
    I: IntoIterator<Item = &'a HourlyConsumption>,
{
    let mut acc: BTreeMap<u8, (f64, usize)> = BTreeMap::new();
    for record in records {
        if !filter.matches(record.date) {
            continue;
        }
        let entry = acc.entry(record.hour).or_insert((0.0, 0));
        entry.0 += record.kwh;
        entry.1 += 1;
    }

    acc.into_iter()
        .map(|(hour, (sum, n))| (hour, sum / n as f64))
        .collect()
}

/// Hour-of-day mean profiles for each weekday type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayProfiles {
    #[serde(rename = "Mon-Fri")]
    pub mon_fri: BTreeMap<String, f64>,
    #[serde(rename = "Sat")]
    pub sat: BTreeMap<String, f64>,
    #[serde(rename = "Sun")]
    pub sun: BTreeMap<String, f64>,
}

pub fn weekday_profiles(records: &[HourlyConsumption]) -> WeekdayProfiles {
    let labeled = |filter: WeekdayFilter| -> BTreeMap<String, f64> {
        hour_of_day_means(records, filter)
            .into_iter()
            .map(|(hour, mean)| (hour_label(hour), mean))
            .collect()
    };

    WeekdayProfiles {
        mon_fri: labeled(WeekdayFilter::MonFri),
        sat: labeled(WeekdayFilter::Sat),
        sun: labeled(WeekdayFilter::Sun),
    }
}
