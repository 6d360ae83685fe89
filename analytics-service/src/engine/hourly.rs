use std::collections::{BTreeMap, HashMap};

use meter_store::domain::MeterReading;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, PrimitiveDateTime};

use crate::error::AnalyticsError;

/// How an hour is resolved when its paired half-hourly samples are missing.
///
/// The hour `H` is made of the samples at `H:30` and `(H+1):00`. When both are
/// absent the hour is always dropped; the policies only differ when exactly
/// one of them is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSamplePolicy {
    /// The absent sample counts as zero consumption.
    #[default]
    ZeroFillSingle,
    /// The hour is dropped unless both samples are present.
    RequireBoth,
}

impl MissingSamplePolicy {
    /// Combined watt-hours for the pair, or `None` when the hour is dropped.
    pub fn resolve(self, first: Option<f64>, second: Option<f64>) -> Option<f64> {
        match (self, first, second) {
            (_, None, None) => None,
            (Self::RequireBoth, Some(a), Some(b)) => Some(a + b),
            (Self::RequireBoth, _, _) => None,
            (Self::ZeroFillSingle, a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
        }
    }
}

/// Half-open range of local calendar days `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, AnalyticsError> {
        if end < start {
            return Err(AnalyticsError::InvalidParameter(format!(
                "date range ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn day(date: Date) -> Self {
        Self {
            start: date,
            end: date + Duration::days(1),
        }
    }

    /// Monday to Sunday of the ISO week containing `date`.
    pub fn iso_week(date: Date) -> Self {
        let monday = date - Duration::days(i64::from(date.weekday().number_days_from_monday()));
        Self {
            start: monday,
            end: monday + Duration::days(7),
        }
    }

    pub fn month(year: i32, month: Month) -> Result<Self, AnalyticsError> {
        let start = first_of_month(year, month)?;
        let end = if month == Month::December {
            first_of_month(year + 1, Month::January)?
        } else {
            first_of_month(year, month.next())?
        };
        Ok(Self { start, end })
    }

    pub fn year(year: i32) -> Result<Self, AnalyticsError> {
        Ok(Self {
            start: first_of_month(year, Month::January)?,
            end: first_of_month(year + 1, Month::January)?,
        })
    }

    /// Smallest range holding every hour the readings contribute to; `None`
    /// when there are none.
    ///
    /// A sample belongs to the hour that starts 30 minutes before it, so a
    /// `00:00` sample counts towards hour 23 of the previous day.
    pub fn covering(readings: &[MeterReading]) -> Option<Self> {
        let hour_dates = readings.iter().map(|r| (r.ts - Duration::minutes(30)).date());
        let first = hour_dates.clone().min()?;
        let last = hour_dates.max()?;
        Some(Self {
            start: first,
            end: last + Duration::days(1),
        })
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date < self.end
    }

    pub fn days(&self) -> impl Iterator<Item = Date> {
        let end = self.end;
        std::iter::successors(Some(self.start), |d| d.next_day()).take_while(move |d| *d < end)
    }
}

fn first_of_month(year: i32, month: Month) -> Result<Date, AnalyticsError> {
    Date::from_calendar_date(year, month, 1)
        .map_err(|e| AnalyticsError::InvalidParameter(format!("invalid month {year}-{month}: {e}")))
}

/// Consumption of one consumer during one local hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyConsumption {
    pub date: Date,
    pub hour: u8,
    pub kwh: f64,
}

/// Lazily walks a date range hour by hour and pairs up the half-hourly samples.
///
/// Produced by [`derive_hourly`]; it owns its sample index and is consumed as
/// it is iterated.
#[derive(Debug)]
pub struct HourlySeries {
    samples: HashMap<PrimitiveDateTime, f64>,
    policy: MissingSamplePolicy,
    current: Option<Date>,
    end: Date,
    hour: u8,
}

impl Iterator for HourlySeries {
    type Item = HourlyConsumption;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let date = self.current.filter(|d| *d < self.end)?;
            let hour = self.hour;

            if hour == 23 {
                self.hour = 0;
                self.current = date.next_day();
            } else {
                self.hour += 1;
            }

            let midnight = date.midnight();
            let half_past = midnight + Duration::minutes(i64::from(hour) * 60 + 30);
            // hour 23 closes on the next calendar day
            let closing = midnight + Duration::hours(i64::from(hour) + 1);

            let first = self.samples.get(&half_past).copied();
            let second = self.samples.get(&closing).copied();

            if let Some(wh) = self.policy.resolve(first, second) {
                return Some(HourlyConsumption {
                    date,
                    hour,
                    kwh: wh / 1000.0,
                });
            }
        }
    }
}

/// Turn raw half-hourly samples into hourly kWh for every day in `range`.
///
/// Samples are looked up by their exact local timestamp; when the same
/// timestamp appears more than once the last one wins. Hours are emitted in
/// chronological order and only when `policy` resolves them.
pub fn derive_hourly(
    readings: &[MeterReading],
    range: DateRange,
    policy: MissingSamplePolicy,
) -> HourlySeries {
    let samples: HashMap<PrimitiveDateTime, f64> =
        readings.iter().map(|r| (r.ts, r.wh_imp)).collect();

    let current = if samples.is_empty() {
        None
    } else {
        Some(range.start)
    };

    HourlySeries {
        samples,
        policy,
        current,
        end: range.end,
        hour: 0,
    }
}

/// The 24 hourly slots of one day, `None` where the hour was dropped.
pub type DayProfile = [Option<f64>; 24];

/// Group hourly records by calendar day.
pub fn daily_profiles<'a, I>(records: I) -> BTreeMap<Date, DayProfile>
where
    I: IntoIterator<Item = &'a HourlyConsumption>,
{
    let mut days: BTreeMap<Date, DayProfile> = BTreeMap::new();
    for record in records {
        let slots = days.entry(record.date).or_insert([None; 24]);
        if let Some(slot) = slots.get_mut(usize::from(record.hour)) {
            *slot = Some(slot.unwrap_or(0.0) + record.kwh);
        }
    }
    days
}

/// Replace dropped hours with zero.
pub fn zero_filled(profile: &DayProfile) -> [f64; 24] {
    profile.map(|v| v.unwrap_or(0.0))
}

/// `"HH:00"` label for an hour of the day.
pub fn hour_label(hour: u8) -> String {
    format!("{hour:02}:00")
}
