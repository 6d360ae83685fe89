pub mod hourly;
pub mod pattern;
pub mod peak_variance;
pub mod ranking;
pub mod rollup;
pub mod tariff;
pub mod variance;

use std::collections::BTreeMap;
use std::str::FromStr;

use meter_store::domain::{Consumer, MeterReading};
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::error::AnalyticsError;
use hourly::{daily_profiles, derive_hourly, hour_label, DateRange, HourlyConsumption, MissingSamplePolicy};
use pattern::{ConsumerPatternSummary, PatternClassifier, PatternConfig};
use peak_variance::{peak_variance, PeakVarianceConfig};
use ranking::{rank, ConsumerRankEntry, GroupFilter, ScoredConsumer, SortDirection};
use rollup::{
    group_hourly, hour_of_day_means, rollup, week_of_month, weekday_profiles, Granularity, LabeledValue,
    PeriodAggregate, WeekdayFilter, WeekdayProfiles,
};
use tariff::{BucketTotals, TariffConfig, TariffTable};
use variance::{population_variance, PopulationVariance, VarianceScope};

/// Scalar used to rank consumers against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    /// Mean hourly kWh divided by the highest hourly kWh.
    #[default]
    LoadFactor,
    /// Share of kWh falling in buckets whose name starts with `Peak`.
    PeakShare,
    TotalKwh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub metric: RankMetric,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub missing_samples: MissingSamplePolicy,
    pub tariff: TariffConfig,
    pub pattern: PatternConfig,
    pub peak_variance: PeakVarianceConfig,
    pub ranking: RankingConfig,
}

/// Period of a high/low/average view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollupView {
    Day,
    Week,
    Month,
    Year,
}

impl RollupView {
    /// Calendar days the view covers around `date`.
    pub fn range(self, date: Date) -> Result<DateRange, AnalyticsError> {
        match self {
            Self::Day => Ok(DateRange::day(date)),
            Self::Week => Ok(DateRange::iso_week(date)),
            Self::Month => DateRange::month(date.year(), date.month()),
            Self::Year => DateRange::year(date.year()),
        }
    }

    fn default_granularity(self) -> Granularity {
        match self {
            Self::Day => Granularity::Hour,
            Self::Week | Self::Month => Granularity::Day,
            Self::Year => Granularity::Month,
        }
    }
}

impl FromStr for RollupView {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(AnalyticsError::UnknownValue {
                kind: "view",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedHour {
    pub hour: String,
    pub bucket: String,
    pub rate: f64,
    pub kwh: Option<f64>,
    pub cost: Option<f64>,
}

/// kWh and cost summed per hour of day over a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourOfDayTotal {
    pub hour: String,
    pub bucket: String,
    pub total_kwh: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBuckets {
    pub label: String,
    #[serde(flatten)]
    pub totals: BucketTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupReport {
    pub start: Date,
    pub end: Date,
    pub values: Vec<LabeledValue>,
    #[serde(flatten)]
    pub aggregate: PeriodAggregate,
}

/// Validated engine: every computation the API exposes, over readings that
/// were already fetched for one request.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    missing_samples: MissingSamplePolicy,
    tariffs: TariffTable,
    patterns: PatternClassifier,
    peak_variance: PeakVarianceConfig,
    ranking: RankingConfig,
}

impl AnalyticsEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, AnalyticsError> {
        let tariffs = TariffTable::new(&config.tariff)?;
        let patterns = PatternClassifier::new(config.pattern)?;
        config.peak_variance.validate()?;

        tracing::info!(
            buckets = ?tariffs.buckets(),
            flatness = ?config.pattern.flatness,
            dominance = ?config.pattern.dominance,
            missing_samples = ?config.missing_samples,
            "analytics engine configured"
        );

        Ok(Self {
            missing_samples: config.missing_samples,
            tariffs,
            patterns,
            peak_variance: config.peak_variance.clone(),
            ranking: config.ranking,
        })
    }

    pub fn tariffs(&self) -> &TariffTable {
        &self.tariffs
    }

    pub fn hourly(&self, readings: &[MeterReading], range: DateRange) -> Vec<HourlyConsumption> {
        derive_hourly(readings, range, self.missing_samples).collect()
    }

    /// Hourly records over the whole span covered by `readings`.
    pub fn history(&self, readings: &[MeterReading]) -> Vec<HourlyConsumption> {
        match DateRange::covering(readings) {
            Some(range) => self.hourly(readings, range),
            None => Vec::new(),
        }
    }

    /// The 24 hours of one day with their tariff bucket; dropped hours have no kWh.
    pub fn hourly_with_tariff(&self, readings: &[MeterReading], date: Date) -> Vec<TaggedHour> {
        let mut kwh: [Option<f64>; 24] = [None; 24];
        for record in derive_hourly(readings, DateRange::day(date), self.missing_samples) {
            kwh[usize::from(record.hour)] = Some(record.kwh);
        }

        (0u8..24)
            .map(|hour| {
                let kwh = kwh[usize::from(hour)];
                TaggedHour {
                    hour: hour_label(hour),
                    bucket: self.tariffs.bucket_for(hour).unwrap_or_default().to_string(),
                    rate: self.tariffs.rate_for(hour).unwrap_or_default(),
                    kwh,
                    cost: kwh.map(|k| self.tariffs.cost(hour, k)),
                }
            })
            .collect()
    }

    /// kWh and cost of each hour of day summed over the period of `view`
    /// that contains `date`; hours without consumption are zero.
    pub fn hour_of_day_totals(
        &self,
        readings: &[MeterReading],
        view: RollupView,
        date: Date,
    ) -> Result<Vec<HourOfDayTotal>, AnalyticsError> {
        let mut totals: Vec<HourOfDayTotal> = (0u8..24)
            .map(|hour| HourOfDayTotal {
                hour: hour_label(hour),
                bucket: self.tariffs.bucket_for(hour).unwrap_or_default().to_string(),
                total_kwh: 0.0,
                cost: 0.0,
            })
            .collect();

        for record in derive_hourly(readings, view.range(date)?, self.missing_samples) {
            if let Some(total) = totals.get_mut(usize::from(record.hour)) {
                total.total_kwh += record.kwh;
                total.cost += self.tariffs.cost(record.hour, record.kwh);
            }
        }
        Ok(totals)
    }

    /// Tariff totals for every `Week-N` of a month, empty weeks included.
    pub fn weekly_tariff(
        &self,
        readings: &[MeterReading],
        year: i32,
        month: Month,
    ) -> Result<Vec<PeriodBuckets>, AnalyticsError> {
        let range = DateRange::month(year, month)?;
        let weeks = range.days().map(week_of_month).max().unwrap_or(0);

        let mut periods: Vec<PeriodBuckets> = (1..=weeks)
            .map(|n| PeriodBuckets {
                label: format!("Week-{n}"),
                totals: self.tariffs.empty_totals(),
            })
            .collect();

        for record in derive_hourly(readings, range, self.missing_samples) {
            let idx = usize::from(week_of_month(record.date)) - 1;
            if let Some(period) = periods.get_mut(idx) {
                self.tariffs.add(&mut period.totals, &record);
            }
        }
        Ok(periods)
    }

    /// Tariff totals for every calendar month of a year, empty months included.
    pub fn monthly_tariff(&self, readings: &[MeterReading], year: i32) -> Result<Vec<PeriodBuckets>, AnalyticsError> {
        let range = DateRange::year(year)?;

        let mut periods: Vec<PeriodBuckets> = std::iter::successors(Some(Month::January), |m| {
            (*m != Month::December).then(|| m.next())
        })
        .map(|m| PeriodBuckets {
            label: m.to_string(),
            totals: self.tariffs.empty_totals(),
        })
        .collect();

        for record in derive_hourly(readings, range, self.missing_samples) {
            let idx = usize::from(u8::from(record.date.month())) - 1;
            if let Some(period) = periods.get_mut(idx) {
                self.tariffs.add(&mut period.totals, &record);
            }
        }
        Ok(periods)
    }

    /// High/low/average over the period of `view` that contains `date`.
    pub fn rollup_view(
        &self,
        readings: &[MeterReading],
        view: RollupView,
        date: Date,
        granularity: Option<Granularity>,
        filter: WeekdayFilter,
    ) -> Result<RollupReport, AnalyticsError> {
        let range = view.range(date)?;
        let granularity = granularity.unwrap_or_else(|| view.default_granularity());

        let records = self.hourly(readings, range);
        let values = group_hourly(&records, granularity, filter);
        let aggregate = rollup(&values);

        Ok(RollupReport {
            start: range.start(),
            end: range.end(),
            values,
            aggregate,
        })
    }

    /// Hour-of-day mean kWh per weekday type over one month.
    pub fn weekday_profiles(
        &self,
        readings: &[MeterReading],
        year: i32,
        month: Month,
    ) -> Result<WeekdayProfiles, AnalyticsError> {
        let records = self.hourly(readings, DateRange::month(year, month)?);
        Ok(weekday_profiles(&records))
    }

    /// Percentage change between the configured hour pairs, from whole-history
    /// hourly averages.
    pub fn peak_variance(&self, readings: &[MeterReading]) -> BTreeMap<String, f64> {
        let records = self.history(readings);
        let averages = hour_of_day_means(&records, WeekdayFilter::All);
        peak_variance(&averages, &self.peak_variance.pairs)
    }

    pub fn pattern_summary(&self, readings: &[MeterReading]) -> ConsumerPatternSummary {
        let records = self.history(readings);
        let summary = self.patterns.summarize(&daily_profiles(&records));
        metrics::counter!("analytics_days_classified_total").increment(summary.days_observed as u64);
        summary
    }

    pub fn metric_score(&self, records: &[HourlyConsumption]) -> Option<f64> {
        if records.is_empty() {
            return None;
        }

        match self.ranking.metric {
            RankMetric::LoadFactor => {
                let max = records.iter().map(|r| r.kwh).fold(f64::MIN, f64::max);
                let mean = records.iter().map(|r| r.kwh).sum::<f64>() / records.len() as f64;
                (max > 0.0).then(|| mean / max)
            }
            RankMetric::PeakShare => {
                let totals = self.tariffs.accumulate(records);
                let peak: f64 = totals
                    .buckets
                    .iter()
                    .filter(|b| b.bucket.starts_with("Peak"))
                    .map(|b| b.kwh)
                    .sum();
                (totals.total_kwh > 0.0).then(|| peak / totals.total_kwh)
            }
            RankMetric::TotalKwh => Some(records.iter().map(|r| r.kwh).sum()),
        }
    }

    /// Hour-of-day high/low/average of every consumer over `scope`, per
    /// weekday type.
    pub fn population_variance(
        &self,
        population: Vec<(Consumer, Vec<MeterReading>)>,
        scope: VarianceScope,
    ) -> Result<PopulationVariance, AnalyticsError> {
        let range = scope.range()?;
        let hourly: Vec<(Consumer, Vec<HourlyConsumption>)> = population
            .into_iter()
            .map(|(consumer, readings)| {
                let records = match range {
                    Some(range) => self.hourly(&readings, range),
                    None => self.history(&readings),
                };
                (consumer, records)
            })
            .collect();

        let report = population_variance(&hourly);
        tracing::debug!(consumers = report.all.consumers.len(), ?scope, "population variance computed");
        Ok(report)
    }

    /// Score every consumer, group it by its dominant day pattern and rank.
    ///
    /// Consumers without any usable hour are left out of the ranking.
    pub fn rank_consumers(
        &self,
        population: Vec<(Consumer, Vec<MeterReading>)>,
        filter: GroupFilter,
    ) -> Vec<ConsumerRankEntry> {
        let mut scored = Vec::with_capacity(population.len());

        for (consumer, readings) in population {
            let records = self.history(&readings);
            let Some(metric_score) = self.metric_score(&records) else {
                tracing::debug!(consumer_id = %consumer.consumer_id, "no usable hours, skipped from ranking");
                metrics::counter!("analytics_rank_skipped_total").increment(1);
                continue;
            };
            let summary = self.patterns.summarize(&daily_profiles(&records));

            scored.push(ScoredConsumer {
                consumer_id: consumer.consumer_id,
                name: consumer.short_name,
                metric_score,
                group: summary.dominant,
            });
        }

        rank(scored, self.ranking.direction, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};
    use time::{Duration, PrimitiveDateTime};

    fn reading(ts: PrimitiveDateTime, wh_imp: f64) -> MeterReading {
        MeterReading {
            consumer_id: "c-1".to_string(),
            ts,
            wh_imp,
        }
    }

    /// Every half hour of `days` days from `start`, `wh(hour)` per sample.
    fn readings_for(start: Date, days: i64, wh: impl Fn(u8) -> f64) -> Vec<MeterReading> {
        (1..=days * 48)
            .map(|i| {
                let ts = start.midnight() + Duration::minutes(30 * i);
                // the :00 sample closes the previous hour
                let minutes = i64::from(ts.hour()) * 60 + i64::from(ts.minute()) - 30;
                let hour = (minutes.rem_euclid(24 * 60) / 60) as u8;
                reading(ts, wh(hour))
            })
            .collect()
    }

    fn engine() -> AnalyticsEngine {
        AnalyticsEngine::new(&EngineConfig::default()).unwrap()
    }

    #[test]
    fn rejects_invalid_tariff_config() {
        let config = EngineConfig {
            tariff: TariffConfig::unpriced(vec![]),
            ..EngineConfig::default()
        };
        assert_eq!(AnalyticsEngine::new(&config).unwrap_err(), AnalyticsError::TariffGap(0));
    }

    #[test]
    fn hourly_with_tariff_lists_all_hours() {
        let readings = vec![
            reading(datetime!(2025-10-01 07:30), 500.0),
            reading(datetime!(2025-10-01 08:00), 500.0),
        ];

        let hours = engine().hourly_with_tariff(&readings, date!(2025-10-01));

        assert_eq!(hours.len(), 24);
        assert_eq!(hours[7].hour, "07:00");
        assert_eq!(hours[7].bucket, "Peak-1");
        assert_eq!(hours[7].kwh, Some(1.0));
        assert_eq!(hours[7].rate, 9.375);
        assert_eq!(hours[7].cost, Some(9.375));
        assert_eq!(hours[8].kwh, None);
        assert_eq!(hours[8].cost, None);
    }

    #[test]
    fn hour_of_day_totals_sum_week_and_month() {
        // 2025-10-13 is a Monday; two full weeks of 500 Wh samples
        let readings = readings_for(date!(2025-10-13), 14, |h| if h == 19 { 1000.0 } else { 500.0 });
        let engine = engine();

        let week = engine
            .hour_of_day_totals(&readings, RollupView::Week, date!(2025-10-15))
            .unwrap();
        assert_eq!(week.len(), 24);
        assert_eq!(week[19].hour, "19:00");
        assert_eq!(week[19].bucket, "Peak-2");
        assert!((week[19].total_kwh - 14.0).abs() < 1e-9);
        assert!((week[19].cost - 14.0 * 9.375).abs() < 1e-9);
        assert!((week[3].total_kwh - 7.0).abs() < 1e-9);

        let month = engine
            .hour_of_day_totals(&readings, RollupView::Month, date!(2025-10-15))
            .unwrap();
        assert!((month[3].total_kwh - 14.0).abs() < 1e-9);
        assert!((month[3].cost - 14.0 * 7.125).abs() < 1e-9);

        let empty = engine
            .hour_of_day_totals(&readings, RollupView::Day, date!(2025-11-20))
            .unwrap();
        assert!(empty.iter().all(|t| t.total_kwh == 0.0 && t.cost == 0.0));
    }

    #[test]
    fn weekly_tariff_carries_costs() {
        let readings = vec![
            reading(datetime!(2025-10-09 19:30), 1000.0),
            reading(datetime!(2025-10-09 20:00), 1000.0),
        ];

        let weeks = engine().weekly_tariff(&readings, 2025, Month::October).unwrap();

        assert_eq!(weeks[1].totals.cost_of("Peak-2"), Some(2.0 * 9.375));
        assert_eq!(weeks[1].totals.total_cost, 2.0 * 9.375);
        assert_eq!(weeks[0].totals.total_cost, 0.0);
    }

    #[test]
    fn weekly_tariff_includes_empty_weeks() {
        let readings = vec![
            reading(datetime!(2025-10-09 19:30), 1000.0),
            reading(datetime!(2025-10-09 20:00), 1000.0),
        ];

        let weeks = engine().weekly_tariff(&readings, 2025, Month::October).unwrap();

        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0].label, "Week-1");
        assert_eq!(weeks[0].totals.total_kwh, 0.0);
        assert_eq!(weeks[1].totals.get("Peak-2"), Some(2.0));
        assert_eq!(weeks[1].totals.total_kwh, 2.0);
    }

    #[test]
    fn february_has_four_weeks() {
        let weeks = engine().weekly_tariff(&[], 2025, Month::February).unwrap();
        assert_eq!(weeks.len(), 4);
    }

    #[test]
    fn monthly_tariff_lists_twelve_months() {
        let readings = vec![
            reading(datetime!(2025-03-04 02:30), 250.0),
            reading(datetime!(2025-03-04 03:00), 250.0),
        ];

        let months = engine().monthly_tariff(&readings, 2025).unwrap();

        assert_eq!(months.len(), 12);
        assert_eq!(months[2].label, "March");
        assert_eq!(months[2].totals.get("Off-Peak"), Some(0.5));
        assert_eq!(months[11].label, "December");
    }

    #[test]
    fn day_view_rolls_up_hours() {
        let readings = readings_for(date!(2025-10-01), 1, |h| if h == 18 { 2000.0 } else { 500.0 });

        let report = engine()
            .rollup_view(&readings, RollupView::Day, date!(2025-10-01), None, WeekdayFilter::All)
            .unwrap();

        assert_eq!(report.values.len(), 24);
        assert_eq!(report.aggregate.count, 24);
        let high = report.aggregate.high.unwrap();
        assert_eq!(high.key, "18:00");
        assert_eq!(high.value, 4.0);
        assert_eq!(report.aggregate.low.unwrap().key, "00:00");
    }

    #[test]
    fn week_view_uses_daily_values() {
        let readings = readings_for(date!(2025-10-13), 7, |_| 500.0);

        let report = engine()
            .rollup_view(&readings, RollupView::Week, date!(2025-10-15), None, WeekdayFilter::MonFri)
            .unwrap();

        assert_eq!(report.start, date!(2025-10-13));
        assert_eq!(report.values.len(), 5);
        assert_eq!(report.aggregate.percent_increase, Some(0.0));
    }

    #[test]
    fn empty_view_has_no_statistics() {
        let report = engine()
            .rollup_view(&[], RollupView::Month, date!(2025-10-15), None, WeekdayFilter::All)
            .unwrap();
        assert_eq!(report.aggregate.count, 0);
        assert!(report.aggregate.mean.is_none());
    }

    #[test]
    fn peak_variance_from_history() {
        let readings = readings_for(date!(2025-10-01), 3, |h| match h {
            5 => 100.0,
            6 => 150.0,
            _ => 50.0,
        });

        let variance = engine().peak_variance(&readings);

        assert!((variance["05:00 - 06:00"] - 50.0).abs() < 1e-9);
        assert!((variance["06:00 - 07:00"] - (-100.0 / 150.0 * 100.0)).abs() < 1e-9);
        assert_eq!(variance.get("17:00 - 18:00"), Some(&0.0));
    }

    #[test]
    fn history_keeps_hour_closed_by_leading_midnight_sample() {
        let readings = vec![
            reading(datetime!(2025-10-02 00:00), 400.0),
            reading(datetime!(2025-10-02 00:30), 100.0),
            reading(datetime!(2025-10-02 01:00), 100.0),
        ];

        let history = engine().history(&readings);

        assert_eq!(history.len(), 2);
        assert_eq!((history[0].date, history[0].hour), (date!(2025-10-01), 23));
        let total: f64 = history.iter().map(|h| h.kwh).sum();
        assert!((total - 0.6).abs() < 1e-9);
    }

    #[test]
    fn population_variance_respects_scope() {
        let consumer = |id: &str| Consumer {
            consumer_id: id.to_string(),
            short_name: None,
        };
        let october = readings_for(date!(2025-10-01), 2, |h| if h == 18 { 1500.0 } else { 500.0 });
        let november = readings_for(date!(2025-11-03), 1, |_| 500.0);
        let mut both = october.clone();
        both.extend(november);

        let engine = engine();
        let population = vec![(consumer("a"), both), (consumer("b"), october)];

        let october_only = engine
            .population_variance(population.clone(), VarianceScope::Month(2025, Month::October))
            .unwrap();
        assert_eq!(october_only.all.consumers.len(), 2);
        let a = &october_only.all.consumers[0];
        assert_eq!(a.consumer_id, "a");
        assert_eq!(a.aggregate.high.as_ref().unwrap().key, "18:00");

        let november_only = engine
            .population_variance(population.clone(), VarianceScope::Month(2025, Month::November))
            .unwrap();
        assert_eq!(november_only.all.consumers.len(), 1);
        assert_eq!(november_only.all.percent_increase_stats.highest, Some(0.0));

        let everything = engine.population_variance(population, VarianceScope::All).unwrap();
        assert_eq!(everything.all.consumers.len(), 2);
    }

    #[test]
    fn pattern_summary_over_history() {
        let readings = readings_for(date!(2025-10-01), 2, |_| 300.0);

        let summary = engine().pattern_summary(&readings);

        assert_eq!(summary.days_observed, 2);
        assert_eq!(summary.counts[&pattern::DayCategory::Flat], 2);
    }

    #[test]
    fn ranks_by_load_factor_with_pattern_groups() {
        let flat = readings_for(date!(2025-10-01), 2, |_| 100.0);
        let peaky = readings_for(date!(2025-10-01), 2, |h| if (8..20).contains(&h) { 400.0 } else { 0.0 });

        let consumer = |id: &str| Consumer {
            consumer_id: id.to_string(),
            short_name: Some(format!("{id} ltd")),
        };

        let ranked = engine().rank_consumers(
            vec![
                (consumer("peaky"), peaky),
                (consumer("flat"), flat),
                (consumer("silent"), vec![]),
            ],
            GroupFilter::All,
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].consumer_id, "flat");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].group, Some(pattern::DayCategory::Flat));
        assert_eq!(ranked[1].consumer_id, "peaky");
        assert_eq!(ranked[1].group, Some(pattern::DayCategory::Shift));
    }

    #[test]
    fn peak_share_metric() {
        let engine = AnalyticsEngine::new(&EngineConfig {
            ranking: RankingConfig {
                metric: RankMetric::PeakShare,
                direction: SortDirection::Descending,
            },
            ..EngineConfig::default()
        })
        .unwrap();

        let day = date!(2025-10-01);
        let records = vec![
            HourlyConsumption { date: day, hour: 7, kwh: 3.0 },
            HourlyConsumption { date: day, hour: 12, kwh: 1.0 },
        ];
        assert_eq!(engine.metric_score(&records), Some(0.75));
        assert_eq!(engine.metric_score(&[]), None);
    }
}
