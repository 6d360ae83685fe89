//! Behavioral classification of a single day's load shape.
//!
//! A day is first checked for a zero total, then for flatness, then for a
//! dominant window. Two flatness tests and two dominance tests exist in the
//! field and neither is known to be authoritative, so both are available and
//! picked through [`PatternConfig`].

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::engine::hourly::{zero_filled, DayProfile};
use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DayCategory {
    #[serde(rename = "flat")]
    Flat,
    #[serde(rename = "day")]
    DayDominant,
    #[serde(rename = "night")]
    NightDominant,
    #[serde(rename = "shift")]
    Shift,
    #[serde(rename = "random")]
    Random,
}

impl DayCategory {
    pub const ALL: [DayCategory; 5] = [
        Self::Flat,
        Self::DayDominant,
        Self::NightDominant,
        Self::Shift,
        Self::Random,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::DayDominant => "day",
            Self::NightDominant => "night",
            Self::Shift => "shift",
            Self::Random => "random",
        }
    }
}

impl FromStr for DayCategory {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AnalyticsError::UnknownValue {
                kind: "pattern group",
                value: s.to_string(),
            })
    }
}

/// Contiguous `[start_hour, end_hour)` span, wrapping past midnight when
/// `end_hour <= start_hour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftWindow {
    pub start_hour: u8,
    pub end_hour: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlatnessTest {
    /// At least `min_hours` of the 24 hours lie within `mean * (1 ± tolerance)`.
    MeanBand { tolerance: f64, min_hours: usize },
    /// At least `min_pairs` adjacent hour pairs have `low <= cur / prev <= high`.
    PairwiseRatio { low: f64, high: f64, min_pairs: usize },
}

impl Default for FlatnessTest {
    fn default() -> Self {
        Self::MeanBand {
            tolerance: 0.15,
            min_hours: 18,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DominanceTest {
    /// `[day_start, day_end)` against the remaining hours.
    FixedWindow { day_start: u8, day_end: u8, share: f64 },
    /// Every `width`-hour window around the clock.
    SlidingWindow { width: u8, share: f64 },
}

impl Default for DominanceTest {
    fn default() -> Self {
        Self::SlidingWindow {
            width: 12,
            share: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub flatness: FlatnessTest,
    pub dominance: DominanceTest,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub category: DayCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_window: Option<ShiftWindow>,
}

impl Classification {
    fn plain(category: DayCategory) -> Self {
        Self {
            category,
            shift_window: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPattern {
    pub date: Date,
    pub category: DayCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_window: Option<ShiftWindow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftWindowCount {
    #[serde(flatten)]
    pub window: ShiftWindow,
    pub days: usize,
}

/// Category tallies over a consumer's whole history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerPatternSummary {
    pub days_observed: usize,
    pub counts: BTreeMap<DayCategory, usize>,
    /// Most frequent category, `None` when no day was observed.
    pub dominant: Option<DayCategory>,
    /// Most frequent shift window, ties going to the window seen first.
    pub modal_shift_window: Option<ShiftWindowCount>,
    pub days: Vec<DayPattern>,
}

#[derive(Debug, Clone)]
pub struct PatternClassifier {
    config: PatternConfig,
}

impl PatternClassifier {
    pub fn new(config: PatternConfig) -> Result<Self, AnalyticsError> {
        let invalid = |msg: String| Err(AnalyticsError::InvalidParameter(msg));

        match config.flatness {
            FlatnessTest::MeanBand { tolerance, min_hours } => {
                if !(0.0..1.0).contains(&tolerance) {
                    return invalid(format!("flatness tolerance {tolerance} must be in [0, 1)"));
                }
                if min_hours == 0 || min_hours > 24 {
                    return invalid(format!("flatness min_hours {min_hours} must be in 1..=24"));
                }
            }
            FlatnessTest::PairwiseRatio { low, high, min_pairs } => {
                if !(low > 0.0 && low <= 1.0 && high >= 1.0) {
                    return invalid(format!("flatness ratio band {low}..{high} must enclose 1"));
                }
                if min_pairs == 0 || min_pairs > 23 {
                    return invalid(format!("flatness min_pairs {min_pairs} must be in 1..=23"));
                }
            }
        }

        let share_ok = |share: f64| share > 0.0 && share <= 1.0;
        match config.dominance {
            DominanceTest::FixedWindow { day_start, day_end, share } => {
                if day_start >= day_end || day_end > 24 {
                    return invalid(format!("day window {day_start}..{day_end} is not a valid hour range"));
                }
                if !share_ok(share) {
                    return invalid(format!("dominance share {share} must be in (0, 1]"));
                }
            }
            DominanceTest::SlidingWindow { width, share } => {
                if width == 0 || width > 23 {
                    return invalid(format!("sliding window width {width} must be in 1..=23"));
                }
                if !share_ok(share) {
                    return invalid(format!("dominance share {share} must be in (0, 1]"));
                }
            }
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Classify one day from its 24 hourly kWh values; first matching rule wins.
    pub fn classify_day(&self, hours: &[f64; 24]) -> Classification {
        let total: f64 = hours.iter().sum();
        if total == 0.0 {
            return Classification::plain(DayCategory::Random);
        }

        if self.is_flat(hours, total) {
            return Classification::plain(DayCategory::Flat);
        }

        match self.config.dominance {
            DominanceTest::FixedWindow { day_start, day_end, share } => {
                let day: f64 = hours[usize::from(day_start)..usize::from(day_end)].iter().sum();
                let night = total - day;
                if day >= share * total {
                    Classification::plain(DayCategory::DayDominant)
                } else if night >= share * total {
                    Classification::plain(DayCategory::NightDominant)
                } else {
                    Classification::plain(DayCategory::Random)
                }
            }
            DominanceTest::SlidingWindow { width, share } => {
                match strongest_window(hours, usize::from(width), share * total) {
                    Some(window) => Classification {
                        category: DayCategory::Shift,
                        shift_window: Some(window),
                    },
                    None => Classification::plain(DayCategory::Random),
                }
            }
        }
    }

    fn is_flat(&self, hours: &[f64; 24], total: f64) -> bool {
        match self.config.flatness {
            FlatnessTest::MeanBand { tolerance, min_hours } => {
                let mean = total / 24.0;
                let (lo, hi) = (mean * (1.0 - tolerance), mean * (1.0 + tolerance));
                hours.iter().filter(|v| (lo..=hi).contains(*v)).count() >= min_hours
            }
            FlatnessTest::PairwiseRatio { low, high, min_pairs } => {
                let passing = hours
                    .windows(2)
                    .filter(|pair| {
                        let (prev, cur) = (pair[0], pair[1]);
                        if prev == 0.0 {
                            cur == 0.0
                        } else {
                            (low..=high).contains(&(cur / prev))
                        }
                    })
                    .count();
                passing >= min_pairs
            }
        }
    }

    /// Classify a gapped day; missing hours count as zero.
    pub fn classify_profile(&self, date: Date, profile: &DayProfile) -> DayPattern {
        let Classification { category, shift_window } = self.classify_day(&zero_filled(profile));
        DayPattern {
            date,
            category,
            shift_window,
        }
    }

    /// Classify every observed day and tally the results.
    pub fn summarize(&self, days: &BTreeMap<Date, DayProfile>) -> ConsumerPatternSummary {
        let patterns: Vec<DayPattern> = days
            .iter()
            .map(|(date, profile)| self.classify_profile(*date, profile))
            .collect();

        let mut counts: BTreeMap<DayCategory, usize> =
            DayCategory::ALL.into_iter().map(|c| (c, 0)).collect();
        // (window, days) in first-seen order
        let mut windows: Vec<ShiftWindowCount> = Vec::new();

        for pattern in &patterns {
            *counts.entry(pattern.category).or_insert(0) += 1;

            if let Some(window) = pattern.shift_window {
                match windows.iter_mut().find(|w| w.window == window) {
                    Some(seen) => seen.days += 1,
                    None => windows.push(ShiftWindowCount { window, days: 1 }),
                }
            }
        }

        let dominant = if patterns.is_empty() {
            None
        } else {
            first_max_by_key(DayCategory::ALL.iter().copied(), |c| counts[c])
        };
        let modal_shift_window = first_max_by_key(windows.iter().copied(), |w| w.days);

        ConsumerPatternSummary {
            days_observed: patterns.len(),
            counts,
            dominant,
            modal_shift_window,
            days: patterns,
        }
    }
}

/// Highest-sum `width`-hour window whose sum reaches `threshold`.
///
/// Windows wrap around midnight. Equal sums go to the earliest start hour.
fn strongest_window(hours: &[f64; 24], width: usize, threshold: f64) -> Option<ShiftWindow> {
    let mut best: Option<(usize, f64)> = None;

    for start in 0..24 {
        let sum: f64 = (start..start + width).map(|h| hours[h % 24]).sum();
        if sum < threshold {
            continue;
        }
        if best.map_or(true, |(_, best_sum)| sum > best_sum) {
            best = Some((start, sum));
        }
    }

    // start < 24 and width < 24, the casts cannot truncate
    best.map(|(start, _)| ShiftWindow {
        start_hour: start as u8,
        end_hour: ((start + width) % 24) as u8,
    })
}

/// Like `Iterator::max_by_key` but keeps the first of equal maxima.
fn first_max_by_key<T, I, F>(items: I, key: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> usize,
{
    let mut best: Option<(T, usize)> = None;
    for item in items {
        let k = key(&item);
        if best.as_ref().map_or(true, |(_, best_k)| k > *best_k) {
            best = Some((item, k));
        }
    }
    best.map(|(item, _)| item)
}
