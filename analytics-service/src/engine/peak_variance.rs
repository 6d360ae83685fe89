use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Ordered pair of hours compared as `from -> to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourPair(pub u8, pub u8);

impl HourPair {
    pub fn label(self) -> String {
        format!("{:02}:00 - {:02}:00", self.0, self.1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakVarianceConfig {
    pub pairs: Vec<HourPair>,
}

impl Default for PeakVarianceConfig {
    /// Ramp into and out of the morning and evening peaks.
    fn default() -> Self {
        let morning = (5..10).map(|h| HourPair(h, h + 1));
        let evening = (17..22).map(|h| HourPair(h, h + 1));
        Self {
            pairs: morning.chain(evening).collect(),
        }
    }
}

impl PeakVarianceConfig {
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        match self.pairs.iter().find(|p| p.0 > 23 || p.1 > 23) {
            Some(pair) => Err(AnalyticsError::InvalidParameter(format!(
                "peak variance pair ({}, {}) is outside 0-23",
                pair.0, pair.1
            ))),
            None => Ok(()),
        }
    }
}

/// Percentage change of the long-run hourly average between each pair.
///
/// A pair is left out when either hour has no average or the `from` average
/// is zero.
pub fn peak_variance(hourly_averages: &BTreeMap<u8, f64>, pairs: &[HourPair]) -> BTreeMap<String, f64> {
    pairs
        .iter()
        .filter_map(|pair| {
            let from = *hourly_averages.get(&pair.0)?;
            let to = *hourly_averages.get(&pair.1)?;
            if from == 0.0 {
                return None;
            }
            Some((pair.label(), (to - from) / from * 100.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pairs_cover_morning_and_evening_ramps() {
        let config = PeakVarianceConfig::default();

        assert_eq!(config.pairs.len(), 10);
        assert_eq!(config.pairs[0], HourPair(5, 6));
        assert_eq!(config.pairs[9], HourPair(21, 22));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn computes_signed_percentage_change() {
        let averages = BTreeMap::from([(5, 2.0), (6, 3.0), (7, 1.5)]);

        let result = peak_variance(&averages, &[HourPair(5, 6), HourPair(6, 7)]);

        assert_eq!(result.get("05:00 - 06:00"), Some(&50.0));
        assert_eq!(result.get("06:00 - 07:00"), Some(&-50.0));
    }

    #[test]
    fn omits_zero_base_and_missing_hours() {
        let averages = BTreeMap::from([(17, 0.0), (18, 4.0), (20, 1.0)]);

        let result = peak_variance(
            &averages,
            &[HourPair(17, 18), HourPair(18, 19), HourPair(19, 20), HourPair(20, 18)],
        );

        assert_eq!(result.len(), 1);
        assert_eq!(result.get("20:00 - 18:00"), Some(&300.0));
    }

    #[test]
    fn rejects_out_of_range_pair() {
        let config = PeakVarianceConfig {
            pairs: vec![HourPair(23, 24)],
        };
        assert!(matches!(config.validate(), Err(AnalyticsError::InvalidParameter(_))));
    }
}
