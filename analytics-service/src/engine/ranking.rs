use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::pattern::DayCategory;
use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Descending,
    Ascending,
}

/// Which consumers take part in a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupFilter {
    #[default]
    All,
    Only(DayCategory),
}

impl FromStr for GroupFilter {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredConsumer {
    pub consumer_id: String,
    pub name: Option<String>,
    pub metric_score: f64,
    pub group: Option<DayCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerRankEntry {
    pub rank: usize,
    pub consumer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub metric_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<DayCategory>,
}

/// Order consumers by score and assign dense 1-based ranks.
///
/// Equal scores share a rank and the next distinct score takes the next rank
/// (`[70, 70, 50]` ranks as `[1, 1, 2]`). The sort is stable, so tied
/// consumers keep their input order. With [`GroupFilter::All`] every entry is
/// tagged with its group; with a single group only its members are kept and
/// the tag is dropped.
pub fn rank(entries: Vec<ScoredConsumer>, direction: SortDirection, filter: GroupFilter) -> Vec<ConsumerRankEntry> {
    let mut kept: Vec<ScoredConsumer> = match filter {
        GroupFilter::All => entries,
        GroupFilter::Only(group) => entries
            .into_iter()
            .filter(|e| e.group == Some(group))
            .map(|e| ScoredConsumer { group: None, ..e })
            .collect(),
    };

    kept.sort_by(|a, b| {
        let ord = a.metric_score.total_cmp(&b.metric_score);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });

    let mut ranked = Vec::with_capacity(kept.len());
    let mut rank = 0;
    let mut previous: Option<f64> = None;
    for entry in kept {
        if previous.map_or(true, |p| p.total_cmp(&entry.metric_score) != Ordering::Equal) {
            rank += 1;
        }
        previous = Some(entry.metric_score);

        ranked.push(ConsumerRankEntry {
            rank,
            consumer_id: entry.consumer_id,
            name: entry.name,
            metric_score: entry.metric_score,
            group: entry.group,
        });
    }
    ranked
}
