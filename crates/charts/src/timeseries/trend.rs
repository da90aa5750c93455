use super::parse_timestamp_ms;
use serde::{Deserialize, Serialize};

/// A historical value of one metric for one test configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSample {
    pub timestamp: String,
    #[serde(default)]
    pub block_size: String,
    #[serde(default)]
    pub read_write_pattern: String,
    #[serde(default)]
    pub queue_depth: u32,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(flatten)]
    pub sample: TrendSample,
    pub unit: String,
    /// Mean of this value and the two before it.
    pub moving_avg: Option<f64>,
    /// Change from the previous value, in percent.
    pub percent_change: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub total_points: usize,
    pub min_value: f64,
    pub max_value: f64,
    pub avg_value: f64,
    pub first_value: f64,
    pub last_value: f64,
    pub overall_change: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub data: Vec<TrendPoint>,
    pub trend_analysis: Option<TrendSummary>,
}

fn percent(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        None
    } else {
        Some((to - from) / from * 100.0)
    }
}

/// Trend of a metric over time. Samples are put in chronological order first
/// (stable for equal timestamps).
pub fn analyze_trend(samples: &[TrendSample], unit: &str) -> TrendReport {
    if samples.is_empty() {
        return TrendReport::default();
    }

    let mut ordered: Vec<&TrendSample> = samples.iter().collect();
    ordered.sort_by_key(|s| parse_timestamp_ms(&s.timestamp));

    let values: Vec<f64> = ordered.iter().map(|s| s.value).collect();

    let data = ordered
        .iter()
        .enumerate()
        .map(|(i, sample)| TrendPoint {
            sample: (*sample).clone(),
            unit: unit.to_string(),
            moving_avg: (i >= 2).then(|| values[i - 2..=i].iter().sum::<f64>() / 3.0),
            percent_change: i.checked_sub(1).and_then(|prev| percent(values[prev], values[i])),
        })
        .collect();

    let first = values[0];
    let last = values[values.len() - 1];

    let summary = TrendSummary {
        total_points: values.len(),
        min_value: values.iter().copied().fold(f64::INFINITY, f64::min),
        max_value: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        avg_value: values.iter().sum::<f64>() / values.len() as f64,
        first_value: first,
        last_value: last,
        overall_change: percent(first, last),
    };

    TrendReport {
        data,
        trend_analysis: Some(summary),
    }
}
