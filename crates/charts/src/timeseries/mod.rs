//! Time-indexed series for the history charts.
//!
//! Raw points arrive per server, already filtered by the API layer. Each
//! enabled metric becomes one line per server. Points are ordered by time and
//! the connector between two samples taken at the same instant is drawn with
//! zero width.

use crate::chart::{AXIS_BANDWIDTH, AXIS_IOPS, AXIS_LATENCY};
use crate::error::ParseError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

mod cache;
mod servers;
mod trend;

pub use cache::{CacheStats, SeriesCache};
pub use servers::{ServerGroup, ServerInfo, group_servers};
pub use trend::{TrendPoint, TrendReport, TrendSample, TrendSummary, analyze_trend};

/// Width of a connector between two distinct instants.
pub const SEGMENT_WIDTH: f64 = 2.0;

/// The metrics carried by time-series points.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Iops,
    AvgLatency,
    Bandwidth,
}

impl MetricType {
    pub const ALL: &'static [MetricType] = &[Self::Iops, Self::AvgLatency, Self::Bandwidth];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Iops => "iops",
            Self::AvgLatency => "avg_latency",
            Self::Bandwidth => "bandwidth",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Iops => "IOPS",
            Self::AvgLatency => "Avg Latency",
            Self::Bandwidth => "Bandwidth",
        }
    }

    pub fn axis(&self) -> &'static str {
        match self {
            Self::Iops => AXIS_IOPS,
            Self::AvgLatency => AXIS_LATENCY,
            Self::Bandwidth => AXIS_BANDWIDTH,
        }
    }

    /// Dash pattern distinguishing the metric when several share a chart.
    pub fn dash(&self) -> Option<Vec<u32>> {
        match self {
            Self::Iops => None,
            Self::AvgLatency => Some(vec![5, 5]),
            Self::Bandwidth => Some(vec![2, 2]),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for MetricType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .find(|m| m.id() == s)
            .copied()
            .ok_or(ParseError::MetricType(s))
    }
}

/// A single sample as served by the time-series endpoint. The metric type is
/// kept as text so that points for metrics this crate does not chart still
/// decode; they simply never match.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: String,
    #[serde(alias = "metricType")]
    pub metric_type: String,
    #[serde(default)]
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn is(&self, metric: MetricType) -> bool {
        self.metric_type == metric.id()
    }
}

/// The raw points of one server, with the label and color its lines use.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSeries {
    pub label: String,
    pub color: String,
    #[serde(default)]
    pub points: Vec<TimeSeriesPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: String,
    pub y: f64,
}

/// One line of a time-series chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDataset {
    pub label: String,
    pub data: Vec<SeriesPoint>,
    pub color: String,
    pub axis_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_dash: Option<Vec<u32>>,
    /// Width of the connector from point `i` to point `i + 1`.
    pub segment_widths: Vec<f64>,
}

/// Milliseconds since the epoch. Accepts RFC 3339 and naive ISO-8601 forms
/// (taken as UTC); anything else maps to 0 so ordering stays total.
pub fn parse_timestamp_ms(timestamp: &str) -> i64 {
    try_parse_timestamp_ms(timestamp).unwrap_or_else(|| {
        trace!("unparsable timestamp: {timestamp:?}");
        0
    })
}

/// Like [`parse_timestamp_ms`], but `None` for an empty or unparsable string.
pub(crate) fn try_parse_timestamp_ms(timestamp: &str) -> Option<i64> {
    let timestamp = timestamp.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.timestamp_millis());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(timestamp, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Connector widths for time-ordered points: zero between samples sharing a
/// timestamp.
pub fn segment_widths(points: &[SeriesPoint]) -> Vec<f64> {
    points
        .windows(2)
        .map(|pair| {
            if pair[0].x == pair[1].x {
                0.0
            } else {
                SEGMENT_WIDTH
            }
        })
        .collect()
}

fn dataset_key(
    metric_type: MetricType,
    label: &str,
    color: &str,
    axis_id: &str,
    dash: Option<&[u32]>,
    points: &[&TimeSeriesPoint],
) -> String {
    let mut hasher = Sha256::new();
    for point in points {
        hasher.update(point.timestamp.as_bytes());
        hasher.update([0u8]);
        hasher.update(point.value.to_bits().to_le_bytes());
    }
    let digest = hasher.finalize();
    let content: String = digest[..8].iter().map(|b| format!("{b:02x}")).collect();

    format!(
        "{metric_type}|{label}|{}|{}|{color}|{axis_id}|{dash:?}|{content}",
        points.len(),
        points.first().map(|p| p.timestamp.as_str()).unwrap_or_default(),
    )
}

/// Builds the dataset for one metric out of a server's points. Returns `None`
/// when no point carries the metric.
pub fn process_metric_data(
    cache: &SeriesCache,
    points: &[TimeSeriesPoint],
    metric_type: MetricType,
    label: &str,
    color: &str,
    axis_id: &str,
    dash: Option<&[u32]>,
) -> Option<SeriesDataset> {
    let matching: Vec<&TimeSeriesPoint> = points.iter().filter(|p| p.is(metric_type)).collect();

    if matching.is_empty() {
        return None;
    }

    let key = dataset_key(metric_type, label, color, axis_id, dash, &matching);

    if let Some(dataset) = cache.get(&key) {
        return Some(dataset);
    }

    let mut keyed: Vec<(i64, &TimeSeriesPoint)> = matching
        .iter()
        .map(|p| (cache.timestamp_ms(&p.timestamp), *p))
        .collect();
    keyed.sort_by_key(|(ms, _)| *ms);

    let data: Vec<SeriesPoint> = keyed
        .into_iter()
        .map(|(_, p)| SeriesPoint {
            x: p.timestamp.clone(),
            y: p.value,
        })
        .collect();

    let dataset = SeriesDataset {
        label: label.to_string(),
        segment_widths: segment_widths(&data),
        data,
        color: color.to_string(),
        axis_id: axis_id.to_string(),
        border_dash: dash.map(|d| d.to_vec()),
    };

    cache.insert(key, dataset.clone());

    Some(dataset)
}

/// One dataset per server and enabled metric, skipping pairs without points.
/// Datasets are ordered by server, then by the order of `enabled`.
pub fn generate_series_datasets(
    cache: &SeriesCache,
    series: &[ServerSeries],
    enabled: &[MetricType],
) -> Vec<SeriesDataset> {
    let mut datasets = Vec::new();

    for server in series {
        for metric in enabled {
            let label = format!("{} - {}", server.label, metric.name());
            let dash = metric.dash();

            if let Some(dataset) = process_metric_data(
                cache,
                &server.points,
                *metric,
                &label,
                &server.color,
                metric.axis(),
                dash.as_deref(),
            ) {
                datasets.push(dataset);
            }
        }
    }

    datasets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(timestamp: &str, metric: &str, value: f64) -> TimeSeriesPoint {
        TimeSeriesPoint {
            timestamp: timestamp.to_string(),
            metric_type: metric.to_string(),
            value,
        }
    }

    const T0: &str = "2025-06-01T10:00:00";
    const T1: &str = "2025-06-01T11:00:00";
    const T2: &str = "2025-06-01T12:00:00";

    #[test]
    fn metric_ids() {
        for metric in MetricType::ALL {
            assert_eq!(metric.id().parse::<MetricType>(), Ok(*metric));
        }
        assert_eq!(
            "p95_latency".parse::<MetricType>(),
            Err(ParseError::MetricType("p95_latency".to_string()))
        );
    }

    #[test]
    fn parses_timestamps() {
        assert_eq!(parse_timestamp_ms("1970-01-01T00:00:01Z"), 1000);
        assert_eq!(parse_timestamp_ms("1970-01-01T00:00:01"), 1000);
        assert_eq!(parse_timestamp_ms("1970-01-01 00:00:01.5"), 1500);
        assert_eq!(parse_timestamp_ms("1970-01-02"), 86_400_000);
        assert_eq!(parse_timestamp_ms("1970-01-01T01:00:00+01:00"), 0);
        assert_eq!(parse_timestamp_ms("yesterday"), 0);
        assert_eq!(try_parse_timestamp_ms("yesterday"), None);
        assert_eq!(try_parse_timestamp_ms(""), None);
        assert_eq!(try_parse_timestamp_ms("1970-01-01T00:00:00Z"), Some(0));
    }

    #[test]
    fn duplicate_timestamps_get_zero_width() {
        let cache = SeriesCache::new(8);
        let points = vec![point(T0, "iops", 5.0), point(T0, "iops", 9.0), point(T1, "iops", 7.0)];

        let dataset = process_metric_data(&cache, &points, MetricType::Iops, "s", "c", "y", None)
            .unwrap();

        assert_eq!(dataset.data.len(), 3);
        assert_eq!(dataset.segment_widths, vec![0.0, SEGMENT_WIDTH]);
    }

    #[test]
    fn sorts_by_time_and_keeps_only_the_metric() {
        let cache = SeriesCache::new(8);
        let points = vec![
            point(T2, "iops", 3.0),
            point(T0, "iops", 1.0),
            point(T1, "bandwidth", 50.0),
            point(T1, "iops", 2.0),
        ];

        let dataset = process_metric_data(&cache, &points, MetricType::Iops, "s", "c", "y", None)
            .unwrap();

        let ys: Vec<f64> = dataset.data.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![1.0, 2.0, 3.0]);
        assert_eq!(dataset.segment_widths, vec![SEGMENT_WIDTH, SEGMENT_WIDTH]);
    }

    #[test]
    fn empty_pairs_are_omitted() {
        let cache = SeriesCache::new(8);
        let series = vec![
            ServerSeries {
                label: "h1 (NVMe)".to_string(),
                color: "red".to_string(),
                points: vec![point(T0, "iops", 1.0), point(T1, "avg_latency", 0.5)],
            },
            ServerSeries {
                label: "h2 (NVMe)".to_string(),
                color: "blue".to_string(),
                points: vec![],
            },
        ];

        let datasets = generate_series_datasets(&cache, &series, MetricType::ALL);

        let labels: Vec<&str> = datasets.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["h1 (NVMe) - IOPS", "h1 (NVMe) - Avg Latency"]);
        assert_eq!(datasets[1].axis_id, AXIS_LATENCY);
        assert_eq!(datasets[1].border_dash, Some(vec![5, 5]));
        assert!(datasets.iter().all(|d| !d.data.is_empty()));
    }

    #[test]
    fn cached_and_fresh_results_agree() {
        let points = vec![point(T1, "iops", 2.0), point(T0, "iops", 1.0)];
        let series = vec![ServerSeries {
            label: "h1".to_string(),
            color: "red".to_string(),
            points,
        }];

        let cache = SeriesCache::new(8);
        let first = generate_series_datasets(&cache, &series, &[MetricType::Iops]);
        let second = generate_series_datasets(&cache, &series, &[MetricType::Iops]);
        let fresh = generate_series_datasets(&SeriesCache::new(8), &series, &[MetricType::Iops]);

        assert_eq!(first, second);
        assert_eq!(first, fresh);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn same_shape_different_values_do_not_collide() {
        let cache = SeriesCache::new(8);
        let a = vec![point(T0, "iops", 1.0), point(T1, "iops", 2.0)];
        let b = vec![point(T0, "iops", 1.0), point(T1, "iops", 3.0)];

        let first = process_metric_data(&cache, &a, MetricType::Iops, "s", "c", "y", None).unwrap();
        let second =
            process_metric_data(&cache, &b, MetricType::Iops, "s", "c", "y", None).unwrap();

        assert_eq!(first.data[1].y, 2.0);
        assert_eq!(second.data[1].y, 3.0);
    }
}
