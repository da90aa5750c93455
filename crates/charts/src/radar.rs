use crate::chart::color_at;
use crate::metric::get_metric_value;
use crate::record::PerformanceRecord;
use crate::sort::{SortingOptions, sorted_records};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Normalized radar axes of a pool, each in `[0, 100]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarMetrics {
    pub iops: f64,
    pub latency: f64,
    pub bandwidth: f64,
    pub p95_latency: f64,
    pub p99_latency: f64,
    pub consistency: f64,
}

/// A drive model's aggregated data within one host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarPool {
    pub pool_name: String,
    pub metrics: RadarMetrics,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarGridEntry {
    pub hostname: String,
    pub pools: Vec<RadarPool>,
}

/// The radar axes, in output order, with the metric they are computed from.
/// Latency axes are inverted so that a higher score is always better.
const AXES: [(&str, bool); 5] = [
    ("iops", false),
    ("avg_latency", true),
    ("bandwidth", false),
    ("p95_latency", true),
    ("p99_latency", true),
];

/// Observed range of a metric over the non-zero values of a corpus.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn of<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| *v != 0.0)
            .fold(None, |range: Option<Range>, v| match range {
                Some(r) => Some(Range {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
                None => Some(Range { min: v, max: v }),
            })
    }

    fn score(&self, value: f64, invert: bool) -> f64 {
        if self.max == self.min || value == 0.0 {
            return 0.0;
        }

        let score = (value - self.min) / (self.max - self.min) * 100.0;
        let score = if invert { 100.0 - score } else { score };

        score.clamp(0.0, 100.0)
    }
}

/// Mean of the non-zero values, or 0 when there are none.
fn reported_mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| *v != 0.0)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count > 0 { sum / count as f64 } else { 0.0 }
}

/// Consistency of a pool's IOPS: `max(0, 100 - CV * 100)` where CV is the
/// population coefficient of variation. Pools with fewer than two samples, or
/// with a zero mean, have nothing to vary and score 100.
pub fn consistency_score(iops: &[f64]) -> f64 {
    if iops.len() <= 1 {
        return 100.0;
    }

    let mean = iops.iter().sum::<f64>() / iops.len() as f64;

    if mean == 0.0 {
        return 100.0;
    }

    let variance = iops.iter().map(|x| (*x - mean).powi(2)).sum::<f64>() / iops.len() as f64;
    let cv = variance.sqrt() / mean;

    (100.0 - cv * 100.0).clamp(0.0, 100.0)
}

/// Partitions records by a key, keeping first-appearance order of both the
/// keys and the members.
fn partition<'a, F>(
    records: &[&'a PerformanceRecord],
    key_of: F,
) -> Vec<(String, Vec<&'a PerformanceRecord>)>
where
    F: Fn(&PerformanceRecord) -> String,
{
    let mut parts: Vec<(String, Vec<&'a PerformanceRecord>)> = Vec::new();

    for record in records {
        let key = key_of(*record);

        match parts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(*record),
            None => parts.push((key, vec![*record])),
        }
    }

    parts
}

/// Builds one radar grid entry per hostname with one pool per drive model.
///
/// Normalization ranges are taken over the whole input, so scores are
/// comparable across hosts of the same call but not across calls with
/// different inputs. Each drive model keeps the same color on every host.
pub fn process_radar_grid_data(
    records: &[PerformanceRecord],
    colors: &[String],
    options: &SortingOptions,
) -> Vec<RadarGridEntry> {
    let sorted = sorted_records(records, options);

    let ranges: Vec<Option<Range>> = AXES
        .iter()
        .map(|(metric, _)| {
            let range =
                Range::of(sorted.iter().map(|r| get_metric_value(&r.metrics, metric, None)));

            match range {
                None => debug!("radar: no values for {metric}"),
                Some(r) if r.min == r.max => debug!("radar: {metric} has no spread ({})", r.min),
                _ => {}
            }

            range
        })
        .collect();

    let mut drive_order: Vec<&str> = Vec::new();
    for record in &sorted {
        if !drive_order.contains(&record.drive_model.as_str()) {
            drive_order.push(&record.drive_model);
        }
    }

    partition(&sorted, |r| r.hostname_or_unknown().to_string())
        .into_iter()
        .map(|(hostname, members)| {
            let pools = partition(&members, |r| r.drive_model.clone())
                .into_iter()
                .map(|(pool_name, pool)| {
                    let mut scores = [0.0; 5];

                    for (i, (metric, invert)) in AXES.iter().enumerate() {
                        let mean = reported_mean(
                            pool.iter().map(|r| get_metric_value(&r.metrics, metric, None)),
                        );

                        scores[i] = ranges[i].map(|r| r.score(mean, *invert)).unwrap_or(0.0);
                    }

                    let iops: Vec<f64> = pool
                        .iter()
                        .map(|r| get_metric_value(&r.metrics, "iops", None))
                        .collect();

                    let color_index = drive_order
                        .iter()
                        .position(|d| *d == pool_name)
                        .unwrap_or(0);

                    RadarPool {
                        metrics: RadarMetrics {
                            iops: scores[0],
                            latency: scores[1],
                            bandwidth: scores[2],
                            p95_latency: scores[3],
                            p99_latency: scores[4],
                            consistency: consistency_score(&iops),
                        },
                        color: color_at(colors, color_index),
                        pool_name,
                    }
                })
                .collect();

            RadarGridEntry { hostname, pools }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn all_scores(grid: &[RadarGridEntry]) -> Vec<f64> {
        grid.iter()
            .flat_map(|e| &e.pools)
            .flat_map(|p| {
                let m = &p.metrics;
                [m.iops, m.latency, m.bandwidth, m.p95_latency, m.p99_latency, m.consistency]
            })
            .collect()
    }

    fn corpus() -> Vec<PerformanceRecord> {
        vec![
            on_host(measured("A", "4K", "read", 1000.0, 2.0, 40.0), "h1", "NVMe"),
            on_host(measured("A", "4K", "write", 3000.0, 1.0, 120.0), "h1", "NVMe"),
            on_host(measured("B", "4K", "read", 500.0, 4.0, 20.0), "h1", "NVMe"),
            on_host(measured("A", "4K", "read", 2000.0, 3.0, 80.0), "h2", "iSCSI"),
        ]
    }

    #[test]
    fn groups_by_host_then_pool() {
        let grid = process_radar_grid_data(&corpus(), &palette(), &SortingOptions::default());

        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0].hostname, "h1");
        let names: Vec<&str> = grid[0].pools.iter().map(|p| p.pool_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(grid[1].pools.len(), 1);

        // same drive, same color on every host
        assert_eq!(grid[0].pools[0].color, grid[1].pools[0].color);
        assert_ne!(grid[0].pools[0].color, grid[0].pools[1].color);
    }

    #[test]
    fn normalizes_over_the_whole_corpus() {
        let grid = process_radar_grid_data(&corpus(), &palette(), &SortingOptions::default());

        // iops range is [500, 3000]; pool h1/A averages 2000, h2/A is 2000
        let h1_a = &grid[0].pools[0].metrics;
        let h2_a = &grid[1].pools[0].metrics;
        assert!((h1_a.iops - 60.0).abs() < 1e-9);
        assert!((h2_a.iops - 60.0).abs() < 1e-9);

        // lowest latency scores highest
        let h1_b = &grid[0].pools[1].metrics;
        assert_eq!(h1_b.iops, 0.0);
        assert_eq!(h1_b.latency, 0.0);
        assert!(h2_a.latency > h1_b.latency);
    }

    #[test]
    fn scores_stay_in_bounds() {
        let mut records = corpus();
        records.push(on_host(
            with_metric(measured("C", "1M", "read", 1e9, 0.001, 1e6), "p99_latency", 50.0),
            "h3",
            "NVMe",
        ));
        records.push(on_host(record("D", "4K", "read"), "h3", "NVMe"));

        let grid = process_radar_grid_data(&records, &palette(), &SortingOptions::default());

        for score in all_scores(&grid) {
            assert!((0.0..=100.0).contains(&score), "{score}");
        }
    }

    #[test]
    fn zero_variance_scores_zero() {
        let records = vec![
            on_host(measured("A", "4K", "read", 100.0, 1.0, 10.0), "h1", "NVMe"),
            on_host(measured("B", "4K", "read", 100.0, 1.0, 10.0), "h2", "NVMe"),
        ];

        let grid = process_radar_grid_data(&records, &palette(), &SortingOptions::default());

        for pool in grid.iter().flat_map(|e| &e.pools) {
            assert_eq!(pool.metrics.iops, 0.0);
            assert_eq!(pool.metrics.latency, 0.0);
            assert_eq!(pool.metrics.bandwidth, 0.0);
            // not reported at all
            assert_eq!(pool.metrics.p95_latency, 0.0);
        }
    }

    #[test]
    fn missing_hostname_is_unknown() {
        let records = vec![measured("A", "4K", "read", 100.0, 1.0, 10.0)];
        let grid = process_radar_grid_data(&records, &palette(), &SortingOptions::default());

        assert_eq!(grid[0].hostname, "Unknown");
        assert_eq!(grid[0].pools[0].metrics.consistency, 100.0);
    }

    #[test]
    fn empty_input() {
        assert!(process_radar_grid_data(&[], &palette(), &SortingOptions::default()).is_empty());
    }

    #[test]
    fn consistency_is_monotonic_in_variance() {
        let steady = consistency_score(&[100.0, 100.0, 100.0]);
        let mild = consistency_score(&[90.0, 100.0, 110.0]);
        let wild = consistency_score(&[10.0, 100.0, 190.0]);

        assert_eq!(steady, 100.0);
        assert!(steady > mild);
        assert!(mild > wild);
        assert!(wild >= 0.0);

        assert_eq!(consistency_score(&[]), 100.0);
        assert_eq!(consistency_score(&[42.0]), 100.0);
        assert_eq!(consistency_score(&[0.0, 0.0]), 100.0);
        assert_eq!(consistency_score(&[1.0, 1_000_000.0, 0.0, 0.0]), 0.0);
    }
}
