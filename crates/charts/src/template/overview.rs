use super::*;

const SERIES: &[SeriesSpec] = &[
    SeriesSpec {
        name: "IOPS",
        metric: "iops",
        axis: Some(AXIS_IOPS),
        kind: None,
    },
    SeriesSpec {
        name: "Avg Latency (ms)",
        metric: "avg_latency",
        axis: Some(AXIS_LATENCY),
        kind: None,
    },
    SeriesSpec {
        name: "Bandwidth (MB/s)",
        metric: "bandwidth",
        axis: Some(AXIS_BANDWIDTH),
        kind: None,
    },
];

/// IOPS, latency and bandwidth side by side, each on its own axis.
pub fn generate(
    sorted: &[&PerformanceRecord],
    colors: &[String],
    options: &SortingOptions,
) -> ChartDataset {
    let group_by = options.group_by;

    if !group_by.is_grouped() {
        return per_record(sorted, SERIES, colors, item_label);
    }

    per_group(sorted, SERIES, colors, group_by, |record, key| {
        qualified_item_label(record, key, group_by)
    })
}
