use super::*;

const SERIES: &[SeriesSpec] = &[
    SeriesSpec {
        name: "IOPS",
        metric: "iops",
        axis: Some(AXIS_IOPS),
        kind: Some(SeriesKind::Bar),
    },
    SeriesSpec {
        name: "Avg Latency (ms)",
        metric: "avg_latency",
        axis: Some(AXIS_LATENCY),
        kind: Some(SeriesKind::Line),
    },
];

/// IOPS bars on the primary axis with the latency trend line on the
/// secondary axis.
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
