use super::*;
use crate::units::compare_block_sizes;

/// IOPS and bandwidth per drive model across every observed block size.
pub fn generate(
    sorted: &[&PerformanceRecord],
    colors: &[String],
    _options: &SortingOptions,
) -> ChartDataset {
    let mut block_sizes: Vec<&str> = Vec::new();

    for record in sorted {
        if !block_sizes.contains(&record.block_size.as_str()) {
            block_sizes.push(&record.block_size);
        }
    }

    block_sizes.sort_by(|a, b| compare_block_sizes(a, b));

    let mut chart = ChartDataset::new(block_sizes.iter().map(|s| s.to_string()).collect());

    for (i, group) in group_records(sorted, GroupBy::Drive).iter().enumerate() {
        let mut iops = Dataset::new(format!("{} - IOPS", group.key), color_at(colors, i * 2))
            .on_axis(AXIS_IOPS)
            .drawn_as(SeriesKind::Line);
        let mut bandwidth = Dataset::new(
            format!("{} - Bandwidth (MB/s)", group.key),
            color_at(colors, i * 2 + 1),
        )
        .on_axis(AXIS_BANDWIDTH)
        .drawn_as(SeriesKind::Line);

        for block_size in &block_sizes {
            let record = group
                .records
                .iter()
                .find(|r| r.block_size == *block_size)
                .copied();

            match record {
                Some(record) => {
                    iops.push(get_metric_value(&record.metrics, "iops", None), Some(record));
                    bandwidth.push(
                        get_metric_value(&record.metrics, "bandwidth", None),
                        Some(record),
                    );
                }
                None => {
                    iops.push(0.0, None);
                    bandwidth.push(0.0, None);
                }
            }
        }

        chart.push(iops);
        chart.push(bandwidth);
    }

    chart
}
