use super::*;

const SERIES: &[SeriesSpec] = &[SeriesSpec {
    name: "IOPS",
    metric: "iops",
    axis: None,
    kind: None,
}];

fn test_label(record: &PerformanceRecord) -> String {
    format!("{} - {}", record.test_name, record.drive_model)
}

pub fn generate(
    sorted: &[&PerformanceRecord],
    colors: &[String],
    options: &SortingOptions,
) -> ChartDataset {
    let group_by = options.group_by;

    if !group_by.is_grouped() {
        return per_record(sorted, SERIES, colors, test_label);
    }

    per_group(sorted, SERIES, colors, group_by, |record, key| {
        // the drive model is already part of the label
        if group_by == GroupBy::Drive {
            test_label(record)
        } else {
            format!("{} ({key})", test_label(record))
        }
    })
}
