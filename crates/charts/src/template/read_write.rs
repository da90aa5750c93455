use super::*;

/// The operation a pattern exercises, when it exercises only one. Mixed
/// patterns (`randrw`, `readwrite`, ...) belong to neither side.
pub(crate) fn strict_side(pattern: &str) -> Option<Operation> {
    let pattern = pattern.to_lowercase();

    match (pattern.contains("read"), pattern.contains("write")) {
        (true, false) => Some(Operation::Read),
        (false, true) => Some(Operation::Write),
        _ => None,
    }
}

fn side_label(record: &PerformanceRecord) -> String {
    format!("{} - {}", record.drive_model, record.block_size)
}

/// Read IOPS next to write IOPS for each drive and block size.
pub fn generate(
    sorted: &[&PerformanceRecord],
    colors: &[String],
    _options: &SortingOptions,
) -> ChartDataset {
    let mut labels: Vec<String> = Vec::new();
    let mut reads: HashMap<String, &PerformanceRecord> = HashMap::new();
    let mut writes: HashMap<String, &PerformanceRecord> = HashMap::new();

    for side in [Operation::Read, Operation::Write] {
        for record in sorted.iter().filter(|r| strict_side(&r.read_write_pattern) == Some(side)) {
            let label = side_label(record);

            if !labels.contains(&label) {
                labels.push(label.clone());
            }

            let index = match side {
                Operation::Read => &mut reads,
                _ => &mut writes,
            };
            index.entry(label).or_insert(*record);
        }
    }

    let mut chart = ChartDataset::new(labels);

    for (i, (name, side, index)) in [
        ("Read IOPS", Operation::Read, &reads),
        ("Write IOPS", Operation::Write, &writes),
    ]
    .into_iter()
    .enumerate()
    {
        let mut dataset = Dataset::new(name, color_at(colors, i))
            .on_axis(AXIS_IOPS)
            .drawn_as(SeriesKind::Bar);

        for label in &chart.labels {
            match index.get(label) {
                Some(record) => dataset.push(
                    get_metric_value(&record.metrics, "iops", Some(side)),
                    Some(*record),
                ),
                None => dataset.push(0.0, None),
            }
        }

        chart.push(dataset);
    }

    chart
}
