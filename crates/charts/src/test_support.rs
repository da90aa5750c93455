use crate::record::{MetricValue, PerformanceRecord};

pub fn record(drive: &str, block_size: &str, pattern: &str) -> PerformanceRecord {
    PerformanceRecord {
        drive_model: drive.to_string(),
        test_name: "fio".to_string(),
        block_size: block_size.to_string(),
        read_write_pattern: pattern.to_string(),
        queue_depth: 1,
        timestamp: "2025-01-01T00:00:00Z".to_string(),
        ..Default::default()
    }
}

pub fn with_metric(mut record: PerformanceRecord, name: &str, value: f64) -> PerformanceRecord {
    record
        .metrics
        .insert(name.to_string(), MetricValue::Scalar(value));
    record
}

pub fn measured(
    drive: &str,
    block_size: &str,
    pattern: &str,
    iops: f64,
    latency: f64,
    bandwidth: f64,
) -> PerformanceRecord {
    let r = record(drive, block_size, pattern);
    let r = with_metric(r, "iops", iops);
    let r = with_metric(r, "avg_latency", latency);
    with_metric(r, "bandwidth", bandwidth)
}

pub fn on_host(mut record: PerformanceRecord, hostname: &str, protocol: &str) -> PerformanceRecord {
    record.hostname = Some(hostname.to_string());
    record.protocol = Some(protocol.to_string());
    record
}

pub fn palette() -> Vec<String> {
    ["c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}
