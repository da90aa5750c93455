use std::cmp::Ordering;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Converts a block size such as `4K`, `1m` or `512` into bytes. A missing
/// suffix means bytes. Input without a numeric prefix is treated as zero so
/// that ordering stays total.
pub fn block_size_bytes(size: &str) -> f64 {
    let size = size.trim();

    let split = size
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(size.len());

    let (number, suffix) = size.split_at(split);

    let number = match number.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => return 0.0,
    };

    let multiplier = match suffix.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('K') => KIB,
        Some('M') => MIB,
        Some('G') => GIB,
        _ => 1.0,
    };

    number * multiplier
}

/// Orders two block sizes by their byte count.
pub fn compare_block_sizes(a: &str, b: &str) -> Ordering {
    block_size_bytes(a).total_cmp(&block_size_bytes(b))
}

/// Returns the block sizes in ascending byte order. Sizes of equal magnitude
/// keep their input order.
pub fn sort_block_sizes<S: AsRef<str> + Clone>(sizes: &[S]) -> Vec<S> {
    let mut sorted = sizes.to_vec();
    sorted.sort_by(|a, b| compare_block_sizes(a.as_ref(), b.as_ref()));
    sorted
}

/// Display unit of a metric.
pub fn metric_unit(metric: &str) -> &'static str {
    match metric {
        "iops" => "IOPS",
        "avg_latency" | "p95_latency" | "p99_latency" => "ms",
        "bandwidth" => "MB/s",
        _ => "",
    }
}
