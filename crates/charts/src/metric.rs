use crate::record::{MetricValue, Metrics, Operation};

/// Reads a metric out of a record's metric bag.
///
/// An operation-split metric answers the requested operation when present
/// and otherwise falls back to its `combined` entry. A flat metric (scalar or
/// value with unit) answers regardless of the requested operation. Anything
/// else, including an absent metric, reads as zero.
pub fn get_metric_value(metrics: &Metrics, name: &str, operation: Option<Operation>) -> f64 {
    let value = match metrics.get(name) {
        Some(MetricValue::ByOperation(ops)) => operation
            .and_then(|op| ops.get(op))
            .or(ops.combined.as_ref())
            .map(|m| m.value),
        Some(MetricValue::Measured(m)) => Some(m.value),
        Some(MetricValue::Scalar(v)) => Some(*v),
        Some(MetricValue::Other(_)) | None => None,
    };

    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(json: &str) -> Metrics {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn scalar() {
        assert_eq!(get_metric_value(&bag(r#"{"iops": 500}"#), "iops", None), 500.0);
    }

    #[test]
    fn value_with_unit() {
        let metrics = bag(r#"{"iops": {"value": 500, "unit": "IOPS"}}"#);
        assert_eq!(get_metric_value(&metrics, "iops", None), 500.0);
        assert_eq!(get_metric_value(&metrics, "iops", Some(Operation::Read)), 500.0);
    }

    #[test]
    fn absent_is_zero() {
        assert_eq!(get_metric_value(&bag("{}"), "iops", None), 0.0);
        assert_eq!(get_metric_value(&bag("{}"), "iops", Some(Operation::Write)), 0.0);
    }

    #[test]
    fn by_operation() {
        let metrics = bag(r#"{"iops": {"read": {"value": 10}, "write": {"value": 20}}}"#);
        assert_eq!(get_metric_value(&metrics, "iops", Some(Operation::Write)), 20.0);
        assert_eq!(get_metric_value(&metrics, "iops", Some(Operation::Read)), 10.0);
        assert_eq!(get_metric_value(&metrics, "iops", None), 0.0);
    }

    #[test]
    fn by_operation_falls_back_to_combined() {
        let metrics = bag(r#"{"iops": {"read": {"value": 10}, "combined": {"value": 15}}}"#);
        assert_eq!(get_metric_value(&metrics, "iops", None), 15.0);
        assert_eq!(get_metric_value(&metrics, "iops", Some(Operation::Write)), 15.0);
        assert_eq!(get_metric_value(&metrics, "iops", Some(Operation::Read)), 10.0);
    }

    #[test]
    fn unrecognized_shapes_are_zero() {
        let metrics = bag(
            r#"{"a": {"unit": "ms"}, "b": "fast", "c": [1, 2], "d": null, "e": {"value": "x"}}"#,
        );
        for name in ["a", "b", "c", "d", "e"] {
            assert_eq!(get_metric_value(&metrics, name, None), 0.0, "{name}");
        }
    }
}
