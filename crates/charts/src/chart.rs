use crate::record::PerformanceRecord;
use serde::{Deserialize, Serialize};

/// Palette used when the caller has no colors of its own.
pub const DEFAULT_COLORS: &[&str] = &[
    "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#06b6d4", "#84cc16",
    "#f97316", "#6366f1",
];

pub fn default_colors() -> Vec<String> {
    DEFAULT_COLORS.iter().map(|c| c.to_string()).collect()
}

/// Picks a palette entry, wrapping around. An empty palette yields an empty
/// color rather than failing.
pub fn color_at(colors: &[String], index: usize) -> String {
    if colors.is_empty() {
        return String::new();
    }

    colors[index % colors.len()].clone()
}

// axis ids understood by the chart layer
pub const AXIS_IOPS: &str = "y";
pub const AXIS_LATENCY: &str = "y1";
pub const AXIS_BANDWIDTH: &str = "y2";

/// How a series is drawn when a chart mixes shapes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Bar,
    Line,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<SeriesKind>,
    // one entry per data point, `None` where the value was filled in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub original_data: Vec<Option<PerformanceRecord>>,
}

impl Dataset {
    pub fn new<T: Into<String>>(label: T, color: String) -> Self {
        Self {
            label: label.into(),
            data: Vec::new(),
            color,
            axis_id: None,
            kind: None,
            original_data: Vec::new(),
        }
    }

    pub fn on_axis(mut self, axis: &str) -> Self {
        self.axis_id = Some(axis.to_string());
        self
    }

    pub fn drawn_as(mut self, kind: SeriesKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Appends a point together with the record it came from.
    pub fn push(&mut self, value: f64, origin: Option<&PerformanceRecord>) {
        self.data.push(value);
        self.original_data.push(origin.cloned());
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartDataset {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            datasets: Vec::new(),
        }
    }

    pub fn push(&mut self, dataset: Dataset) {
        self.datasets.push(dataset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_wrap_around() {
        let colors = vec!["a".to_string(), "b".to_string()];
        assert_eq!(color_at(&colors, 0), "a");
        assert_eq!(color_at(&colors, 3), "b");
        assert_eq!(color_at(&[], 3), "");
    }

    #[test]
    fn serializes_in_chart_layer_shape() {
        let mut dataset = Dataset::new("IOPS", "#fff".to_string()).on_axis(AXIS_IOPS);
        dataset.push(1.0, None);

        let mut chart = ChartDataset::new(vec!["A".to_string()]);
        chart.push(dataset);

        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["labels"][0], "A");
        assert_eq!(json["datasets"][0]["axisId"], "y");
        assert_eq!(json["datasets"][0]["data"][0], 1.0);
        assert!(json["datasets"][0].get("kind").is_none());
        assert!(json["datasets"][0]["originalData"][0].is_null());
    }
}
