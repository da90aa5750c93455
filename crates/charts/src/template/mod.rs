use crate::chart::*;
use crate::error::ParseError;
use crate::metric::get_metric_value;
use crate::record::{Operation, PerformanceRecord};
use crate::sort::{GroupBy, SortingOptions, group_records, sorted_records};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

mod block_size;
mod generic;
mod iops_latency;
mod overview;
mod read_write;


/// The chart shapes the processor knows how to build.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    #[serde(rename = "performance-overview")]
    Overview,
    BlockSizeImpact,
    ReadWriteComparison,
    #[serde(rename = "iops-latency-dual")]
    IopsLatency,
    #[serde(rename = "default")]
    Generic,
}

impl Template {
    pub const ALL: &'static [Template] = &[
        Self::Overview,
        Self::BlockSizeImpact,
        Self::ReadWriteComparison,
        Self::IopsLatency,
        Self::Generic,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Overview => "performance-overview",
            Self::BlockSizeImpact => "block-size-impact",
            Self::ReadWriteComparison => "read-write-comparison",
            Self::IopsLatency => "iops-latency-dual",
            Self::Generic => "default",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Overview => "Performance Overview",
            Self::BlockSizeImpact => "Block Size Impact",
            Self::ReadWriteComparison => "Read vs Write",
            Self::IopsLatency => "IOPS vs Latency",
            Self::Generic => "IOPS",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Template {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .find(|t| t.id() == s)
            .copied()
            .ok_or_else(|| ParseError::Template(s.to_string()))
    }
}

/// Builds the chart dataset for a template. Records are sorted (and grouped)
/// according to `options` first; the input slice is not modified.
pub fn process_data_for_template(
    template: Template,
    records: &[PerformanceRecord],
    colors: &[String],
    options: &SortingOptions,
) -> ChartDataset {
    let sorted = sorted_records(records, options);

    let chart = match template {
        Template::Overview => overview::generate(&sorted, colors, options),
        Template::BlockSizeImpact => block_size::generate(&sorted, colors, options),
        Template::ReadWriteComparison => read_write::generate(&sorted, colors, options),
        Template::IopsLatency => iops_latency::generate(&sorted, colors, options),
        Template::Generic => generic::generate(&sorted, colors, options),
    };

    debug!(
        "{template}: {} records -> {} labels, {} datasets",
        records.len(),
        chart.labels.len(),
        chart.datasets.len()
    );

    chart
}

/// `drive - blocksize - pattern`
pub(crate) fn item_label(record: &PerformanceRecord) -> String {
    format!(
        "{} - {} - {}",
        record.drive_model, record.block_size, record.read_write_pattern
    )
}

/// Item label, qualified with the group key when the item label alone would
/// not keep groups apart.
pub(crate) fn qualified_item_label(
    record: &PerformanceRecord,
    key: &str,
    group_by: GroupBy,
) -> String {
    if group_by.implied_by_item_label() {
        item_label(record)
    } else {
        format!("{} ({key})", item_label(record))
    }
}

/// One group of a grouped chart, indexed by label.
pub(crate) struct LabeledGroup<'a> {
    pub key: String,
    by_label: HashMap<String, &'a PerformanceRecord>,
}

impl<'a> LabeledGroup<'a> {
    pub fn get(&self, label: &str) -> Option<&'a PerformanceRecord> {
        self.by_label.get(label).copied()
    }
}

/// The union label axis of a grouped chart plus each group's records keyed
/// by label. The first record of a group claims a label.
pub(crate) struct GroupedLabels<'a> {
    pub labels: Vec<String>,
    pub groups: Vec<LabeledGroup<'a>>,
}

impl<'a> GroupedLabels<'a> {
    pub fn build<F>(sorted: &[&'a PerformanceRecord], group_by: GroupBy, label_of: F) -> Self
    where
        F: Fn(&PerformanceRecord, &str) -> String,
    {
        let mut labels: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        let mut groups = Vec::new();

        for group in group_records(sorted, group_by) {
            let mut by_label = HashMap::new();

            for record in &group.records {
                let label = label_of(*record, &group.key);

                if seen.insert(label.clone()) {
                    labels.push(label.clone());
                }

                by_label.entry(label).or_insert(*record);
            }

            groups.push(LabeledGroup {
                key: group.key,
                by_label,
            });
        }

        Self { labels, groups }
    }

    /// Fills a dataset with one value per label, zero where the group has no
    /// record for the label.
    pub fn fill(
        &self,
        dataset: &mut Dataset,
        group: &LabeledGroup<'a>,
        metric: &str,
        operation: Option<Operation>,
    ) {
        for label in &self.labels {
            match group.get(label) {
                Some(record) => dataset.push(
                    get_metric_value(&record.metrics, metric, operation),
                    Some(record),
                ),
                None => dataset.push(0.0, None),
            }
        }
    }
}

/// A value series drawn from one metric.
pub(crate) struct SeriesSpec {
    pub name: &'static str,
    pub metric: &'static str,
    pub axis: Option<&'static str>,
    pub kind: Option<SeriesKind>,
}

impl SeriesSpec {
    fn dataset(&self, label: String, color: String) -> Dataset {
        let mut dataset = Dataset::new(label, color);
        dataset.axis_id = self.axis.map(|a| a.to_string());
        dataset.kind = self.kind;
        dataset
    }
}

/// One point per sorted record for each series.
pub(crate) fn per_record<F>(
    sorted: &[&PerformanceRecord],
    series: &[SeriesSpec],
    colors: &[String],
    label_of: F,
) -> ChartDataset
where
    F: Fn(&PerformanceRecord) -> String,
{
    let mut chart = ChartDataset::new(sorted.iter().map(|r| label_of(*r)).collect());

    for (i, spec) in series.iter().enumerate() {
        let mut dataset = spec.dataset(spec.name.to_string(), color_at(colors, i));

        for record in sorted {
            dataset.push(get_metric_value(&record.metrics, spec.metric, None), Some(*record));
        }

        chart.push(dataset);
    }

    chart
}

/// The series repeated for every group over the union label axis. Color
/// indices advance by the number of series per group so groups never share
/// a full set of colors.
pub(crate) fn per_group<F>(
    sorted: &[&PerformanceRecord],
    series: &[SeriesSpec],
    colors: &[String],
    group_by: GroupBy,
    label_of: F,
) -> ChartDataset
where
    F: Fn(&PerformanceRecord, &str) -> String,
{
    let index = GroupedLabels::build(sorted, group_by, label_of);
    let mut chart = ChartDataset::new(index.labels.clone());

    for (g, group) in index.groups.iter().enumerate() {
        for (i, spec) in series.iter().enumerate() {
            let label = if series.len() == 1 {
                group.key.clone()
            } else {
                format!("{} - {}", group.key, spec.name)
            };

            let mut dataset = spec.dataset(label, color_at(colors, g * series.len() + i));
            index.fill(&mut dataset, group, spec.metric, None);
            chart.push(dataset);
        }
    }

    chart
}
