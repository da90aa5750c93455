//! Chart-ready transformations of storage benchmark results.
//!
//! Records come from the persistence layer as plain data. This crate sorts and
//! groups them, builds per-template chart datasets, normalizes radar scores,
//! assembles time series and works out which filter options remain
//! selectable. Nothing here performs I/O and nothing here fails on malformed
//! but present input: absent values degrade to 0, an empty string or
//! `"Unknown"`.

mod chart;
mod error;
mod filter;
mod metric;
mod radar;
mod record;
mod sort;
mod template;
mod units;

pub mod timeseries;

#[cfg(test)]
mod test_support;

pub use chart::{
    AXIS_BANDWIDTH, AXIS_IOPS, AXIS_LATENCY, ChartDataset, DEFAULT_COLORS, Dataset, SeriesKind,
    color_at, default_colors,
};
pub use error::ParseError;
pub use filter::{
    Dimension, FilterAvailability, FilterSelection, OptionAvailability, apply_filters,
    compute_availability, filter_options,
};
pub use metric::get_metric_value;
pub use radar::{
    RadarGridEntry, RadarMetrics, RadarPool, consistency_score, process_radar_grid_data,
};
pub use record::{
    Measured, MetricValue, Metrics, Operation, OperationMetrics, PerformanceRecord, dedup_records,
};
pub use sort::{
    GroupBy, RecordGroup, SortBy, SortOrder, SortValue, SortingOptions,
    apply_sorting_and_grouping, compare_group_keys, compare_values, format_group_key,
    get_sort_value, group_records, locale_compare, sorted_records,
};
pub use template::{Template, process_data_for_template};
pub use units::{block_size_bytes, compare_block_sizes, metric_unit, sort_block_sizes};
