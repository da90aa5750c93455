use thiserror::Error;

/// Errors returned when parsing one of the closed option sets from text.
#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("unknown chart template: {0}")]
    /// No template has this id
    Template(String),
    #[error("unknown sort key: {0}")]
    /// No sort key has this id
    SortBy(String),
    #[error("unknown sort order: {0} (expected asc or desc)")]
    /// Sort order is neither ascending nor descending
    SortOrder(String),
    #[error("unknown grouping: {0}")]
    /// No grouping has this id
    GroupBy(String),
    #[error("unknown time-series metric: {0}")]
    /// Not one of the metrics carried by time-series points
    MetricType(String),
    #[error("unknown filter dimension: {0}")]
    /// No filter dimension has this name
    Dimension(String),
}
