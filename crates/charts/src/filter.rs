use crate::error::ParseError;
use crate::record::PerformanceRecord;
use crate::units::compare_block_sizes;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A filterable attribute of a record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    BlockSizes,
    Patterns,
    QueueDepths,
    NumJobs,
    Protocols,
    HostDiskCombinations,
    Syncs,
    Directs,
    IoDepths,
    TestSizes,
    Durations,
}

impl Dimension {
    pub const ALL: &'static [Dimension] = &[
        Self::BlockSizes,
        Self::Patterns,
        Self::QueueDepths,
        Self::NumJobs,
        Self::Protocols,
        Self::HostDiskCombinations,
        Self::Syncs,
        Self::Directs,
        Self::IoDepths,
        Self::TestSizes,
        Self::Durations,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::BlockSizes => "blockSizes",
            Self::Patterns => "patterns",
            Self::QueueDepths => "queueDepths",
            Self::NumJobs => "numJobs",
            Self::Protocols => "protocols",
            Self::HostDiskCombinations => "hostDiskCombinations",
            Self::Syncs => "syncs",
            Self::Directs => "directs",
            Self::IoDepths => "ioDepths",
            Self::TestSizes => "testSizes",
            Self::Durations => "durations",
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::QueueDepths
                | Self::NumJobs
                | Self::Syncs
                | Self::Directs
                | Self::IoDepths
                | Self::Durations
        )
    }

    /// The record's value in this dimension, as the filter UI spells it.
    /// `None` when the record does not carry the attribute.
    pub fn value_of(&self, record: &PerformanceRecord) -> Option<String> {
        match self {
            Self::BlockSizes => Some(record.block_size.clone()),
            Self::Patterns => Some(record.read_write_pattern.clone()),
            Self::QueueDepths => Some(record.queue_depth.to_string()),
            Self::NumJobs => record.num_jobs.map(|n| n.to_string()),
            Self::Protocols => record.protocol.clone(),
            Self::HostDiskCombinations => Some(record.host_disk_combination()),
            Self::Syncs => record.sync.map(|s| s.to_string()),
            Self::Directs => record.direct.map(|d| d.to_string()),
            Self::IoDepths => Some(record.effective_iodepth().to_string()),
            Self::TestSizes => record.test_size.clone(),
            Self::Durations => record.duration.map(|d| d.to_string()),
        }
    }

    /// Ordering of option values within this dimension.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            Self::BlockSizes => compare_block_sizes(a, b).then_with(|| a.cmp(b)),
            _ if self.is_numeric() => {
                let parse = |s: &str| s.trim().parse::<f64>().unwrap_or(0.0);
                parse(a).total_cmp(&parse(b)).then_with(|| a.cmp(b))
            }
            _ => a.cmp(b),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Dimension {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .find(|d| d.id().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| ParseError::Dimension(s.to_string()))
    }
}

/// Accepted values per dimension. A dimension with no accepted values places
/// no restriction. Dimensions combine with AND, values within one with OR.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSelection(BTreeMap<Dimension, BTreeSet<String>>);

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an accepted value.
    pub fn select<T: Into<String>>(mut self, dimension: Dimension, value: T) -> Self {
        self.0.entry(dimension).or_default().insert(value.into());
        self
    }

    pub fn selected(&self, dimension: Dimension) -> Option<&BTreeSet<String>> {
        self.0.get(&dimension).filter(|values| !values.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|values| values.is_empty())
    }

    fn accepts(&self, dimension: Dimension, record: &PerformanceRecord) -> bool {
        match self.selected(dimension) {
            None => true,
            Some(values) => dimension
                .value_of(record)
                .is_some_and(|value| values.contains(&value)),
        }
    }

    pub fn matches(&self, record: &PerformanceRecord) -> bool {
        Dimension::ALL.iter().all(|d| self.accepts(*d, record))
    }

    /// Matches with one dimension's restriction lifted.
    pub fn matches_except(&self, record: &PerformanceRecord, relaxed: Dimension) -> bool {
        Dimension::ALL
            .iter()
            .filter(|d| **d != relaxed)
            .all(|d| self.accepts(*d, record))
    }
}

pub fn apply_filters<'a>(
    records: &'a [PerformanceRecord],
    selection: &FilterSelection,
) -> Vec<&'a PerformanceRecord> {
    records.iter().filter(|r| selection.matches(r)).collect()
}

/// The distinct values present in each dimension, ordered for display.
/// Dimensions no record carries map to an empty list.
pub fn filter_options(records: &[PerformanceRecord]) -> BTreeMap<Dimension, Vec<String>> {
    Dimension::ALL
        .iter()
        .map(|dimension| {
            let distinct: BTreeSet<String> =
                records.iter().filter_map(|r| dimension.value_of(r)).collect();

            let mut values: Vec<String> = distinct.into_iter().collect();
            values.sort_by(|a, b| dimension.compare(a, b));

            (*dimension, values)
        })
        .collect()
}

/// Whether an option would still leave records if selected, and how many.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionAvailability {
    pub value: String,
    pub count: usize,
    pub available: bool,
}

/// Per dimension, every option of the full domain with its availability
/// under the other dimensions' current selections.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterAvailability(BTreeMap<Dimension, Vec<OptionAvailability>>);

impl FilterAvailability {
    pub fn options(&self, dimension: Dimension) -> &[OptionAvailability] {
        self.0.get(&dimension).map(Vec::as_slice).unwrap_or_default()
    }

    fn find(&self, dimension: Dimension, value: &str) -> Option<&OptionAvailability> {
        self.options(dimension).iter().find(|o| o.value == value)
    }

    pub fn is_available(&self, dimension: Dimension, value: &str) -> bool {
        self.find(dimension, value).is_some_and(|o| o.available)
    }

    pub fn count(&self, dimension: Dimension, value: &str) -> usize {
        self.find(dimension, value).map(|o| o.count).unwrap_or(0)
    }
}

/// For each dimension, counts the records that selecting each option would
/// leave, holding every other dimension's selection fixed and ignoring the
/// dimension's own.
///
/// Selecting `v` in `D` replaces `D`'s selection, so the records left are
/// those passing every other dimension whose `D` value is `v`. One scan per
/// dimension counts them for all options at once.
pub fn compute_availability(
    records: &[PerformanceRecord],
    selection: &FilterSelection,
) -> FilterAvailability {
    let domain = filter_options(records);
    let mut availability = BTreeMap::new();

    for dimension in Dimension::ALL {
        let mut counts: HashMap<String, usize> = HashMap::new();

        for record in records.iter().filter(|r| selection.matches_except(r, *dimension)) {
            if let Some(value) = dimension.value_of(record) {
                *counts.entry(value).or_default() += 1;
            }
        }

        let options: Vec<OptionAvailability> = domain
            .get(dimension)
            .into_iter()
            .flatten()
            .map(|value| {
                let count = counts.get(value).copied().unwrap_or(0);

                OptionAvailability {
                    value: value.clone(),
                    count,
                    available: count > 0,
                }
            })
            .collect();

        availability.insert(*dimension, options);
    }

    debug!(
        "filter availability over {} records, {} active dimension(s)",
        records.len(),
        Dimension::ALL
            .iter()
            .filter(|d| selection.selected(**d).is_some())
            .count()
    );

    FilterAvailability(availability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn pair() -> Vec<PerformanceRecord> {
        vec![record("A", "4k", "read"), record("A", "8k", "write")]
    }

    #[test]
    fn dimension_names() {
        for dimension in Dimension::ALL {
            assert_eq!(dimension.id().parse::<Dimension>(), Ok(*dimension));
            assert_eq!(
                serde_json::to_value(dimension).unwrap(),
                serde_json::Value::String(dimension.id().to_string())
            );
        }
        assert_eq!(
            "drives".parse::<Dimension>(),
            Err(ParseError::Dimension("drives".to_string()))
        );
    }

    #[test]
    fn conjunction_across_dimensions() {
        let records = pair();

        let hit = FilterSelection::new()
            .select(Dimension::BlockSizes, "4k")
            .select(Dimension::Patterns, "read");
        assert_eq!(apply_filters(&records, &hit), vec![&records[0]]);

        let miss = FilterSelection::new()
            .select(Dimension::BlockSizes, "4k")
            .select(Dimension::Patterns, "write");
        assert!(apply_filters(&records, &miss).is_empty());
    }

    #[test]
    fn disjunction_within_a_dimension() {
        let records = pair();
        let selection = FilterSelection::new()
            .select(Dimension::BlockSizes, "4k")
            .select(Dimension::BlockSizes, "8k");

        assert_eq!(apply_filters(&records, &selection).len(), 2);
        assert_eq!(apply_filters(&records, &FilterSelection::new()).len(), 2);
    }

    #[test]
    fn absent_attribute_fails_a_restriction() {
        let mut with_jobs = record("A", "4K", "read");
        with_jobs.num_jobs = Some(4);
        let records = vec![with_jobs, record("B", "4K", "read")];

        let selection = FilterSelection::new().select(Dimension::NumJobs, "4");
        let kept = apply_filters(&records, &selection);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].drive_model, "A");
    }

    #[test]
    fn options_are_ordered_per_dimension() {
        let mut records = Vec::new();
        for (bs, qd) in [("1M", 32), ("4K", 8), ("512K", 128), ("4K", 1)] {
            let mut r = on_host(record("A", bs, "read"), "h1", "NVMe");
            r.queue_depth = qd;
            records.push(r);
        }

        let options = filter_options(&records);

        assert_eq!(options[&Dimension::BlockSizes], vec!["4K", "512K", "1M"]);
        assert_eq!(options[&Dimension::QueueDepths], vec!["1", "8", "32", "128"]);
        assert_eq!(options[&Dimension::HostDiskCombinations], vec!["h1 - NVMe - A"]);
        assert!(options[&Dimension::Durations].is_empty());
    }

    #[test]
    fn availability_ignores_own_dimension() {
        let records = vec![
            record("A", "4K", "read"),
            record("A", "4K", "write"),
            record("A", "8K", "read"),
            record("A", "16K", "randwrite"),
        ];

        let selection = FilterSelection::new()
            .select(Dimension::BlockSizes, "4K")
            .select(Dimension::Patterns, "read");
        let availability = compute_availability(&records, &selection);

        // block sizes are judged under patterns = read
        assert!(availability.is_available(Dimension::BlockSizes, "4K"));
        assert!(availability.is_available(Dimension::BlockSizes, "8K"));
        assert!(!availability.is_available(Dimension::BlockSizes, "16K"));
        assert_eq!(availability.count(Dimension::BlockSizes, "16K"), 0);

        // patterns are judged under block size = 4K
        assert_eq!(availability.count(Dimension::Patterns, "read"), 1);
        assert_eq!(availability.count(Dimension::Patterns, "write"), 1);
        assert!(!availability.is_available(Dimension::Patterns, "randwrite"));

        // unselected dimensions see the full selection
        assert_eq!(availability.count(Dimension::QueueDepths, "1"), 1);
        assert_eq!(availability.options(Dimension::BlockSizes).len(), 3);
    }

    #[test]
    fn availability_agrees_with_hypothetical_selection() {
        let mut records = Vec::new();
        for (i, (bs, pattern, host)) in [
            ("4K", "read", "h1"),
            ("4K", "write", "h2"),
            ("8K", "read", "h2"),
            ("1M", "randread", "h1"),
            ("8K", "randwrite", "h1"),
        ]
        .iter()
        .enumerate()
        {
            let mut r = on_host(record("A", bs, pattern), host, "NVMe");
            r.direct = Some((i % 2) as u8);
            records.push(r);
        }

        let selection = FilterSelection::new()
            .select(Dimension::Protocols, "NVMe")
            .select(Dimension::Directs, "1")
            .select(Dimension::HostDiskCombinations, "h2 - NVMe - A");
        let availability = compute_availability(&records, &selection);

        for (dimension, values) in filter_options(&records) {
            for value in values {
                let mut hypothetical = selection.clone();
                hypothetical.0.insert(dimension, BTreeSet::from([value.clone()]));
                let expected = apply_filters(&records, &hypothetical).len();

                assert_eq!(availability.count(dimension, &value), expected, "{dimension} {value}");
                assert_eq!(availability.is_available(dimension, &value), expected > 0);
            }
        }
    }
}
