use crate::error::ParseError;
use crate::metric::get_metric_value;
use crate::record::PerformanceRecord;
use crate::units::compare_block_sizes;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Name,
    Iops,
    Latency,
    Bandwidth,
    BlockSize,
    DriveModel,
    Protocol,
    Hostname,
    QueueDepth,
}

impl SortBy {
    pub const ALL: &'static [SortBy] = &[
        Self::Name,
        Self::Iops,
        Self::Latency,
        Self::Bandwidth,
        Self::BlockSize,
        Self::DriveModel,
        Self::Protocol,
        Self::Hostname,
        Self::QueueDepth,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Iops => "iops",
            Self::Latency => "latency",
            Self::Bandwidth => "bandwidth",
            Self::BlockSize => "blocksize",
            Self::DriveModel => "drivemodel",
            Self::Protocol => "protocol",
            Self::Hostname => "hostname",
            Self::QueueDepth => "queuedepth",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    None,
    Drive,
    Test,
    BlockSize,
    Protocol,
    Hostname,
    QueueDepth,
    IoDepth,
    NumJobs,
    Direct,
    Sync,
    TestSize,
    Duration,
}

impl GroupBy {
    pub const ALL: &'static [GroupBy] = &[
        Self::None,
        Self::Drive,
        Self::Test,
        Self::BlockSize,
        Self::Protocol,
        Self::Hostname,
        Self::QueueDepth,
        Self::IoDepth,
        Self::NumJobs,
        Self::Direct,
        Self::Sync,
        Self::TestSize,
        Self::Duration,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Drive => "drive",
            Self::Test => "test",
            Self::BlockSize => "blocksize",
            Self::Protocol => "protocol",
            Self::Hostname => "hostname",
            Self::QueueDepth => "queuedepth",
            Self::IoDepth => "iodepth",
            Self::NumJobs => "numjobs",
            Self::Direct => "direct",
            Self::Sync => "sync",
            Self::TestSize => "testsize",
            Self::Duration => "duration",
        }
    }

    pub fn is_grouped(&self) -> bool {
        *self != Self::None
    }

    /// Whether the `drive - blocksize - pattern` item label already tells
    /// groups of this kind apart.
    pub fn implied_by_item_label(&self) -> bool {
        matches!(self, Self::None | Self::Drive | Self::BlockSize | Self::Test)
    }
}

macro_rules! impl_id_traits {
    ($ty:ty, $all:expr, $err:path) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.id())
            }
        }

        impl FromStr for $ty {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim().to_ascii_lowercase();
                $all.iter()
                    .find(|v| v.id() == s)
                    .copied()
                    .ok_or($err(s))
            }
        }
    };
}

impl_id_traits!(SortBy, SortBy::ALL, ParseError::SortBy);
impl_id_traits!(SortOrder, [SortOrder::Asc, SortOrder::Desc], ParseError::SortOrder);
impl_id_traits!(GroupBy, GroupBy::ALL, ParseError::GroupBy);

/// How records are ordered and partitioned before charting.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortingOptions {
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub group_by: GroupBy,
}

impl SortingOptions {
    pub fn new(sort_by: SortBy, sort_order: SortOrder, group_by: GroupBy) -> Self {
        Self {
            sort_by,
            sort_order,
            group_by,
        }
    }
}

/// A record's value under a sort key, tagged with how it compares.
#[derive(Clone, Debug, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    BlockSize(String),
}

pub fn get_sort_value(record: &PerformanceRecord, sort_by: SortBy) -> SortValue {
    match sort_by {
        SortBy::Name => SortValue::Text(format!(
            "{} {} {}",
            record.test_name, record.drive_model, record.block_size
        )),
        SortBy::Iops => SortValue::Number(get_metric_value(&record.metrics, "iops", None)),
        SortBy::Latency => {
            SortValue::Number(get_metric_value(&record.metrics, "avg_latency", None))
        }
        SortBy::Bandwidth => {
            SortValue::Number(get_metric_value(&record.metrics, "bandwidth", None))
        }
        SortBy::BlockSize => SortValue::BlockSize(record.block_size.clone()),
        SortBy::DriveModel => SortValue::Text(record.drive_model.clone()),
        SortBy::Protocol => SortValue::Text(record.protocol.clone().unwrap_or_default()),
        SortBy::Hostname => SortValue::Text(record.hostname.clone().unwrap_or_default()),
        SortBy::QueueDepth => SortValue::Number(record.queue_depth as f64),
    }
}

/// Case-folded comparison with lowercase ordered first on ties, which is
/// how collation orders mixed-case labels.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| b.cmp(a))
}

pub fn compare_values(a: &SortValue, b: &SortValue, order: SortOrder) -> Ordering {
    let ordering = match (a, b) {
        (SortValue::Text(a), SortValue::Text(b)) => locale_compare(a, b),
        (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
        (SortValue::BlockSize(a), SortValue::BlockSize(b)) => compare_block_sizes(a, b),
        _ => Ordering::Equal,
    };

    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn tri_state(flag: Option<u8>, name: &str, on: &str, off: &str) -> String {
    match flag {
        Some(0) => format!("{name}: {off}"),
        Some(_) => format!("{name}: {on}"),
        None => "Unknown".to_string(),
    }
}

/// The key of the group a record belongs to.
pub fn format_group_key(record: &PerformanceRecord, group_by: GroupBy) -> String {
    match group_by {
        GroupBy::None => String::new(),
        GroupBy::Drive => record.drive_model.clone(),
        GroupBy::Test => record.read_write_pattern.clone(),
        GroupBy::BlockSize => record.block_size.clone(),
        GroupBy::Protocol => record.protocol_or_unknown().to_string(),
        GroupBy::Hostname => record.hostname_or_unknown().to_string(),
        GroupBy::QueueDepth => format!("QD{}", record.queue_depth),
        GroupBy::IoDepth => format!("IOD{}", record.effective_iodepth()),
        GroupBy::NumJobs => format!("{} Jobs", record.num_jobs.unwrap_or(1)),
        GroupBy::Direct => tri_state(record.direct, "Direct", "Yes", "No"),
        GroupBy::Sync => tri_state(record.sync, "Sync", "On", "Off"),
        GroupBy::TestSize => match &record.test_size {
            Some(size) => format!("Size: {size}"),
            None => "Unknown".to_string(),
        },
        GroupBy::Duration => match record.duration {
            Some(seconds) => format!("{seconds}s"),
            None => "Unknown".to_string(),
        },
    }
}

pub fn compare_group_keys(a: &str, b: &str, group_by: GroupBy) -> Ordering {
    match group_by {
        GroupBy::BlockSize => compare_block_sizes(a, b),
        _ => locale_compare(a, b),
    }
}

/// Orders borrowed records: by group key first when grouping, then by the
/// requested sort key. The sort is stable, so records that compare equal
/// keep their input order.
pub fn sorted_records<'a>(
    records: &'a [PerformanceRecord],
    options: &SortingOptions,
) -> Vec<&'a PerformanceRecord> {
    let mut keyed: Vec<(String, SortValue, &PerformanceRecord)> = records
        .iter()
        .map(|r| {
            (
                format_group_key(r, options.group_by),
                get_sort_value(r, options.sort_by),
                r,
            )
        })
        .collect();

    keyed.sort_by(|(ga, va, _), (gb, vb, _)| {
        let group = if options.group_by.is_grouped() {
            compare_group_keys(ga, gb, options.group_by)
        } else {
            Ordering::Equal
        };

        group.then_with(|| compare_values(va, vb, options.sort_order))
    });

    keyed.into_iter().map(|(_, _, r)| r).collect()
}

/// Returns a sorted copy of the records. The input is left untouched.
pub fn apply_sorting_and_grouping(
    records: &[PerformanceRecord],
    options: &SortingOptions,
) -> Vec<PerformanceRecord> {
    sorted_records(records, options)
        .into_iter()
        .cloned()
        .collect()
}

/// Records sharing a group key, in order.
#[derive(Debug)]
pub struct RecordGroup<'a> {
    pub key: String,
    pub records: Vec<&'a PerformanceRecord>,
}

/// Partitions already sorted records by group key. Groups appear in order of
/// their first member.
pub fn group_records<'a>(
    sorted: &[&'a PerformanceRecord],
    group_by: GroupBy,
) -> Vec<RecordGroup<'a>> {
    let mut groups: Vec<RecordGroup<'a>> = Vec::new();

    for record in sorted {
        let key = format_group_key(record, group_by);

        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.records.push(*record),
            None => groups.push(RecordGroup {
                key,
                records: vec![*record],
            }),
        }
    }

    groups
}
