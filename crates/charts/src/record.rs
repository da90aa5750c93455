use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};

/// Metric bag of a single record, keyed by metric name (`iops`,
/// `avg_latency`, `bandwidth`, `p95_latency`, `p99_latency`, ...).
pub type Metrics = BTreeMap<String, MetricValue>;

/// A value with its unit, as stored by the API layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measured {
    pub value: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
}

impl Measured {
    pub fn new<T: Into<String>>(value: f64, unit: T) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

/// A metric split by operation type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<Measured>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write: Option<Measured>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined: Option<Measured>,
}

impl OperationMetrics {
    pub fn get(&self, operation: Operation) -> Option<&Measured> {
        match operation {
            Operation::Read => self.read.as_ref(),
            Operation::Write => self.write.as_ref(),
            Operation::Combined => self.combined.as_ref(),
        }
    }
}

/// The shapes a metric can take inside the metric bag. Anything that is not
/// recognizable lands in `Other` so that decoding a record never fails on a
/// malformed metric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    Measured(Measured),
    ByOperation(OperationMetrics),
    Other(serde_json::Value),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
    Combined,
}

/// Reads an explicit `null` the same way as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One benchmark observation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub drive_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub test_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub block_size: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub read_write_pattern: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub queue_depth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iodepth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_jobs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fio_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Metrics,
}

impl PerformanceRecord {
    /// Stable identity of the record: the test configuration on a given host
    /// and drive, plus the time it ran.
    pub fn identity(&self) -> String {
        fn opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(|v| v.to_string()).unwrap_or_default()
        }

        [
            opt(&self.hostname),
            opt(&self.protocol),
            opt(&self.drive_type),
            self.drive_model.clone(),
            self.block_size.clone(),
            self.read_write_pattern.clone(),
            self.queue_depth.to_string(),
            opt(&self.num_jobs),
            opt(&self.direct),
            opt(&self.test_size),
            opt(&self.sync),
            opt(&self.iodepth),
            self.timestamp.clone(),
        ]
        .join("|")
    }

    /// Short hex digest of the identity, suitable as a map key or DOM id.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.identity().as_bytes());

        digest
            .iter()
            .take(8)
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    pub fn hostname_or_unknown(&self) -> &str {
        self.hostname.as_deref().unwrap_or("Unknown")
    }

    pub fn protocol_or_unknown(&self) -> &str {
        self.protocol.as_deref().unwrap_or("Unknown")
    }

    /// The `hostname - protocol - drive` triple used by the host/disk filter.
    pub fn host_disk_combination(&self) -> String {
        format!(
            "{} - {} - {}",
            self.hostname_or_unknown(),
            self.protocol_or_unknown(),
            self.drive_model
        )
    }

    /// Effective IO depth, which older runs only record as queue depth.
    pub fn effective_iodepth(&self) -> u32 {
        self.iodepth.unwrap_or(self.queue_depth)
    }
}

/// Drops records whose identity was already seen, keeping the first
/// occurrence and the input order.
pub fn dedup_records(records: &[PerformanceRecord]) -> Vec<PerformanceRecord> {
    let mut seen = HashSet::new();

    records
        .iter()
        .filter(|record| seen.insert(record.identity()))
        .cloned()
        .collect()
}
