use charts::timeseries::MetricType;
use serde::Deserialize;

fn cache_capacity() -> usize {
    256
}

fn metrics() -> Vec<MetricType> {
    MetricType::ALL.to_vec()
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Series {
    #[serde(default = "cache_capacity")]
    cache_capacity: usize,
    #[serde(default = "metrics")]
    metrics: Vec<MetricType>,
}

impl Default for Series {
    fn default() -> Self {
        Self {
            cache_capacity: cache_capacity(),
            metrics: metrics(),
        }
    }
}

impl Series {
    pub fn check(&self) -> Result<(), String> {
        if self.cache_capacity < 1 {
            return Err("series cache_capacity must be at least 1".into());
        }

        Ok(())
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    /// Metrics charted by default, in display order.
    pub fn metrics(&self) -> &[MetricType] {
        &self.metrics
    }

    pub fn set_metrics(&mut self, metrics: Vec<MetricType>) {
        self.metrics = metrics;
    }
}
