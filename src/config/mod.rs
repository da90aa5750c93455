use serde::Deserialize;
use std::path::Path;
use tracing::debug;

mod chart;
mod log;
mod series;

pub use chart::Chart;
pub use log::Log;
pub use series::Series;

#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    log: Log,
    #[serde(default)]
    chart: Chart,
    #[serde(default)]
    series: Series,
}

impl Config {
    pub fn load(path: &dyn AsRef<Path>) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("unable to open config file: {e}"))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| format!("failed to parse config file: {e}"))?;

        config.check()?;

        debug!("loaded config: {}", path.as_ref().display());

        Ok(config)
    }

    pub fn check(&self) -> Result<(), String> {
        self.chart.check()?;
        self.series.check()?;
        Ok(())
    }

    pub fn log(&self) -> &Log {
        &self.log
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut Chart {
        &mut self.chart
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn series_mut(&mut self) -> &mut Series {
        &mut self.series
    }
}
