use serde::Deserialize;
use tracing::Level;

#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct Log {
    #[serde(default)]
    level: LevelDef,
}

impl Log {
    pub fn level(&self) -> Level {
        self.level.into()
    }
}

#[derive(Copy, Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LevelDef {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LevelDef> for Level {
    fn from(level: LevelDef) -> Self {
        match level {
            LevelDef::Error => Level::ERROR,
            LevelDef::Warn => Level::WARN,
            LevelDef::Info => Level::INFO,
            LevelDef::Debug => Level::DEBUG,
            LevelDef::Trace => Level::TRACE,
        }
    }
}
