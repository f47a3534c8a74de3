//! Dashboard configuration: where the datasets live and how the model is trained.

use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::dataset::DatasetSource;
use crate::file::ReadJsonFile;
use crate::predict::TrainOptions;

pub const DEFAULT_BIND: &str = "127.0.0.1:8050";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config from {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dataset files are resolved relative to this directory.
    pub data_dir: PathBuf,

    /// Socket address of the web server.
    pub bind: String,

    /// Datasets in the order they are offered for selection.
    pub datasets: Vec<DatasetSource>,

    pub training: TrainOptions,
}
impl Config {
    /// Reads the config from a JSON file, or falls back to the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            None => Self::default(),
            Some(path) => {
                debug!("loading config from {}", path.display());
                Self::read_json_file(path).map_err(|source| ConfigError::Read {
                    path: path.into(),
                    source,
                })?
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.datasets.is_empty() {
            return Err(ConfigError::Invalid("no datasets configured".into()));
        }
        let mut names = FxHashSet::default();
        for source in &self.datasets {
            if !names.insert(source.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate dataset {}", source.name)));
            }
        }
        self.training
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    pub fn source(&self, name: &str) -> Option<&DatasetSource> {
        self.datasets.iter().find(|source| source.name == name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            bind: DEFAULT_BIND.into(),
            datasets: vec![
                DatasetSource::new("brasileirao", "Brasileirão", "Brasileirao_Matches.csv"),
                DatasetSource::new("brazilian_cup", "Copa do Brasil", "Brazilian_Cup_Matches.csv"),
                DatasetSource::new("libertadores", "Libertadores", "Libertadores_Matches.csv"),
                DatasetSource::new("br_football", "BR Football Dataset", "BR-Football-Dataset.csv"),
            ],
            training: TrainOptions::default(),
        }
    }
}
