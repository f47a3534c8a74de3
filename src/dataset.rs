//! Loading of competition datasets into typed match records.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::csv::{Frame, LoadError};
use crate::print;
use crate::schema;
use crate::schema::{
    SchemaError, AWAY_GOAL, AWAY_TEAM, DATE, DATETIME, HOME_GOAL, HOME_TEAM, ROUND, SEASON, STAGE,
    TIME,
};

const HEAD_ROWS: usize = 5;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("{0}")]
    Schema(#[from] SchemaError),
}

/// How missing or non-numeric goal values are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GoalPolicy {
    /// Missing goals count as zero.
    ZeroFill,

    /// Missing goals take the mean of the observed values in the same column. Rows that still
    /// lack a value (because the column has no observed values) are dropped.
    MeanImpute,
}

/// Where a dataset is sourced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSource {
    /// Identifies the dataset and selects its schema.
    pub name: String,

    /// Human-readable name.
    pub label: String,

    /// CSV file, relative to the data directory unless absolute.
    pub file: PathBuf,
}
impl DatasetSource {
    pub fn new(name: impl Into<String>, label: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            file: file.into(),
        }
    }

    pub fn resolve(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.file)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub datetime: Option<NaiveDateTime>,
    pub home_team: String,
    pub away_team: String,
    pub home_goal: f64,
    pub away_goal: f64,
    pub season: Option<String>,
    pub stage: Option<String>,
}
impl Match {
    pub fn new(home_team: impl Into<String>, away_team: impl Into<String>, home_goal: f64, away_goal: f64) -> Self {
        Self {
            datetime: None,
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_goal,
            away_goal,
            season: None,
            stage: None,
        }
    }

    pub fn is_home_win(&self) -> bool {
        self.home_goal > self.away_goal
    }

    pub fn is_draw(&self) -> bool {
        self.home_goal == self.away_goal
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub label: String,
    pub columns: Vec<String>,
    pub matches: Vec<Match>,
}
impl Dataset {
    /// Converts a frame that has already been conformed to its schema.
    pub fn from_frame(
        name: &str,
        label: &str,
        frame: &Frame,
        policy: GoalPolicy,
    ) -> Result<Self, SchemaError> {
        let require = |column: &str| {
            frame
                .column_index(column)
                .ok_or_else(|| SchemaError::MissingColumn {
                    dataset: name.to_string(),
                    column: column.to_string(),
                })
        };
        let (home_team, away_team) = (require(HOME_TEAM)?, require(AWAY_TEAM)?);
        let (home_goal, away_goal) = (require(HOME_GOAL)?, require(AWAY_GOAL)?);
        let season = frame.column_index(SEASON);
        let stage = frame.column_index(ROUND).or_else(|| frame.column_index(STAGE));
        let when = (
            frame.column_index(DATETIME),
            frame.column_index(DATE),
            frame.column_index(TIME),
        );

        let home_goals: Vec<_> = frame.rows().iter().map(|row| parse_goal(&row[home_goal])).collect();
        let away_goals: Vec<_> = frame.rows().iter().map(|row| parse_goal(&row[away_goal])).collect();
        let home_goals = policy.fill(&home_goals);
        let away_goals = policy.fill(&away_goals);

        let mut matches = Vec::with_capacity(frame.len());
        for (index, row) in frame.rows().iter().enumerate() {
            let (Some(home), Some(away)) = (home_goals[index], away_goals[index]) else {
                continue;
            };
            let datetime = match when {
                (Some(datetime), _, _) => parse_datetime(&row[datetime]),
                (None, Some(date), Some(time)) => {
                    parse_datetime(&format!("{} {}", row[date].trim(), row[time].trim()))
                        .or_else(|| parse_datetime(&row[date]))
                }
                (None, Some(date), None) => parse_datetime(&row[date]),
                _ => None,
            };
            matches.push(Match {
                datetime,
                home_team: row[home_team].clone(),
                away_team: row[away_team].clone(),
                home_goal: home,
                away_goal: away,
                season: season.and_then(|col| non_blank(&row[col])),
                stage: stage.and_then(|col| non_blank(&row[col])),
            });
        }
        if matches.len() < frame.len() {
            warn!(
                "dropped {} of {} rows of {name} with no usable goal values",
                frame.len() - matches.len(),
                frame.len()
            );
        }

        Ok(Self {
            name: name.to_string(),
            label: label.to_string(),
            columns: frame.headers().to_vec(),
            matches,
        })
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|existing| existing == column)
    }

    pub fn has_season(&self) -> bool {
        self.has_column(SEASON)
    }

    /// Distinct team names in order of first appearance, reading each match's home team before
    /// its away team.
    pub fn teams(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        let mut teams = vec![];
        for m in &self.matches {
            for team in [m.home_team.as_str(), m.away_team.as_str()] {
                if seen.insert(team) {
                    teams.push(team);
                }
            }
        }
        teams
    }

    /// Earliest and latest parsed match dates.
    pub fn date_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut dates = self.matches.iter().filter_map(|m| m.datetime);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(min, max), date| {
            (min.min(date), max.max(date))
        }))
    }
}

impl GoalPolicy {
    fn fill(self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        match self {
            GoalPolicy::ZeroFill => values.iter().map(|value| Some(value.unwrap_or(0.0))).collect(),
            GoalPolicy::MeanImpute => {
                let mean = mean_observed(values);
                values.iter().map(|value| value.or(mean)).collect()
            }
        }
    }
}

fn mean_observed(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Parses a goal count, treating blanks, non-numeric text and NaN as missing.
pub fn parse_goal(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|goals| goals.is_finite())
}

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%d/%m/%Y %H:%M"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Reads, conforms and converts a single dataset.
pub fn load(source: &DatasetSource, data_dir: &Path, policy: GoalPolicy) -> Result<Dataset, DatasetError> {
    let path = source.resolve(data_dir);
    debug!("loading {} from {}", source.name, path.display());
    let frame = Frame::read(&path)?;
    let frame = schema::conform(&source.name, frame)?;
    debug!(
        "head of {}:\n{}",
        source.name,
        Console::default().render(&print::tabulate_frame(&frame.head(HEAD_ROWS)))
    );
    let dataset = Dataset::from_frame(&source.name, &source.label, &frame, policy)?;
    info!("loaded {} matches for {} ({policy})", dataset.len(), source.name);
    Ok(dataset)
}

/// Loads every source, failing on the first dataset that cannot be loaded.
pub fn load_all(sources: &[DatasetSource], data_dir: &Path, policy: GoalPolicy) -> Result<Vec<Dataset>, DatasetError> {
    sources
        .iter()
        .map(|source| load(source, data_dir, policy))
        .collect()
}

#[derive(Debug)]
pub struct LoadFailure {
    pub source: DatasetSource,
    pub error: DatasetError,
}
impl LoadFailure {
    /// A message suitable for showing to the user.
    pub fn describe(&self) -> String {
        match &self.error {
            DatasetError::Load(LoadError::NotFound(path)) => {
                format!("File not found: {}", path.display())
            }
            DatasetError::Load(LoadError::Empty(_)) => {
                format!("The file for {} is empty.", self.source.label)
            }
            DatasetError::Load(LoadError::Parse { .. }) => {
                format!("Error parsing the file for {}.", self.source.label)
            }
            other => format!("Could not load {}: {other}", self.source.label),
        }
    }
}

#[derive(Debug, Default)]
pub struct Loaded {
    pub datasets: Vec<Dataset>,
    pub failures: Vec<LoadFailure>,
}

/// Loads every source that can be loaded, collecting failures alongside the loaded datasets.
pub fn load_available(sources: &[DatasetSource], data_dir: &Path, policy: GoalPolicy) -> Loaded {
    let mut loaded = Loaded::default();
    for source in sources {
        match load(source, data_dir, policy) {
            Ok(dataset) => loaded.datasets.push(dataset),
            Err(error) => {
                warn!("skipping {}: {error}", source.name);
                loaded.failures.push(LoadFailure {
                    source: source.clone(),
                    error,
                });
            }
        }
    }
    loaded
}
