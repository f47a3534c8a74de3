//! Column layouts of the known competition datasets.
//!
//! Each known dataset keeps a fixed subset of its source columns and may rename some of them so
//! that every dataset exposes the same `home_team`/`away_team`/`home_goal`/`away_goal` columns.
//! Datasets without a schema pass through untouched.

use thiserror::Error;

use crate::csv::{Frame, MissingColumn};

pub const HOME_TEAM: &str = "home_team";
pub const AWAY_TEAM: &str = "away_team";
pub const HOME_GOAL: &str = "home_goal";
pub const AWAY_GOAL: &str = "away_goal";
pub const SEASON: &str = "season";
pub const DATETIME: &str = "datetime";
pub const DATE: &str = "date";
pub const TIME: &str = "time";
pub const ROUND: &str = "round";
pub const STAGE: &str = "stage";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("dataset {dataset} is missing column {column}")]
    MissingColumn { dataset: String, column: String },
}
impl SchemaError {
    pub fn missing(dataset: &str, MissingColumn(column): MissingColumn) -> Self {
        SchemaError::MissingColumn {
            dataset: dataset.to_string(),
            column,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub renames: &'static [(&'static str, &'static str)],
}
impl Schema {
    /// Selects the schema's columns from `frame` and applies its renames.
    pub fn apply(&self, frame: &Frame) -> Result<Frame, SchemaError> {
        let mut selected = frame
            .select(self.columns)
            .map_err(|err| SchemaError::missing(self.name, err))?;
        for (from, to) in self.renames {
            selected.rename(from, to);
        }
        Ok(selected)
    }
}

pub static SCHEMAS: [Schema; 4] = [
    Schema {
        name: "brasileirao",
        columns: &[
            "datetime",
            "home_team",
            "home_team_state",
            "away_team",
            "away_team_state",
            "home_goal",
            "away_goal",
            "season",
            "round",
        ],
        renames: &[],
    },
    Schema {
        name: "brazilian_cup",
        columns: &[
            "round",
            "datetime",
            "home_team",
            "away_team",
            "home_goal",
            "away_goal",
            "season",
        ],
        renames: &[],
    },
    Schema {
        name: "libertadores",
        columns: &[
            "datetime",
            "home_team",
            "away_team",
            "home_goal",
            "away_goal",
            "season",
            "stage",
        ],
        renames: &[],
    },
    Schema {
        name: "br_football",
        columns: &[
            "tournament",
            "home",
            "home_goal",
            "away_goal",
            "away",
            "home_corner",
            "away_corner",
            "home_attack",
            "away_attack",
            "home_shots",
            "away_shots",
            "time",
            "date",
            "ht_diff",
            "at_diff",
            "ht_result",
            "at_result",
            "total_corners",
        ],
        renames: &[("home", HOME_TEAM), ("away", AWAY_TEAM)],
    },
];

pub fn lookup(name: &str) -> Option<&'static Schema> {
    SCHEMAS.iter().find(|schema| schema.name == name)
}

/// Conforms `frame` to the schema registered under `name`, if there is one. Frames of unknown
/// datasets are returned as-is.
pub fn conform(name: &str, frame: Frame) -> Result<Frame, SchemaError> {
    match lookup(name) {
        None => Ok(frame),
        Some(schema) => schema.apply(&frame),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(headers: &[&str]) -> Frame {
        let headers: Vec<String> = headers.iter().map(ToString::to_string).collect();
        let row = (0..headers.len()).map(|col| col.to_string()).collect();
        Frame::new(headers, vec![row]).unwrap()
    }

    #[test]
    fn lookup_known() {
        for schema in &SCHEMAS {
            assert_eq!(Some(schema), lookup(schema.name));
        }
        assert_eq!(None, lookup("premier_league"));
    }

    #[test]
    fn every_schema_yields_uniform_columns() {
        for schema in &SCHEMAS {
            let conformed = conform(schema.name, frame(schema.columns)).unwrap();
            for column in [HOME_TEAM, AWAY_TEAM, HOME_GOAL, AWAY_GOAL] {
                assert!(
                    conformed.has_column(column),
                    "{} lacks {column}",
                    schema.name
                );
            }
        }
    }

    #[test]
    fn drops_undeclared_columns() {
        let mut headers = SCHEMAS[2].columns.to_vec();
        headers.push("arena");
        let conformed = conform("libertadores", frame(&headers)).unwrap();
        assert_eq!(SCHEMAS[2].columns, conformed.headers());
    }

    #[test]
    fn renames_home_and_away() {
        let conformed = conform("br_football", frame(SCHEMAS[3].columns)).unwrap();
        assert!(!conformed.has_column("home"));
        assert_eq!(Some(1), conformed.column_index(HOME_TEAM));
        assert_eq!(Some(4), conformed.column_index(AWAY_TEAM));
    }

    #[test]
    fn unknown_passes_through() {
        let original = frame(&["home_team", "away_team", "home_goal", "away_goal", "referee"]);
        assert_eq!(original.clone(), conform("friendlies", original).unwrap());
    }

    #[test]
    fn missing_declared_column() {
        let err = conform("brazilian_cup", frame(&["round", "datetime"])).unwrap_err();
        assert_eq!(
            SchemaError::MissingColumn {
                dataset: "brazilian_cup".into(),
                column: "home_team".into()
            },
            err
        );
    }
}
