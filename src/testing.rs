//! Testing helpers.

use std::fs;
use std::path::{Path, PathBuf};

use assert_float_eq::*;

use crate::dataset::{Dataset, Match};

pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_relative_eq!(expected, actual, epsilon);
        }
    }
}

/// A dataset of `(home_team, away_team, home_goal, away_goal)` fixtures.
pub fn dataset(fixtures: &[(&str, &str, f64, f64)]) -> Dataset {
    Dataset {
        name: "fixtures".into(),
        label: "Fixtures".into(),
        columns: ["home_team", "away_team", "home_goal", "away_goal"]
            .map(String::from)
            .to_vec(),
        matches: fixtures
            .iter()
            .map(|&(home, away, home_goal, away_goal)| Match::new(home, away, home_goal, away_goal))
            .collect(),
    }
}

/// Like [dataset], tagging each fixture with a season.
pub fn seasonal_dataset(fixtures: &[(&str, &str, f64, f64, &str)]) -> Dataset {
    let mut dataset = dataset(
        &fixtures
            .iter()
            .map(|&(home, away, home_goal, away_goal, _)| (home, away, home_goal, away_goal))
            .collect::<Vec<_>>(),
    );
    dataset.columns.push("season".into());
    for (m, fixture) in dataset.matches.iter_mut().zip(fixtures) {
        m.season = Some(fixture.4.to_string()).filter(|season| !season.is_empty());
    }
    dataset
}

/// A deterministic spread of scorelines, cycling through every result type.
pub fn scorelines(count: usize) -> Dataset {
    const TEAMS: [&str; 6] = ["Flamengo", "Palmeiras", "Santos", "Gremio", "Bahia", "Vasco"];
    let fixtures: Vec<_> = (0..count)
        .map(|index| {
            let home = TEAMS[index % TEAMS.len()];
            let offset = 1 + (index / TEAMS.len()) % (TEAMS.len() - 1);
            let away = TEAMS[(index + offset) % TEAMS.len()];
            let home_goal = (index * 7 % 5) as f64;
            let away_goal = (index * 3 % 4) as f64;
            (home, away, home_goal, away_goal)
        })
        .collect();
    dataset(&fixtures)
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
