//! Match statistics for a competition and a selected team.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::dataset::{Dataset, Match};

/// Which matches the win/draw/loss counts and goals scored are drawn from.
///
/// `Competition` counts every match of the dataset regardless of the selected team; only the goals
/// conceded are specific to the team. `Team` restricts everything to the team's own matches and
/// counts results from the team's side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AnalysisScope {
    #[default]
    Competition,
    Team,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_matches: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub goals_scored: f64,
    pub goals_conceded: f64,
}

pub fn analyse(dataset: &Dataset, team: &str, scope: AnalysisScope) -> Summary {
    match scope {
        AnalysisScope::Competition => competition_summary(&dataset.matches, team),
        AnalysisScope::Team => team_summary(&dataset.matches, team),
    }
}

fn competition_summary(matches: &[Match], team: &str) -> Summary {
    let total_matches = matches.len();
    let wins = matches.iter().filter(|m| m.is_home_win()).count();
    let draws = matches.iter().filter(|m| m.is_draw()).count();
    let goals_scored = matches
        .iter()
        .fold(0.0, |total, m| total + m.home_goal + m.away_goal);
    Summary {
        total_matches,
        wins,
        draws,
        losses: total_matches - wins - draws,
        goals_scored,
        goals_conceded: goals_conceded(matches, team),
    }
}

fn team_summary(matches: &[Match], team: &str) -> Summary {
    let (mut wins, mut draws, mut total_matches) = (0, 0, 0);
    let mut goals_scored = 0.0;
    for m in matches.iter().filter(|m| m.involves(team)) {
        total_matches += 1;
        let (scored, conceded) = if m.home_team == team {
            (m.home_goal, m.away_goal)
        } else {
            (m.away_goal, m.home_goal)
        };
        goals_scored += scored;
        match scored.partial_cmp(&conceded) {
            Some(Ordering::Greater) => wins += 1,
            Some(Ordering::Equal) => draws += 1,
            _ => {}
        }
    }
    Summary {
        total_matches,
        wins,
        draws,
        losses: total_matches - wins - draws,
        goals_scored,
        goals_conceded: goals_conceded(matches, team),
    }
}

/// Goals let in by `team`: the home side's goals when it played away, plus the away side's goals
/// when it played at home.
pub fn goals_conceded(matches: &[Match], team: &str) -> f64 {
    matches.iter().fold(0.0, |total, m| {
        if m.away_team == team {
            total + m.home_goal
        } else if m.home_team == team {
            total + m.away_goal
        } else {
            total
        }
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonGoals {
    pub season: String,
    pub goals_scored: f64,
    pub goals_conceded: f64,
}

/// Sums home goals (as scored) and away goals (as conceded) per season, in season order. Returns
/// `None` if the dataset has no season column.
pub fn goals_by_season(dataset: &Dataset) -> Option<Vec<SeasonGoals>> {
    if !dataset.has_season() {
        return None;
    }
    let mut seasons: BTreeMap<SeasonKey, (f64, f64)> = BTreeMap::new();
    for m in &dataset.matches {
        if let Some(season) = &m.season {
            let totals = seasons.entry(SeasonKey::from(season.as_str())).or_default();
            totals.0 += m.home_goal;
            totals.1 += m.away_goal;
        }
    }
    Some(
        seasons
            .into_iter()
            .map(|(key, (goals_scored, goals_conceded))| SeasonGoals {
                season: key.label(),
                goals_scored,
                goals_conceded,
            })
            .collect(),
    )
}

/// Orders numeric seasons numerically, ahead of any non-numeric ones.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SeasonKey {
    Numeric(i64),
    Text(String),
}
impl SeasonKey {
    fn label(self) -> String {
        match self {
            SeasonKey::Numeric(season) => season.to_string(),
            SeasonKey::Text(season) => season,
        }
    }
}

impl From<&str> for SeasonKey {
    fn from(label: &str) -> Self {
        let numeric = label.parse::<i64>().ok().or_else(|| {
            label
                .parse::<f64>()
                .ok()
                .filter(|season| season.is_finite() && season.fract() == 0.0)
                .map(|season| season as i64)
        });
        match numeric {
            Some(season) => SeasonKey::Numeric(season),
            None => SeasonKey::Text(label.to_string()),
        }
    }
}

#[cfg(test)]
mod tests;
