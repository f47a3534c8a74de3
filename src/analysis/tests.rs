use assert_float_eq::*;

use super::*;
use crate::testing;

fn three_matches() -> Dataset {
    testing::dataset(&[
        ("Flamengo", "Vasco", 2.0, 1.0),
        ("Vasco", "Fluminense", 0.0, 0.0),
        ("Fluminense", "Flamengo", 1.0, 3.0),
    ])
}

#[test]
fn competition_scope_counts_every_match() {
    let dataset = three_matches();
    for team in ["Flamengo", "Vasco", "Fluminense", "Botafogo"] {
        let summary = analyse(&dataset, team, AnalysisScope::Competition);
        assert_eq!(3, summary.total_matches, "{team}");
        assert_eq!(1, summary.wins, "{team}");
        assert_eq!(1, summary.draws, "{team}");
        assert_eq!(1, summary.losses, "{team}");
        assert_f64_near!(7.0, summary.goals_scored);
    }
}

#[test]
fn goals_conceded_is_team_specific() {
    let dataset = three_matches();
    assert_f64_near!(2.0, goals_conceded(&dataset.matches, "Flamengo"));
    assert_f64_near!(2.0, goals_conceded(&dataset.matches, "Vasco"));
    assert_f64_near!(3.0, goals_conceded(&dataset.matches, "Fluminense"));
}

#[test]
fn goals_conceded_without_matches() {
    let dataset = three_matches();
    for conceded in [
        goals_conceded(&dataset.matches, "Botafogo"),
        analyse(&dataset, "Botafogo", AnalysisScope::Competition).goals_conceded,
        analyse(&dataset, "Botafogo", AnalysisScope::Team).goals_conceded,
        goals_conceded(&[], "Botafogo"),
    ] {
        assert_eq!("0", conceded.to_string());
        assert!(conceded.is_sign_positive());
    }
}

#[test]
fn empty_competition_scores_positive_zero() {
    let dataset = testing::dataset(&[]);
    let summary = analyse(&dataset, "Botafogo", AnalysisScope::Competition);
    assert_eq!(0, summary.total_matches);
    assert_eq!("0", summary.goals_scored.to_string());
    assert_eq!("0", summary.goals_conceded.to_string());
}

#[test]
fn results_partition_matches() {
    let dataset = testing::scorelines(97);
    for scope in [AnalysisScope::Competition, AnalysisScope::Team] {
        for team in dataset.teams() {
            let summary = analyse(&dataset, team, scope);
            assert_eq!(
                summary.total_matches,
                summary.wins + summary.draws + summary.losses,
                "{scope} {team}"
            );
        }
    }
}

#[test]
fn team_scope() {
    let dataset = three_matches();
    let summary = analyse(&dataset, "Flamengo", AnalysisScope::Team);
    assert_eq!(
        Summary {
            total_matches: 2,
            wins: 2,
            draws: 0,
            losses: 0,
            goals_scored: 5.0,
            goals_conceded: 2.0,
        },
        summary
    );

    let summary = analyse(&dataset, "Fluminense", AnalysisScope::Team);
    assert_eq!((2, 0, 1, 1), (summary.total_matches, summary.wins, summary.draws, summary.losses));
    assert_f64_near!(1.0, summary.goals_scored);

    let summary = analyse(&dataset, "Botafogo", AnalysisScope::Team);
    assert_eq!(0, summary.total_matches);
}

#[test]
fn empty_dataset() {
    let summary = analyse(&testing::dataset(&[]), "Flamengo", AnalysisScope::Competition);
    assert_eq!(0, summary.total_matches);
    assert_eq!(0, summary.losses);
    assert_eq!(0.0, summary.goals_scored);
}

#[test]
fn seasons_in_numeric_order() {
    let dataset = testing::seasonal_dataset(&[
        ("A", "B", 1.0, 2.0, "2012"),
        ("B", "C", 3.0, 0.0, "2003"),
        ("C", "A", 2.0, 2.0, "2012"),
        ("A", "C", 4.0, 1.0, "2010"),
        ("B", "A", 9.0, 9.0, ""),
    ]);
    let seasons = goals_by_season(&dataset).unwrap();
    assert_eq!(
        vec![
            SeasonGoals { season: "2003".into(), goals_scored: 3.0, goals_conceded: 0.0 },
            SeasonGoals { season: "2010".into(), goals_scored: 4.0, goals_conceded: 1.0 },
            SeasonGoals { season: "2012".into(), goals_scored: 3.0, goals_conceded: 4.0 },
        ],
        seasons
    );
}

#[test]
fn no_seasons_without_column() {
    assert_eq!(None, goals_by_season(&three_matches()));
    assert_eq!(Some(vec![]), goals_by_season(&testing::seasonal_dataset(&[])));
}

#[test]
fn season_keys() {
    assert_eq!(SeasonKey::Numeric(2012), SeasonKey::from("2012.0"));
    assert_eq!(SeasonKey::Text("2012/13".into()), SeasonKey::from("2012/13"));
    assert!(SeasonKey::from("999") < SeasonKey::from("2012"));
    assert!(SeasonKey::from("2030") < SeasonKey::from("apertura"));
}

#[test]
fn scope_strings() {
    assert_eq!("team", AnalysisScope::Team.to_string());
    assert_eq!(AnalysisScope::Competition, "competition".parse().unwrap());
    assert_eq!(AnalysisScope::Competition, AnalysisScope::default());
}
