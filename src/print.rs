//! Console tables.

use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Cell, Col, Row, Table};

use crate::analysis::{SeasonGoals, Summary};
use crate::csv::Frame;
use crate::predict::metrics::ClassificationReport;
use crate::predict::Forecast;

pub fn tabulate_frame(frame: &Frame) -> Table {
    let mut table = Table::default()
        .with_cols(
            frame
                .headers()
                .iter()
                .map(|_| Col::new(Styles::default().with(MinWidth(8))))
                .collect(),
        )
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            frame.headers().iter().map(|header| header.clone().into()).collect(),
        ));
    table.push_rows(frame.rows().iter().map(|row| {
        Row::new(
            Styles::default(),
            row.iter().map(|cell| cell.clone().into()).collect(),
        )
    }));
    table
}

pub fn tabulate_summary(summary: &Summary) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(16))),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Statistic".into(), "Value".into()],
        ));
    let rows = [
        ("Total matches", summary.total_matches.to_string()),
        ("Wins", summary.wins.to_string()),
        ("Draws", summary.draws.to_string()),
        ("Losses", summary.losses.to_string()),
        ("Goals scored", format!("{}", summary.goals_scored)),
        ("Goals conceded", format!("{}", summary.goals_conceded)),
    ];
    table.push_rows(rows.into_iter().map(|(statistic, value)| {
        Row::new(Styles::default(), vec![statistic.into(), value.into()])
    }));
    table
}

pub fn tabulate_seasons(seasons: &[SeasonGoals]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10))),
            Col::new(Styles::default().with(MinWidth(14)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(14)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Season".into(), "Goals scored".into(), "Goals conceded".into()],
        ));
    table.push_rows(seasons.iter().map(|season| {
        Row::new(
            Styles::default(),
            vec![
                season.season.clone().into(),
                format!("{}", season.goals_scored).into(),
                format!("{}", season.goals_conceded).into(),
            ],
        )
    }));
    table
}

pub fn tabulate_report(report: &ClassificationReport) -> Table {
    let numeric = || Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right));
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(12))),
            numeric(),
            numeric(),
            numeric(),
            numeric(),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "".into(),
                "Precision".into(),
                "Recall".into(),
                "F1-score".into(),
                "Support".into(),
            ],
        ));
    table.push_rows(report.classes.iter().map(|metrics| {
        metrics_row(
            &metrics.class.to_string(),
            metrics.precision,
            metrics.recall,
            metrics.f1,
            metrics.support,
        )
    }));
    table.push_row(Row::new(
        Styles::default().with(Separator(true)),
        vec![
            "Accuracy".into(),
            "".into(),
            "".into(),
            Cell::new(
                Styles::default().with(HAlign::Right),
                format!("{:.2}", report.accuracy).into(),
            ),
            format!("{}", report.macro_avg.support).into(),
        ],
    ));
    for (name, averages) in [("Macro avg", &report.macro_avg), ("Weighted avg", &report.weighted_avg)] {
        table.push_row(metrics_row(
            name,
            averages.precision,
            averages.recall,
            averages.f1,
            averages.support,
        ));
    }
    table
}

fn metrics_row(name: &str, precision: f32, recall: f32, f1: f32, support: usize) -> Row {
    Row::new(
        Styles::default(),
        vec![
            name.into(),
            format!("{precision:.2}").into(),
            format!("{recall:.2}").into(),
            format!("{f1:.2}").into(),
            format!("{support}").into(),
        ],
    )
}

pub fn tabulate_forecast(forecast: &Forecast) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(20))),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![format!("Next {} games", forecast.games).into(), "Forecast".into()],
        ));
    table.push_rows(
        [
            ("Home goals", forecast.home_goals),
            ("Away goals", forecast.away_goals),
            ("Home wins", forecast.home_wins),
        ]
        .into_iter()
        .map(|(name, value)| {
            Row::new(
                Styles::default(),
                vec![name.into(), format!("{value:.2}").into()],
            )
        }),
    );
    table
}
