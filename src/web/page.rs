//! HTML rendering of the dashboard pages.

use strum::IntoEnumIterator;

use super::{AnalysisView, Choice, PredictionOutcome, PredictionView};
use crate::analysis::{AnalysisScope, Summary};
use crate::html::escape;
use crate::predict::{Forecast, TrainingReport};

pub const ANALYSIS_TITLE: &str = "Football Match Analysis";
pub const PREDICTION_TITLE: &str = "Football Result Prediction";

const STYLE: &str = "\
body{font-family:sans-serif;margin:2em auto;max-width:860px;color:#222}\
nav{margin-bottom:1em}\
form{display:flex;flex-wrap:wrap;gap:1em;align-items:end;margin-bottom:1.5em}\
label{display:flex;flex-direction:column;font-size:.9em;gap:.3em}\
table{border-collapse:collapse;margin:1em 0}\
th,td{border:1px solid #ccc;padding:.3em .8em;text-align:right}\
.error{background:#fdecea;border:1px solid #f5c2c0;padding:.8em;margin:1em 0}\
.placeholder{font-style:italic}\
pre{background:#f6f6f6;padding:1em}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{STYLE}</style></head><body>\
         <nav><a href=\"/\">Analysis</a> | <a href=\"/predict\">Prediction</a></nav>\
         <h1>{title}</h1>{body}</body></html>",
        title = escape(title)
    )
}

fn select(name: &str, label: &str, options: &[Choice], selected: Option<&str>) -> String {
    let options: String = options
        .iter()
        .map(|(value, text)| {
            let marker = if Some(value.as_str()) == selected { " selected" } else { "" };
            format!("<option value=\"{}\"{marker}>{}</option>", escape(value), escape(text))
        })
        .collect();
    format!(
        "<label>{}<select name=\"{name}\" onchange=\"this.form.submit()\">{options}</select></label>",
        escape(label)
    )
}

fn team_choices(teams: &[String]) -> Vec<Choice> {
    teams.iter().map(|team| (team.clone(), team.clone())).collect()
}

pub fn error(title: &str, message: &str) -> String {
    layout(title, &format!("<div class=\"error\">{}</div>", escape(message)))
}

pub fn analysis(view: &AnalysisView) -> String {
    let scopes: Vec<Choice> = AnalysisScope::iter()
        .map(|scope| {
            let label = match scope {
                AnalysisScope::Competition => "Whole competition",
                AnalysisScope::Team => "Team matches only",
            };
            (scope.to_string(), label.to_string())
        })
        .collect();
    let mut body = format!(
        "<form method=\"get\" action=\"/\">{}{}{}</form>",
        select("competition", "Choose a competition", &view.competitions, Some(view.competition.as_str())),
        select("team", "Choose a team", &team_choices(&view.teams), view.team.as_deref()),
        select("scope", "Count results over", &scopes, Some(view.scope.to_string().as_str())),
    );

    body.push_str(&format!("<h2>Analysis results for {}:</h2>", escape(&view.title)));
    if let Some((first, last)) = view.date_span {
        body.push_str(&format!(
            "<p>Matches from {} to {}.</p>",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        ));
    }
    body.push_str(&summary_table(&view.summary));

    match &view.seasons {
        Some(chart) => body.push_str(&chart.to_html()),
        None => body.push_str(&format!(
            "<p class=\"placeholder\">No season data available for {}.</p>",
            escape(&view.title)
        )),
    }
    body.push_str(&view.distribution.to_html());
    layout(ANALYSIS_TITLE, &body)
}

fn summary_table(summary: &Summary) -> String {
    format!(
        "<table class=\"summary\"><tr><th>Total matches</th><th>Wins</th><th>Draws</th>\
         <th>Losses</th><th>Goals scored</th><th>Goals conceded</th></tr>\
         <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr></table>",
        summary.total_matches,
        summary.wins,
        summary.draws,
        summary.losses,
        summary.goals_scored,
        summary.goals_conceded
    )
}

pub fn prediction(view: &PredictionView) -> String {
    let mut body: String = view
        .messages
        .iter()
        .map(|message| format!("<div class=\"error\">{}</div>", escape(message)))
        .collect();

    body.push_str(&format!(
        "<form method=\"get\" action=\"/predict\">{}{}\
         <label>How many games do you want to forecast?\
         <input type=\"number\" name=\"games\" min=\"1\" value=\"{}\" required></label>\
         <button type=\"submit\" name=\"forecast\" value=\"1\">Forecast results</button></form>",
        select("competition", "Choose a competition", &view.competitions, view.competition.as_deref()),
        select("team", "Choose a team", &team_choices(&view.teams), view.team.as_deref()),
        view.games
    ));

    match &view.outcome {
        PredictionOutcome::Unavailable(message) => {
            body.push_str(&format!("<div class=\"error\">{}</div>", escape(message)));
        }
        PredictionOutcome::Trained { report, forecast } => {
            body.push_str(&training_report(report));
            if let Some(forecast) = forecast {
                body.push_str(&forecast_section(forecast));
            }
        }
    }
    layout(PREDICTION_TITLE, &body)
}

fn training_report(report: &TrainingReport) -> String {
    format!(
        "<p>Model accuracy: {:.2}</p><p>Mean cross-validation accuracy: {:.2}</p>\
         <h2>Classification report</h2><pre>{}</pre>",
        report.accuracy,
        report.cv_accuracy,
        escape(&report.report.to_string())
    )
}

fn forecast_section(forecast: &Forecast) -> String {
    format!(
        "<h2>Forecast for {} games</h2><ul class=\"forecast\">\
         <li>Forecast home goals: {:.2}</li>\
         <li>Forecast away goals: {:.2}</li>\
         <li>Forecast home wins: {:.2}</li></ul>",
        forecast.games, forecast.home_goals, forecast.away_goals, forecast.home_wins
    )
}
