//! The dashboard's web server: an analysis page, a prediction page and a JSON API.
//!
//! Every request reloads the datasets it needs and recomputes its results on the blocking thread
//! pool. The only state shared between requests is the immutable [Config].

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::analysis::{analyse, AnalysisScope, SeasonGoals, Summary};
use crate::chart::Chart;
use crate::config::Config;
use crate::dataset::{Dataset, DatasetError, DatasetSource, GoalPolicy};
use crate::predict::{Forecast, PredictError, TrainingReport};
use crate::{analysis, chart, dataset, predict};

mod page;

const NO_TRAINING_DATA: &str = "No data available to train the model.";

#[derive(Debug, Error)]
pub enum WebError {
    #[error("unknown competition {0}")]
    UnknownCompetition(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Dataset(#[from] DatasetError),

    #[error("{0}")]
    Predict(#[from] PredictError),

    #[error("background task failed: {0}")]
    Task(#[from] JoinError),
}
impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::UnknownCompetition(_) => StatusCode::NOT_FOUND,
            WebError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Predict(PredictError::Model(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::Predict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WebError::Dataset(_) | WebError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

pub fn router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/", get(analysis_page))
        .route("/predict", get(prediction_page))
        .route("/api/competitions", get(competitions))
        .route("/api/teams", get(teams))
        .route("/api/summary", get(summary))
        .route("/api/seasons", get(seasons))
        .route("/api/predict", get(prediction))
        .with_state(AppState { config })
}

/// Binds to the configured address and serves the dashboard until the process is stopped.
pub async fn serve(config: Arc<Config>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.bind).await?;
    info!("dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(config)).await?;
    Ok(())
}

async fn blocking<T, F>(f: F) -> Result<T, WebError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, WebError> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// The named source, or the first configured one when no name is given.
fn lookup<'a>(config: &'a Config, competition: Option<&str>) -> Result<&'a DatasetSource, WebError> {
    match competition.filter(|name| !name.is_empty()) {
        Some(name) => config
            .source(name)
            .ok_or_else(|| WebError::UnknownCompetition(name.to_string())),
        None => config
            .datasets
            .first()
            .ok_or_else(|| WebError::InvalidRequest("no competitions are configured".into())),
    }
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub competition: Option<String>,
    pub team: Option<String>,
    pub scope: Option<AnalysisScope>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PredictQuery {
    pub competition: Option<String>,
    pub team: Option<String>,

    /// Kept as text so that a cleared or malformed field is reported on the page.
    pub games: Option<String>,
    pub forecast: Option<String>,
}

/// A `(value, label)` pair offered for selection.
pub type Choice = (String, String);

#[derive(Debug)]
pub struct AnalysisView {
    pub competitions: Vec<Choice>,
    pub competition: String,
    pub title: String,
    pub teams: Vec<String>,
    pub team: Option<String>,
    pub scope: AnalysisScope,
    pub summary: Summary,
    pub seasons: Option<Chart>,
    pub distribution: Chart,
    pub date_span: Option<(NaiveDateTime, NaiveDateTime)>,
}

/// Loads every configured dataset, failing if any cannot be loaded, and analyses the selected one.
pub fn analysis_view(config: &Config, query: AnalysisQuery) -> Result<AnalysisView, WebError> {
    let source = lookup(config, query.competition.as_deref())?;
    let datasets = dataset::load_all(&config.datasets, &config.data_dir, GoalPolicy::ZeroFill)?;
    let dataset = datasets
        .into_iter()
        .find(|dataset| dataset.name == source.name)
        .ok_or_else(|| WebError::UnknownCompetition(source.name.clone()))?;

    let teams: Vec<_> = dataset.teams().into_iter().map(String::from).collect();
    let team = select_team(query.team, &teams);
    let scope = query.scope.unwrap_or_default();
    let summary = analyse(&dataset, team.as_deref().unwrap_or_default(), scope);
    debug!("{} {team:?} {scope}: {summary:?}", dataset.name);

    let title = capitalise(&dataset.name);
    let seasons = analysis::goals_by_season(&dataset).map(|rows| chart::goals_by_season(&rows, &title));
    Ok(AnalysisView {
        competitions: choices(&config.datasets),
        competition: dataset.name.clone(),
        title,
        teams,
        team,
        scope,
        summary,
        seasons,
        distribution: chart::goals_distribution(&dataset),
        date_span: dataset.date_span(),
    })
}

/// The requested team if it plays in the competition, otherwise the competition's first team. A
/// team carried over from a previously selected competition is thereby reset.
fn select_team(requested: Option<String>, teams: &[String]) -> Option<String> {
    requested
        .filter(|team| teams.contains(team))
        .or_else(|| teams.first().cloned())
}

fn choices(sources: &[DatasetSource]) -> Vec<Choice> {
    sources
        .iter()
        .map(|source| (source.name.clone(), source.label.clone()))
        .collect()
}

#[derive(Debug)]
pub enum PredictionOutcome {
    Trained {
        report: TrainingReport,
        forecast: Option<Forecast>,
    },
    Unavailable(String),
}

#[derive(Debug)]
pub struct PredictionView {
    pub competitions: Vec<Choice>,
    pub competition: Option<String>,
    pub teams: Vec<String>,
    pub team: Option<String>,
    pub games: u32,
    pub messages: Vec<String>,
    pub outcome: PredictionOutcome,
}

/// Loads whichever datasets can be loaded, reporting the others as messages, then trains on the
/// selected one. The forecast is only computed when requested.
pub fn prediction_view(config: &Config, query: PredictQuery) -> Result<PredictionView, WebError> {
    let games = validate_games(query.games.as_deref())?;
    if let Some(name) = query.competition.as_deref().filter(|name| !name.is_empty()) {
        lookup(config, Some(name))?;
    }
    let loaded = dataset::load_available(&config.datasets, &config.data_dir, GoalPolicy::MeanImpute);
    let messages = loaded.failures.iter().map(|failure| failure.describe()).collect();
    let competitions = loaded
        .datasets
        .iter()
        .map(|dataset| (dataset.name.clone(), dataset.label.clone()))
        .collect();

    let selected = match query.competition.as_deref().filter(|name| !name.is_empty()) {
        Some(name) => loaded.datasets.iter().find(|dataset| dataset.name == name),
        None => loaded.datasets.first(),
    };
    let Some(dataset) = selected else {
        return Ok(PredictionView {
            competitions,
            competition: query.competition,
            teams: vec![],
            team: None,
            games,
            messages,
            outcome: PredictionOutcome::Unavailable(NO_TRAINING_DATA.into()),
        });
    };

    let teams: Vec<_> = dataset.teams().into_iter().map(String::from).collect();
    let team = select_team(query.team, &teams);
    let outcome = match train_and_forecast(config, dataset, games, query.forecast.is_some()) {
        Ok((report, forecast)) => PredictionOutcome::Trained { report, forecast },
        Err(PredictError::EmptyDataset(_)) => PredictionOutcome::Unavailable(NO_TRAINING_DATA.into()),
        Err(err) => PredictionOutcome::Unavailable(err.to_string()),
    };
    Ok(PredictionView {
        competitions,
        competition: Some(dataset.name.clone()),
        teams,
        team,
        games,
        messages,
        outcome,
    })
}

/// Parses the number of games to forecast, defaulting to 1 when absent or blank.
fn validate_games(games: Option<&str>) -> Result<u32, WebError> {
    let games = match games.map(str::trim).filter(|games| !games.is_empty()) {
        None => return Ok(1),
        Some(games) => games.parse::<u32>().map_err(|_| {
            WebError::InvalidRequest(format!("the number of games must be a whole number, not {games}"))
        })?,
    };
    if games == 0 {
        return Err(WebError::InvalidRequest("the number of games must be at least 1".into()));
    }
    Ok(games)
}

fn train_and_forecast(
    config: &Config,
    dataset: &Dataset,
    games: u32,
    with_forecast: bool,
) -> Result<(TrainingReport, Option<Forecast>), PredictError> {
    let trained = predict::train(dataset, &config.training)?;
    let forecast = if with_forecast {
        Some(predict::forecast(dataset, games)?)
    } else {
        None
    };
    Ok((trained.report, forecast))
}

fn render_failure(title: &str, err: WebError) -> Response {
    warn!("{title}: {err}");
    (err.status(), Html(page::error(title, &err.to_string()))).into_response()
}

async fn analysis_page(State(state): State<AppState>, Query(query): Query<AnalysisQuery>) -> Response {
    match blocking(move || analysis_view(&state.config, query)).await {
        Ok(view) => Html(page::analysis(&view)).into_response(),
        Err(err) => render_failure(page::ANALYSIS_TITLE, err),
    }
}

async fn prediction_page(State(state): State<AppState>, Query(query): Query<PredictQuery>) -> Response {
    match blocking(move || prediction_view(&state.config, query)).await {
        Ok(view) => Html(page::prediction(&view)).into_response(),
        Err(err) => render_failure(page::PREDICTION_TITLE, err),
    }
}

#[derive(Debug, Serialize)]
struct Competition {
    name: String,
    label: String,
}

async fn competitions(State(state): State<AppState>) -> Json<Vec<Competition>> {
    Json(
        state
            .config
            .datasets
            .iter()
            .map(|source| Competition {
                name: source.name.clone(),
                label: source.label.clone(),
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
struct CompetitionQuery {
    competition: Option<String>,
}

fn load_selected(config: &Config, competition: Option<&str>, policy: GoalPolicy) -> Result<Dataset, WebError> {
    let source = lookup(config, competition)?;
    Ok(dataset::load(source, &config.data_dir, policy)?)
}

async fn teams(
    State(state): State<AppState>,
    Query(query): Query<CompetitionQuery>,
) -> Result<Json<Vec<String>>, WebError> {
    blocking(move || {
        let dataset = load_selected(&state.config, query.competition.as_deref(), GoalPolicy::ZeroFill)?;
        Ok(Json(dataset.teams().into_iter().map(String::from).collect()))
    })
    .await
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    competition: String,
    team: Option<String>,
    scope: AnalysisScope,
    summary: Summary,
}

async fn summary(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<SummaryResponse>, WebError> {
    blocking(move || {
        let dataset = load_selected(&state.config, query.competition.as_deref(), GoalPolicy::ZeroFill)?;
        let team = query
            .team
            .filter(|team| !team.is_empty())
            .or_else(|| dataset.teams().first().map(|team| team.to_string()));
        let scope = query.scope.unwrap_or_default();
        let summary = analyse(&dataset, team.as_deref().unwrap_or_default(), scope);
        Ok(Json(SummaryResponse {
            competition: dataset.name,
            team,
            scope,
            summary,
        }))
    })
    .await
}

async fn seasons(
    State(state): State<AppState>,
    Query(query): Query<CompetitionQuery>,
) -> Result<Json<Option<Vec<SeasonGoals>>>, WebError> {
    blocking(move || {
        let dataset = load_selected(&state.config, query.competition.as_deref(), GoalPolicy::ZeroFill)?;
        Ok(Json(analysis::goals_by_season(&dataset)))
    })
    .await
}

#[derive(Debug, Deserialize)]
struct PredictApiQuery {
    competition: Option<String>,
    games: Option<String>,
}

#[derive(Debug, Serialize)]
struct PredictionResponse {
    competition: String,
    training: TrainingReport,
    forecast: Forecast,
}

async fn prediction(
    State(state): State<AppState>,
    Query(query): Query<PredictApiQuery>,
) -> Result<Json<PredictionResponse>, WebError> {
    blocking(move || {
        let games = validate_games(query.games.as_deref())?;
        let dataset = load_selected(&state.config, query.competition.as_deref(), GoalPolicy::MeanImpute)?;
        let trained = predict::train(&dataset, &state.config.training)?;
        let forecast = predict::forecast(&dataset, games)?;
        Ok(Json(PredictionResponse {
            competition: dataset.name,
            training: trained.report,
            forecast,
        }))
    })
    .await
}

#[cfg(test)]
mod tests;
