use std::path::Path;

use axum::body::Body;
use axum::http::Request;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use super::*;
use crate::predict::forest::ForestOptions;
use crate::predict::TrainOptions;
use crate::testing;

const BRASILEIRAO: &str = "\
ID,datetime,home_team,home_team_state,away_team,away_team_state,home_goal,away_goal,season,round
1,2019-04-27 19:00:00,Flamengo,RJ,Vasco,RJ,2,1,2019,1
2,2019-04-28 16:00:00,Vasco,RJ,Fluminense,RJ,0,0,2019,1
3,2020-08-09 16:00:00,Fluminense,RJ,Flamengo,RJ,1,3,2020,1
";

const BRAZILIAN_CUP: &str = "\
round,datetime,home_team,away_team,home_goal,away_goal,season
1,2021-03-10 21:30:00,Bahia,Vitoria,2,2,2021
";

const BR_FOOTBALL: &str = "\
tournament,home,home_goal,away_goal,away,home_corner,away_corner,home_attack,away_attack,\
home_shots,away_shots,time,date,ht_diff,at_diff,ht_result,at_result,total_corners
Serie A,Bahia,2,0,Vitoria,5,3,100,90,12,8,21:00,2023-09-24,2,-2,W,L,8
";

fn libertadores() -> String {
    let mut csv = "datetime,home_team,away_team,home_goal,away_goal,season,stage\n".to_string();
    let teams = ["Boca Juniors", "River Plate", "Palmeiras", "Penarol"];
    for index in 0..16 {
        csv.push_str(&format!(
            "2022-0{}-1{} 21:00:00,{},{},{},{},2022,group\n",
            1 + index % 9,
            index % 10,
            teams[index % 4],
            teams[(index + 1) % 4],
            index * 7 % 5,
            index * 3 % 4
        ));
    }
    csv
}

fn fixture() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    write_all(dir.path());
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        training: TrainOptions {
            forest: ForestOptions {
                trees: 10,
                ..ForestOptions::default()
            },
            ..TrainOptions::default()
        },
        ..Config::default()
    };
    (dir, router(Arc::new(config)))
}

fn write_all(dir: &Path) {
    testing::write_file(dir, "Brasileirao_Matches.csv", BRASILEIRAO);
    testing::write_file(dir, "Brazilian_Cup_Matches.csv", BRAZILIAN_CUP);
    testing::write_file(dir, "Libertadores_Matches.csv", &libertadores());
    testing::write_file(dir, "BR-Football-Dataset.csv", BR_FOOTBALL);
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn analysis_page_defaults_to_first_competition() {
    let (_dir, app) = fixture();
    let (status, body) = get(app, "/").await;
    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("Analysis results for Brasileirao:"));
    assert!(body.contains("<option value=\"brasileirao\" selected>Brasileirão</option>"));
    assert!(body.contains("<option value=\"Flamengo\" selected>Flamengo</option>"));
    assert!(body.contains("<td>3</td><td>1</td><td>1</td><td>1</td><td>7</td><td>2</td>"));
    assert!(body.contains("Matches from 2019-04-27 to 2020-08-09."));
    assert_eq!(2, body.matches("<svg").count());
}

#[tokio::test]
async fn analysis_page_without_seasons() {
    let (_dir, app) = fixture();
    let (status, body) = get(app, "/?competition=br_football&team=Vitoria").await;
    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("No season data available for Br_football."));
    assert!(body.contains("<option value=\"Vitoria\" selected>Vitoria</option>"));
    assert_eq!(1, body.matches("<svg").count());
}

#[tokio::test]
async fn analysis_page_team_scope() {
    let (_dir, app) = fixture();
    let (status, body) = get(app, "/?competition=brasileirao&team=Vasco&scope=team").await;
    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("<option value=\"team\" selected>"));
    assert!(body.contains("<td>2</td><td>0</td><td>1</td><td>1</td><td>1</td><td>2</td>"));
}

#[tokio::test]
async fn switching_competition_resets_team() {
    let (_dir, app) = fixture();
    let (status, body) = get(app.clone(), "/?competition=brazilian_cup&team=Flamengo").await;
    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("<option value=\"Bahia\" selected>Bahia</option>"));
    assert!(!body.contains("<option value=\"Flamengo\""));
    assert!(body.contains("<td>1</td><td>0</td><td>1</td><td>0</td><td>4</td><td>2</td>"));

    let (status, body) = get(app, "/predict?competition=libertadores&team=Flamengo").await;
    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("<option value=\"Boca Juniors\" selected>Boca Juniors</option>"));
    assert!(!body.contains("Flamengo"));
}

#[tokio::test]
async fn summary_of_absent_team_has_positive_zero_conceded() {
    let (_dir, app) = fixture();
    let (status, json) = get_json(app.clone(), "/api/summary?competition=brazilian_cup&team=Flamengo").await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!("Flamengo", json["team"]);
    let conceded = json["summary"]["goals_conceded"].as_f64().unwrap();
    assert_eq!(0.0, conceded);
    assert!(conceded.is_sign_positive());

    let (status, body) = get(app, "/api/summary?competition=brazilian_cup&team=Flamengo").await;
    assert_eq!(StatusCode::OK, status);
    assert!(!body.contains("-0"));
}

#[tokio::test]
async fn unknown_competition_is_not_found() {
    let (_dir, app) = fixture();
    let (status, body) = get(app.clone(), "/?competition=serie_b").await;
    assert_eq!(StatusCode::NOT_FOUND, status);
    assert!(body.contains("unknown competition serie_b"));

    let (status, _) = get(app.clone(), "/predict?competition=serie_b").await;
    assert_eq!(StatusCode::NOT_FOUND, status);

    let (status, json) = get_json(app, "/api/teams?competition=serie_b").await;
    assert_eq!(StatusCode::NOT_FOUND, status);
    assert_eq!("unknown competition serie_b", json["error"]);
}

#[tokio::test]
async fn missing_file_fails_analysis_but_not_prediction() {
    let (dir, app) = fixture();
    std::fs::remove_file(dir.path().join("Brazilian_Cup_Matches.csv")).unwrap();

    let (status, body) = get(app.clone(), "/").await;
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status);
    assert!(body.contains("class=\"error\""));

    let (status, body) = get(app, "/predict?competition=libertadores").await;
    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("File not found:"));
    assert!(body.contains("Model accuracy:"));
    assert!(!body.contains("<option value=\"brazilian_cup\""));
}

#[tokio::test]
async fn prediction_page() {
    let (_dir, app) = fixture();
    let (status, body) = get(app.clone(), "/predict?competition=libertadores&games=10").await;
    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("Model accuracy:"));
    assert!(body.contains("Mean cross-validation accuracy:"));
    assert!(body.contains("weighted avg"));
    assert!(!body.contains("Forecast home goals"));
    assert!(body.contains("name=\"games\" min=\"1\" value=\"10\""));

    let (status, body) = get(app, "/predict?competition=libertadores&games=10&forecast=1").await;
    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("Forecast for 10 games"));
    assert!(body.contains("Forecast home goals:"));
}

#[tokio::test]
async fn prediction_page_with_too_few_matches() {
    let (_dir, app) = fixture();
    let (status, body) = get(app, "/predict").await;
    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("at least 5 samples are required, but only 3 are available"));
}

#[tokio::test]
async fn prediction_needs_a_game() {
    let (_dir, app) = fixture();
    let (status, _) = get(app.clone(), "/predict?games=0").await;
    assert_eq!(StatusCode::BAD_REQUEST, status);
    let (status, _) = get(app, "/api/predict?competition=libertadores&games=0").await;
    assert_eq!(StatusCode::BAD_REQUEST, status);
}

#[tokio::test]
async fn cleared_games_field_defaults_to_one() {
    let (_dir, app) = fixture();
    let (status, body) = get(
        app.clone(),
        "/predict?competition=libertadores&team=Palmeiras&games=&forecast=1",
    )
    .await;
    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("Forecast for 1 games"));
    assert!(body.contains("name=\"games\" min=\"1\" value=\"1\" required"));

    let (status, json) = get_json(app, "/api/predict?competition=libertadores&games=").await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(1, json["forecast"]["games"]);
}

#[tokio::test]
async fn malformed_games_field_is_reported_on_the_page() {
    let (_dir, app) = fixture();
    let (status, body) = get(app, "/predict?competition=libertadores&games=ten&forecast=1").await;
    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert!(body.contains("<div class=\"error\">the number of games must be a whole number, not ten</div>"));
    assert!(body.contains("<title>Football Result Prediction</title>"));
}

#[tokio::test]
async fn api_competitions() {
    let (_dir, app) = fixture();
    let (status, json) = get_json(app, "/api/competitions").await;
    assert_eq!(StatusCode::OK, status);
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|competition| competition["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(vec!["brasileirao", "brazilian_cup", "libertadores", "br_football"], names);
    assert_eq!("Copa do Brasil", json[1]["label"]);
}

#[tokio::test]
async fn api_teams() {
    let (_dir, app) = fixture();
    let (status, json) = get_json(app, "/api/teams?competition=brasileirao").await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(serde_json::json!(["Flamengo", "Vasco", "Fluminense"]), json);
}

#[tokio::test]
async fn api_summary() {
    let (_dir, app) = fixture();
    let (status, json) = get_json(app, "/api/summary?competition=brasileirao&team=Fluminense").await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!("competition", json["scope"]);
    let summary = &json["summary"];
    assert_eq!(3, summary["total_matches"]);
    assert_eq!(1, summary["wins"]);
    assert_eq!(1, summary["draws"]);
    assert_eq!(1, summary["losses"]);
    assert_eq!(3.0, summary["goals_conceded"]);
}

#[tokio::test]
async fn api_seasons() {
    let (_dir, app) = fixture();
    let (status, json) = get_json(app.clone(), "/api/seasons?competition=brasileirao").await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!("2019", json[0]["season"]);
    assert_eq!(2.0, json[0]["goals_scored"]);
    assert_eq!("2020", json[1]["season"]);

    let (status, json) = get_json(app, "/api/seasons?competition=br_football").await;
    assert_eq!(StatusCode::OK, status);
    assert!(json.is_null());
}

#[tokio::test]
async fn api_predict() {
    let (_dir, app) = fixture();
    let (status, json) = get_json(app.clone(), "/api/predict?competition=libertadores&games=4").await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(4, json["forecast"]["games"]);
    assert_eq!(3, json["training"]["test_samples"]);
    assert_eq!(13, json["training"]["train_samples"]);
    let accuracy = json["training"]["accuracy"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&accuracy));

    let (status, json) = get_json(app, "/api/predict?competition=brasileirao").await;
    assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, status);
    assert!(json["error"].as_str().unwrap().starts_with("at least 5 samples"));
}

#[test]
fn team_selection() {
    let teams = vec!["Bahia".to_string(), "Vitoria".to_string()];
    assert_eq!(Some("Vitoria".to_string()), select_team(Some("Vitoria".into()), &teams));
    assert_eq!(Some("Bahia".to_string()), select_team(Some("Flamengo".into()), &teams));
    assert_eq!(Some("Bahia".to_string()), select_team(Some("".into()), &teams));
    assert_eq!(Some("Bahia".to_string()), select_team(None, &teams));
    assert_eq!(None, select_team(Some("Flamengo".into()), &[]));
}

#[test]
fn games_validation() {
    assert_eq!(1, validate_games(None).unwrap());
    assert_eq!(1, validate_games(Some("")).unwrap());
    assert_eq!(1, validate_games(Some("  ")).unwrap());
    assert_eq!(12, validate_games(Some("12")).unwrap());
    assert!(matches!(validate_games(Some("0")), Err(WebError::InvalidRequest(_))));
    assert!(matches!(validate_games(Some("-3")), Err(WebError::InvalidRequest(_))));
}

#[test]
fn error_statuses() {
    assert_eq!(StatusCode::BAD_REQUEST, WebError::InvalidRequest("bad".into()).status());
    assert_eq!(
        StatusCode::UNPROCESSABLE_ENTITY,
        WebError::Predict(PredictError::EmptyDataset("br_football".into())).status()
    );
    assert_eq!(
        StatusCode::INTERNAL_SERVER_ERROR,
        WebError::Predict(PredictError::Model("no samples".into())).status()
    );
}

#[test]
fn capitalise_titles() {
    assert_eq!("Brasileirao", capitalise("brasileirao"));
    assert_eq!("Br_football", capitalise("br_football"));
    assert_eq!("", capitalise(""));
}
