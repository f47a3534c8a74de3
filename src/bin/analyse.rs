use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, bail};
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use futdash::analysis::{analyse, AnalysisScope};
use futdash::config::Config;
use futdash::dataset::GoalPolicy;
use futdash::{analysis, dataset, predict, print};

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// config file (JSON); the built-in defaults are used if omitted
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// directory to source the CSV datasets from, overriding the config
    #[clap(short = 'd', long)]
    data_dir: Option<PathBuf>,

    /// competition to analyse
    competition: String,

    /// team to analyse; defaults to the first team listed in the competition
    team: Option<String>,

    /// also train the model and forecast this many games
    #[clap(short = 'g', long)]
    games: Option<u32>,

    /// count results over the team's own matches rather than the whole competition
    #[clap(long)]
    team_scope: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.competition.is_empty() {
            bail!("competition must be specified");
        }
        if self.games == Some(0) {
            bail!("number of games must be at least 1");
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    let source = config
        .source(&args.competition)
        .ok_or(anyhow!("unknown competition {}", args.competition))?;

    let start_time = Instant::now();
    let datasets = dataset::load_all(&config.datasets, &config.data_dir, GoalPolicy::ZeroFill)?;
    let dataset = datasets
        .iter()
        .find(|dataset| dataset.name == source.name)
        .ok_or(anyhow!("{} was not loaded", source.name))?;
    let team = match args.team {
        Some(team) => team,
        None => dataset
            .teams()
            .first()
            .map(|team| team.to_string())
            .ok_or(anyhow!("{} has no matches", dataset.label))?,
    };
    let scope = if args.team_scope {
        AnalysisScope::Team
    } else {
        AnalysisScope::Competition
    };

    let summary = analyse(dataset, &team, scope);
    info!(
        "{} results for {team} ({scope}):\n{}",
        dataset.label,
        Console::default().render(&print::tabulate_summary(&summary))
    );
    match analysis::goals_by_season(dataset) {
        Some(seasons) => info!(
            "goals by season:\n{}",
            Console::default().render(&print::tabulate_seasons(&seasons))
        ),
        None => info!("no season data available for {}", dataset.label),
    }

    if let Some(games) = args.games {
        let dataset = dataset::load(source, &config.data_dir, GoalPolicy::MeanImpute)?;
        let trained = predict::train(&dataset, &config.training)?;
        info!(
            "model accuracy: {:.2}, mean cross-validation accuracy: {:.2}\n{}",
            trained.report.accuracy,
            trained.report.cv_accuracy,
            Console::default().render(&print::tabulate_report(&trained.report.report))
        );
        let forecast = predict::forecast(&dataset, games)?;
        info!("forecast:\n{}", Console::default().render(&print::tabulate_forecast(&forecast)));
    }

    let elapsed = start_time.elapsed();
    info!("took {:.3}s", elapsed.as_millis() as f64 / 1_000.);
    Ok(())
}
