use std::env;
use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use clap::Parser;
use tracing::{debug, info};

use futdash::config::Config;
use futdash::web;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// config file (JSON); the built-in defaults are used if omitted
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// directory to source the CSV datasets from, overriding the config
    #[clap(short = 'd', long)]
    data_dir: Option<PathBuf>,

    /// address to serve the dashboard on, overriding the config
    #[clap(short = 'b', long)]
    bind: Option<String>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if let Some(bind) = &self.bind {
            bind.parse::<SocketAddr>()
                .map_err(|err| anyhow!("invalid bind address {bind}: {err}"))?;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
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
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    info!(
        "serving {} datasets from {}",
        config.datasets.len(),
        config.data_dir.display()
    );
    web::serve(Arc::new(config)).await?;
    Ok(())
}
