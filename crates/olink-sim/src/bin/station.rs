//! Base station process. Polls the shared buffer directory and serves
//! every terminal until killed.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use olink_sim::{SimConfig, StationRuntime};

#[derive(Parser, Debug)]
#[command(name = "olink-station", about = "OFDMA link base station")]
struct Args {
    /// Config file; defaults to OLINK_CONFIG or ./olink.yaml.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SimConfig::load_from(path)?,
        None => SimConfig::load()?,
    };

    let mut runtime = StationRuntime::new(&config)?;
    runtime.run();
    Ok(())
}
