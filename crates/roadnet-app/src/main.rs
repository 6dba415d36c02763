//! Main application entry point.

use anyhow::{Context, Result};
use clap::Parser;
use roadnet_app::Shell;
use roadnet_core::{Session, SessionConfig};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Road network diagram editor shell", long_about = None)]
struct Args {
    /// Session config file (JSON)
    #[clap(long)]
    config: Option<PathBuf>,

    /// Read commands from a file instead of stdin
    #[clap(long)]
    script: Option<PathBuf>,

    /// Default directory for `export`
    #[clap(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!("Starting RoadNet");

    let config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    let session = Session::with_config(config);
    let stdout = io::stdout().lock();

    match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening script {}", path.display()))?;
            Shell::new(session, BufReader::new(file), stdout, args.out_dir).run()?;
        }
        None => {
            Shell::new(session, io::stdin().lock(), stdout, args.out_dir).run()?;
        }
    }
    Ok(())
}
