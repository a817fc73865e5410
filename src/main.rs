use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use std::process::ExitCode;

use janus::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // .env first so env-backed flags see it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Version) {
        let log_path = janus::logging::init(cli.debug, &cli.log_dir)?;
        info!("Starting janus {}", env!("CARGO_PKG_VERSION"));
        debug!("Logging to {:?}", log_path);
    }

    let succeeded = cli::run(cli).await?;
    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
