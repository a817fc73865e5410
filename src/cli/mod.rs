pub mod app;
pub mod commands;

use anyhow::Result;

pub use app::{Cli, Commands};
use commands::{Session, handle_alert_config_command, handle_db_user_command};

/// Run a parsed command; `Ok(false)` means some project could not be processed
pub async fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Version => {
            println!("janus {}", env!("CARGO_PKG_VERSION"));
            Ok(true)
        }
        Commands::AlertConfigs(args) => {
            let session = Session::load(cli.config.as_deref(), cli.debug)?;
            handle_alert_config_command(args, &session).await
        }
        Commands::DbUsers(args) => {
            let session = Session::load(cli.config.as_deref(), cli.debug)?;
            handle_db_user_command(args, &session).await
        }
    }
}
