use super::commands::{AlertConfigCommands, DbUserCommands};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "janus")]
#[command(about = "Migrate alert configs, custom roles and database users from Ops Manager to Atlas")]
#[command(version)]
pub struct Cli {
    /// Log at debug level, including API request and response events
    #[arg(long, global = true)]
    pub debug: bool,

    /// Config file (default: ./janus.toml, then the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory janus.log is written to
    #[arg(long, global = true, default_value = "log", value_name = "DIR")]
    pub log_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export and import project alert configurations
    AlertConfigs(AlertConfigCommands),
    /// Export and import custom roles and database users
    DbUsers(DbUserCommands),
    /// Print the version
    Version,
}
