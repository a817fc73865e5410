use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use std::path::PathBuf;

use super::common::{
    DestinationArgs, ImportBehaviourArgs, MappingArgs, Session, SourceArgs, build_mapping, finish, print_report,
    select_source_projects,
};
use crate::migration::{AlertConfigExport, EntityKind, Orchestrator, Project, read_snapshot, write_snapshot};

#[derive(Args)]
pub struct AlertConfigCommands {
    #[command(subcommand)]
    pub command: AlertConfigSubcommands,
}

#[derive(Subcommand)]
pub enum AlertConfigSubcommands {
    /// Export alert configs from source projects to a JSON file
    Export(ExportArgs),
    /// Import alert configs from a JSON file into destination projects
    Import(ImportArgs),
}

#[derive(Args)]
pub struct ExportArgs {
    /// Snapshot file to write
    #[arg(short, long, default_value = "alertConfigs.json")]
    pub output_file: PathBuf,

    /// Source project id or name to export (repeatable; default: choose interactively or all)
    #[arg(long = "project", value_name = "ID")]
    pub projects: Vec<String>,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Snapshot file produced by `alert-configs export`
    #[arg(short, long, default_value = "alertConfigs.json")]
    pub input_file: PathBuf,

    #[command(flatten)]
    pub destination: DestinationArgs,

    #[command(flatten)]
    pub mapping: MappingArgs,

    #[command(flatten)]
    pub behaviour: ImportBehaviourArgs,
}

/// Returns whether every project was processed
pub async fn handle_alert_config_command(args: AlertConfigCommands, session: &Session) -> Result<bool> {
    match args.command {
        AlertConfigSubcommands::Export(args) => export_command(args, session).await,
        AlertConfigSubcommands::Import(args) => import_command(args, session).await,
    }
}

async fn export_command(args: ExportArgs, session: &Session) -> Result<bool> {
    let client = session.source_client(&args.source)?;
    let projects = select_source_projects(&client, &args.projects).await?;
    if projects.is_empty() {
        println!("{}", "No projects selected, nothing to export".yellow());
        return Ok(true);
    }

    let orchestrator = Orchestrator::new(&client, session.options(None), session.logger.clone())?;
    let outcome = orchestrator.export_alert_configs(&projects).await;

    write_snapshot(&args.output_file, &outcome.elements)
        .with_context(|| format!("Failed to write snapshot: {}", args.output_file.display()))?;

    let total: usize = outcome.elements.iter().map(|e| e.alert_configs.len()).sum();
    println!(
        "📄 Exported {} alert config(s) from {} project(s) to {}",
        total,
        outcome.elements.len(),
        args.output_file.display().to_string().cyan()
    );
    print_report("Export summary", &outcome.report, &[]);

    Ok(finish(&outcome.report, "Alert config export"))
}

async fn import_command(args: ImportArgs, session: &Session) -> Result<bool> {
    let elements: Vec<AlertConfigExport> = read_snapshot(&args.input_file)
        .with_context(|| format!("Failed to read snapshot: {}", args.input_file.display()))?;
    println!(
        "📄 Read {} project(s) from {}",
        elements.len(),
        args.input_file.display().to_string().cyan()
    );

    let client = session.destination_client(&args.destination)?;
    let sources: Vec<Project> = elements.iter().map(|e| e.project.clone()).collect();
    let mapping = build_mapping(&client, &sources, &args.mapping).await?;

    let orchestrator = Orchestrator::new(&client, session.options(Some(&args.behaviour)), session.logger.clone())?;
    let report = orchestrator
        .import_alert_configs(&elements, &mapping)
        .await
        .context("Alert config import aborted")?;

    print_report("Alert config import summary", &report, &[EntityKind::AlertConfig]);
    Ok(finish(&report, "Alert config import"))
}
