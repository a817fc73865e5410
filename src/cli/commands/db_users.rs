use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use log::error;
use std::path::{Path, PathBuf};

use super::common::{
    DestinationArgs, ImportBehaviourArgs, MappingArgs, Session, SourceArgs, build_mapping, finish, print_report,
    select_source_projects,
};
use crate::migration::{
    CredentialLedger, EntityKind, Orchestrator, Project, UserRoleExport, read_snapshot, write_snapshot,
};

const DEFAULT_SNAPSHOT: &str = "dbUsers.json";
const DEFAULT_PASSWORDS: &str = "passwords.csv";

#[derive(Args)]
pub struct DbUserCommands {
    #[command(subcommand)]
    pub command: DbUserSubcommands,
}

#[derive(Subcommand)]
pub enum DbUserSubcommands {
    /// Export custom roles and database users from source automation configs
    Export(ExportArgs),
    /// Create exported roles and users in destination projects with generated passwords
    Import(ImportArgs),
    /// Export then import in one run
    Migrate(MigrateArgs),
}

#[derive(Args)]
pub struct ExportArgs {
    /// Snapshot file to write
    #[arg(short, long, default_value = DEFAULT_SNAPSHOT)]
    pub output_file: PathBuf,

    /// Source project id or name to export (repeatable; default: choose interactively or all)
    #[arg(long = "project", value_name = "ID")]
    pub projects: Vec<String>,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Snapshot file produced by `db-users export`
    #[arg(short, long, default_value = DEFAULT_SNAPSHOT)]
    pub input_file: PathBuf,

    /// CSV file generated passwords are appended to
    #[arg(short, long, default_value = DEFAULT_PASSWORDS)]
    pub password_output_file: PathBuf,

    #[command(flatten)]
    pub destination: DestinationArgs,

    #[command(flatten)]
    pub mapping: MappingArgs,

    #[command(flatten)]
    pub behaviour: ImportBehaviourArgs,
}

#[derive(Args)]
pub struct MigrateArgs {
    /// Intermediate snapshot file
    #[arg(short, long, default_value = DEFAULT_SNAPSHOT)]
    pub output_file: PathBuf,

    /// CSV file generated passwords are appended to
    #[arg(short, long, default_value = DEFAULT_PASSWORDS)]
    pub password_output_file: PathBuf,

    /// Source project id or name to migrate (repeatable)
    #[arg(long = "project", value_name = "ID")]
    pub projects: Vec<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub destination: DestinationArgs,

    #[command(flatten)]
    pub mapping: MappingArgs,

    #[command(flatten)]
    pub behaviour: ImportBehaviourArgs,
}

/// Returns whether every project was processed
pub async fn handle_db_user_command(args: DbUserCommands, session: &Session) -> Result<bool> {
    match args.command {
        DbUserSubcommands::Export(args) => export(&args.source, &args.projects, &args.output_file, session).await,
        DbUserSubcommands::Import(args) => {
            import(
                &args.input_file,
                &args.password_output_file,
                &args.destination,
                &args.mapping,
                &args.behaviour,
                session,
            )
            .await
        }
        DbUserSubcommands::Migrate(args) => {
            println!("{}", "Step 1/2: export".bold());
            let exported = export(&args.source, &args.projects, &args.output_file, session).await?;

            println!();
            println!("{}", "Step 2/2: import".bold());
            let imported = import(
                &args.output_file,
                &args.password_output_file,
                &args.destination,
                &args.mapping,
                &args.behaviour,
                session,
            )
            .await?;

            Ok(exported && imported)
        }
    }
}

async fn export(source: &SourceArgs, requested: &[String], output_file: &Path, session: &Session) -> Result<bool> {
    let client = session.source_client(source)?;
    let projects = select_source_projects(&client, requested).await?;
    if projects.is_empty() {
        println!("{}", "No projects selected, nothing to export".yellow());
        return Ok(true);
    }

    let orchestrator = Orchestrator::new(&client, session.options(None), session.logger.clone())?;
    let outcome = orchestrator.export_users_and_roles(&projects).await;

    write_snapshot(output_file, &outcome.elements)
        .with_context(|| format!("Failed to write snapshot: {}", output_file.display()))?;

    let users: usize = outcome.elements.iter().map(|e| e.database_users.len()).sum();
    let roles: usize = outcome.elements.iter().map(|e| e.custom_roles.len()).sum();
    println!(
        "📄 Exported {} user(s) and {} custom role(s) from {} project(s) to {}",
        users,
        roles,
        outcome.elements.len(),
        output_file.display().to_string().cyan()
    );
    print_report("Export summary", &outcome.report, &[]);

    Ok(finish(&outcome.report, "Database user export"))
}

async fn import(
    input_file: &Path,
    password_file: &Path,
    destination: &DestinationArgs,
    mapping_args: &MappingArgs,
    behaviour: &ImportBehaviourArgs,
    session: &Session,
) -> Result<bool> {
    let elements: Vec<UserRoleExport> = read_snapshot(input_file)
        .with_context(|| format!("Failed to read snapshot: {}", input_file.display()))?;
    println!(
        "📄 Read {} project(s) from {}",
        elements.len(),
        input_file.display().to_string().cyan()
    );

    let client = session.destination_client(destination)?;
    let sources: Vec<Project> = elements.iter().map(|e| e.project.clone()).collect();
    let mapping = build_mapping(&client, &sources, mapping_args).await?;

    let orchestrator = Orchestrator::new(&client, session.options(Some(behaviour)), session.logger.clone())?;
    let mut ledger = CredentialLedger::new();
    let result = orchestrator
        .import_users_and_roles(&elements, &mapping, &mut ledger)
        .await;

    // Passwords of users already created must survive an aborted import
    let flushed = ledger
        .flush(password_file)
        .with_context(|| format!("Failed to write credentials to {}", password_file.display()));
    if let Err(e) = &flushed {
        error!("{:#}", e);
    }

    let report = result.context("Database user import aborted")?;
    flushed?;

    print_report(
        "Database user import summary",
        &report,
        &[EntityKind::CustomRole, EntityKind::DatabaseUser],
    );
    if !ledger.is_empty() {
        println!(
            "🔑 {} generated password(s) written to {}",
            ledger.len(),
            password_file.display().to_string().cyan()
        );
        println!("{}", "Security reminder: rotate all generated passwords immediately!".yellow().bold());
    }

    Ok(finish(&report, "Database user import"))
}
