//! Arguments and helpers shared by the alert-config and db-user commands.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use log::{info, warn};
use std::path::Path;

use crate::api::{ApiLogger, ManagementApi, ManagementClient};
use crate::config::{Config, EndpointConfig};
use crate::migration::{EntityKind, MigrationOptions, MigrationReport, Project, ProjectMapping};
use crate::ui::prompts;

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Source Ops Manager base URL
    #[arg(id = "source_url", long = "source-url", env = "JANUS_SOURCE_URL", value_name = "URL")]
    pub url: Option<String>,

    /// Source API username (public key)
    #[arg(id = "source_username", long = "source-username", env = "JANUS_SOURCE_USERNAME", value_name = "USER")]
    pub username: Option<String>,

    /// Source API key; prompted for when missing on a terminal
    #[arg(id = "source_api_key", long = "source-api-key", env = "JANUS_SOURCE_API_KEY", hide_env_values = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Skip TLS certificate verification for the source
    #[arg(id = "source_insecure", long = "source-insecure")]
    pub insecure: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DestinationArgs {
    /// Destination base URL (Atlas or Ops Manager)
    #[arg(id = "destination_url", long = "destination-url", env = "JANUS_DESTINATION_URL", value_name = "URL")]
    pub url: Option<String>,

    /// Destination API username (public key)
    #[arg(id = "destination_username", long = "destination-username", env = "JANUS_DESTINATION_USERNAME", value_name = "USER")]
    pub username: Option<String>,

    /// Destination API key; prompted for when missing on a terminal
    #[arg(
        id = "destination_api_key",
        long = "destination-api-key",
        env = "JANUS_DESTINATION_API_KEY",
        hide_env_values = true,
        value_name = "KEY"
    )]
    pub api_key: Option<String>,

    /// Skip TLS certificate verification for the destination
    #[arg(id = "destination_insecure", long = "destination-insecure")]
    pub insecure: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct MappingArgs {
    /// Import source project SRC into destination project DST (repeatable)
    #[arg(long = "map", value_name = "SRC=DST", value_parser = parse_mapping)]
    pub map: Vec<(String, String)>,

    /// Do not import source project SRC (repeatable)
    #[arg(long = "skip-project", value_name = "SRC")]
    pub skip_project: Vec<String>,

    /// Never prompt: unmapped projects go to the destination project with the same id
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ImportBehaviourArgs {
    /// Create records even when an equal one already exists at the destination
    #[arg(long)]
    pub no_skip_duplicates: bool,

    /// Abort the import at the first failed record
    #[arg(long)]
    pub stop_on_error: bool,
}

fn parse_mapping(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((src, dst)) if !src.trim().is_empty() && !dst.trim().is_empty() => {
            Ok((src.trim().to_string(), dst.trim().to_string()))
        }
        _ => Err(format!("expected SRC=DST, got '{}'", value)),
    }
}

/// Loaded configuration plus the logger handed to clients and the orchestrator
pub struct Session {
    pub config: Config,
    pub logger: ApiLogger,
}

impl Session {
    pub fn load(config_path: Option<&Path>, debug: bool) -> Result<Self> {
        let config = Config::load(config_path)?;
        let logger = ApiLogger::new(config.logging.monitoring(debug));
        Ok(Self { config, logger })
    }

    pub fn source_client(&self, args: &SourceArgs) -> Result<ManagementClient> {
        let mut endpoint = self.config.source.clone();
        endpoint.overlay(args.url.clone(), args.username.clone(), args.api_key.clone(), args.insecure);
        self.client(endpoint, "source")
    }

    pub fn destination_client(&self, args: &DestinationArgs) -> Result<ManagementClient> {
        let mut endpoint = self.config.destination.clone();
        endpoint.overlay(args.url.clone(), args.username.clone(), args.api_key.clone(), args.insecure);
        self.client(endpoint, "destination")
    }

    fn client(&self, mut endpoint: EndpointConfig, side: &str) -> Result<ManagementClient> {
        if !endpoint.has_api_key() && prompts::is_interactive() {
            endpoint.api_key = Some(prompts::prompt_api_key(side, endpoint.username.as_deref())?);
        }
        let endpoint = endpoint.resolve(side)?;
        info!("Connecting to {} at {}", side, endpoint.url);

        ManagementClient::new(&endpoint, self.config.migration.timeout(), self.logger.clone())
            .with_context(|| format!("Failed to create {} client", side))
    }

    pub fn options(&self, behaviour: Option<&ImportBehaviourArgs>) -> MigrationOptions {
        let mut options = self.config.migration.options();
        if let Some(behaviour) = behaviour {
            if behaviour.no_skip_duplicates {
                options.skip_duplicates = false;
            }
            if behaviour.stop_on_error {
                options.continue_on_error = false;
            }
        }
        options
    }
}

/// Projects to export: requested ids (or names), else a prompt, else all of them
pub async fn select_source_projects(api: &dyn ManagementApi, requested: &[String]) -> Result<Vec<Project>> {
    let projects = api
        .list_projects()
        .await
        .context("Failed to list source projects")?;
    info!("Found {} source project(s)", projects.len());

    if !requested.is_empty() {
        return requested
            .iter()
            .map(|wanted| {
                projects
                    .iter()
                    .find(|p| &p.id == wanted || &p.name == wanted)
                    .cloned()
                    .with_context(|| format!("Source project '{}' not found", wanted))
            })
            .collect();
    }

    if prompts::is_interactive() {
        return prompts::select_projects(&projects);
    }

    Ok(projects)
}

/// Resolve where each snapshot project goes before anything is imported
pub async fn build_mapping(api: &dyn ManagementApi, sources: &[Project], args: &MappingArgs) -> Result<ProjectMapping> {
    let destinations = api
        .list_projects()
        .await
        .context("Failed to list destination projects")?;

    let mut mapping = ProjectMapping::new();
    for (src, dst) in &args.map {
        mapping.map(src, dst);
    }
    for src in &args.skip_project {
        mapping.skip(src);
    }

    let interactive = !args.yes && prompts::is_interactive();
    for source in sources {
        if mapping.contains(&source.id) {
            continue;
        }

        if interactive {
            match prompts::select_destination(source, &destinations)? {
                Some(id) => mapping.map(&source.id, id),
                None => mapping.skip(&source.id),
            };
        } else if destinations.iter().any(|d| d.id == source.id) {
            mapping.map(&source.id, &source.id);
        } else {
            warn!("No destination project with id {} for {}; skipping it", source.id, source);
            mapping.skip(&source.id);
        }
    }

    if interactive {
        let mapped = sources.iter().filter(|s| mapping.resolve(&s.id).is_some()).count();
        let proceed = prompts::prompt_confirmation(&format!("Import {} project(s) now?", mapped), true)?;
        if !proceed {
            anyhow::bail!("Import cancelled");
        }
    }

    Ok(mapping)
}

/// Colored end-of-run summary on stdout
pub fn print_report(title: &str, report: &MigrationReport, kinds: &[EntityKind]) {
    println!();
    println!("{}", title.bold());

    for kind in kinds {
        let counts = report.totals(*kind);
        println!(
            "  {:<16} {} created, {} skipped, {} failed",
            format!("{}s:", kind),
            counts.created.to_string().green(),
            counts.skipped.to_string().yellow(),
            if counts.failed > 0 {
                counts.failed.to_string().red()
            } else {
                counts.failed.to_string().normal()
            }
        );
    }

    for project in &report.skipped_projects {
        println!("  {} {}", "skipped".dimmed(), project);
    }
    for failure in &report.project_failures {
        println!("  {} {}: {}", "✗".red(), failure.project, failure.reason);
    }
}

/// Final status line; returns whether the run was free of project failures
pub fn finish(report: &MigrationReport, what: &str) -> bool {
    if report.has_project_failures() {
        println!(
            "{} {} finished with {} failed project(s)",
            "⚠".yellow(),
            what,
            report.project_failures.len()
        );
        false
    } else {
        println!("{} {} complete", "✓".green(), what);
        true
    }
}
