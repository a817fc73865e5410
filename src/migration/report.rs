//! Per-project outcome counts for a migration run.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::model::Project;

/// Kind of record being migrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EntityKind {
    AlertConfig,
    CustomRole,
    DatabaseUser,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::AlertConfig => "alert config",
            EntityKind::CustomRole => "custom role",
            EntityKind::DatabaseUser => "database user",
        }
    }

    fn plural(&self) -> &'static str {
        match self {
            EntityKind::AlertConfig => "Alert configs",
            EntityKind::CustomRole => "Custom roles",
            EntityKind::DatabaseUser => "Database users",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl OutcomeCounts {
    pub fn total(&self) -> usize {
        self.created + self.skipped + self.failed
    }

    fn add(&mut self, other: &OutcomeCounts) {
        self.created += other.created;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Counts for one source project imported into one destination project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReport {
    pub source: Project,
    pub destination: Project,
    pub counts: BTreeMap<EntityKind, OutcomeCounts>,
}

impl ProjectReport {
    pub fn new(source: Project, destination: Project) -> Self {
        Self {
            source,
            destination,
            counts: BTreeMap::new(),
        }
    }

    pub fn counts_mut(&mut self, kind: EntityKind) -> &mut OutcomeCounts {
        self.counts.entry(kind).or_default()
    }

    pub fn counts(&self, kind: EntityKind) -> OutcomeCounts {
        self.counts.get(&kind).copied().unwrap_or_default()
    }

    /// `Custom roles: 1 created, 0 skipped, 0 failed`, one line per kind
    pub fn summary_lines(&self) -> Vec<String> {
        self.counts
            .iter()
            .map(|(kind, c)| {
                format!(
                    "{} for {}: {} created, {} skipped, {} failed",
                    kind.plural(),
                    self.source.name,
                    c.created,
                    c.skipped,
                    c.failed
                )
            })
            .collect()
    }
}

/// A project that could not be processed at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectFailure {
    pub project: Project,
    pub reason: String,
}

/// Outcome of an export or import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub projects: Vec<ProjectReport>,
    pub skipped_projects: Vec<Project>,
    pub project_failures: Vec<ProjectFailure>,
}

impl MigrationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, project: ProjectReport) {
        self.projects.push(project);
    }

    pub fn skip_project(&mut self, project: Project) {
        self.skipped_projects.push(project);
    }

    pub fn fail_project(&mut self, project: Project, reason: impl Into<String>) {
        self.project_failures.push(ProjectFailure {
            project,
            reason: reason.into(),
        });
    }

    /// Non-zero exit status is driven by this alone
    pub fn has_project_failures(&self) -> bool {
        !self.project_failures.is_empty()
    }

    /// Counts for `kind` summed over all projects
    pub fn totals(&self, kind: EntityKind) -> OutcomeCounts {
        let mut totals = OutcomeCounts::default();
        for project in &self.projects {
            totals.add(&project.counts(kind));
        }
        totals
    }

    pub fn find(&self, source_id: &str) -> Option<&ProjectReport> {
        self.projects.iter().find(|p| p.source.id == source_id)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.projects.iter().flat_map(ProjectReport::summary_lines).collect();
        for failure in &self.project_failures {
            lines.push(format!("Project {} failed: {}", failure.project, failure.reason));
        }
        lines
    }
}
