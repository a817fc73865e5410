//! Export and import, driven one project, one entity type, one record at a time.
//!
//! Every record moves through
//! `extracted -> transformed -> (duplicate | submitted) -> (created | conflict | failed)`.
//! Destination state used for duplicate detection is fetched per project
//! right before its records are decided, so earlier runs are always visible.

use chrono::{Local, SecondsFormat};
use log::{debug, error, info, warn};
use serde_json::Value;

use super::credentials::CredentialLedger;
use super::duplicates::{AlertConfigDuplicates, CustomRoleDuplicates, DatabaseUserDuplicates};
use super::extract::{extract_alert_configs, extract_custom_roles, extract_database_users};
use super::mapping::ProjectMapping;
use super::model::{ADMIN_DATABASE, AlertConfigExport, CredentialRecord, Project, UserRoleExport};
use super::password::{DEFAULT_PASSWORD_LENGTH, PasswordGenerator};
use super::report::{EntityKind, MigrationReport, OutcomeCounts, ProjectReport};
use super::transform::{custom_role_to_atlas, database_user_to_atlas, strip_for_import};
use crate::api::{ApiLogger, CreateOutcome, ManagementApi};
use crate::error::{MigrationError, Result};

/// Run-wide behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOptions {
    /// Keep going after a record fails; otherwise the first failure aborts the import
    pub continue_on_error: bool,
    /// Check destination state and skip records that already exist
    pub skip_duplicates: bool,
    pub password_length: usize,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            skip_duplicates: true,
            password_length: DEFAULT_PASSWORD_LENGTH,
        }
    }
}

/// Snapshot elements plus the projects that could not be exported
#[derive(Debug, Clone)]
pub struct ExportOutcome<T> {
    pub elements: Vec<T>,
    pub report: MigrationReport,
}

/// Why a project stopped early
enum ProjectError {
    /// Source payload or destination state could not be fetched
    Fetch(MigrationError),
    /// A record failed with `continue_on_error` off
    Abort(MigrationError),
}

pub struct Orchestrator<'a> {
    api: &'a dyn ManagementApi,
    options: MigrationOptions,
    logger: ApiLogger,
    passwords: PasswordGenerator,
}

impl<'a> Orchestrator<'a> {
    /// `api` is the source for exports and the destination for imports
    pub fn new(api: &'a dyn ManagementApi, options: MigrationOptions, logger: ApiLogger) -> Result<Self> {
        let passwords = PasswordGenerator::new(options.password_length)?;
        Ok(Self {
            api,
            options,
            logger,
            passwords,
        })
    }

    pub async fn export_alert_configs(&self, projects: &[Project]) -> ExportOutcome<AlertConfigExport> {
        let mut elements = Vec::with_capacity(projects.len());
        let mut report = MigrationReport::new();

        for project in projects {
            info!("Exporting alert configs from project {}", project);
            match self.api.alert_configs(&project.id).await {
                Ok(payload) => {
                    let alert_configs = extract_alert_configs(&payload);
                    info!("  → {} alert config(s)", alert_configs.len());
                    elements.push(AlertConfigExport {
                        project: project.clone(),
                        alert_configs,
                    });
                }
                Err(e) => {
                    warn!("Skipping project {}: could not fetch alert configs: {}", project, e);
                    report.fail_project(project.clone(), e.to_string());
                }
            }
        }

        let total: usize = elements.iter().map(|e| e.alert_configs.len()).sum();
        info!("Exported {} alert config(s) from {} project(s)", total, elements.len());

        ExportOutcome { elements, report }
    }

    pub async fn export_users_and_roles(&self, projects: &[Project]) -> ExportOutcome<UserRoleExport> {
        let mut elements = Vec::with_capacity(projects.len());
        let mut report = MigrationReport::new();

        for project in projects {
            info!("Exporting users and roles from project {}", project);
            match self.api.automation_config(&project.id).await {
                Ok(config) => {
                    let custom_roles = extract_custom_roles(&config);
                    let database_users = extract_database_users(&config);
                    info!("  → {} user(s), {} custom role(s)", database_users.len(), custom_roles.len());
                    elements.push(UserRoleExport {
                        project: project.clone(),
                        custom_roles,
                        database_users,
                    });
                }
                Err(e) => {
                    warn!(
                        "Skipping project {}: could not fetch automation config (automation may not be enabled): {}",
                        project, e
                    );
                    report.fail_project(project.clone(), e.to_string());
                }
            }
        }

        let users: usize = elements.iter().map(|e| e.database_users.len()).sum();
        let roles: usize = elements.iter().map(|e| e.custom_roles.len()).sum();
        info!(
            "Exported {} user(s), {} custom role(s) from {} project(s)",
            users,
            roles,
            elements.len()
        );

        ExportOutcome { elements, report }
    }

    /// Import alert configs into the mapped destination projects
    pub async fn import_alert_configs(&self, elements: &[AlertConfigExport], mapping: &ProjectMapping) -> Result<MigrationReport> {
        let destinations = self.api.list_projects().await?;
        let mut report = MigrationReport::new();

        for element in elements {
            let Some(destination) = self.resolve_destination(&element.project, mapping, &destinations, &mut report) else {
                continue;
            };
            info!(
                "Importing {} alert config(s) from {} into {}",
                element.alert_configs.len(),
                element.project,
                destination
            );

            let mut project_report = ProjectReport::new(element.project.clone(), destination.clone());
            let result = self
                .import_project_alert_configs(element, destination, project_report.counts_mut(EntityKind::AlertConfig))
                .await;
            self.finish_project(&mut report, project_report, result)?;
        }

        Ok(report)
    }

    /// Import custom roles, then database users, into the mapped destination projects.
    ///
    /// Every user created gets a fresh password recorded in `ledger`; the
    /// ledger keeps what was created even when the import aborts.
    pub async fn import_users_and_roles(
        &self,
        elements: &[UserRoleExport],
        mapping: &ProjectMapping,
        ledger: &mut CredentialLedger,
    ) -> Result<MigrationReport> {
        let mut report = MigrationReport::new();
        let result = self.import_users_and_roles_into(elements, mapping, ledger, &mut report).await;

        if !ledger.is_empty() {
            warn!(
                "Security reminder: {} generated password(s) must be distributed and rotated immediately!",
                ledger.len()
            );
        }

        result.map(|()| report)
    }

    async fn import_users_and_roles_into(
        &self,
        elements: &[UserRoleExport],
        mapping: &ProjectMapping,
        ledger: &mut CredentialLedger,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let destinations = self.api.list_projects().await?;
        let timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);

        for element in elements {
            let Some(destination) = self.resolve_destination(&element.project, mapping, &destinations, report) else {
                continue;
            };
            info!(
                "Importing {} custom role(s) and {} user(s) from {} into {}",
                element.custom_roles.len(),
                element.database_users.len(),
                element.project,
                destination
            );

            let mut project_report = ProjectReport::new(element.project.clone(), destination.clone());
            let mut result = self
                .import_project_roles(element, destination, project_report.counts_mut(EntityKind::CustomRole))
                .await;
            if result.is_ok() {
                result = self
                    .import_project_users(
                        element,
                        destination,
                        &timestamp,
                        ledger,
                        project_report.counts_mut(EntityKind::DatabaseUser),
                    )
                    .await;
            }
            self.finish_project(report, project_report, result)?;
        }

        Ok(())
    }

    fn resolve_destination<'d>(
        &self,
        source: &Project,
        mapping: &ProjectMapping,
        destinations: &'d [Project],
        report: &mut MigrationReport,
    ) -> Option<&'d Project> {
        let Some(destination_id) = mapping.resolve(&source.id) else {
            info!("Skipping project {}", source);
            report.skip_project(source.clone());
            return None;
        };

        let destination = destinations.iter().find(|p| p.id == destination_id);
        if destination.is_none() {
            warn!(
                "Skipping project {}: destination project {} does not exist",
                source, destination_id
            );
            report.fail_project(
                source.clone(),
                format!("destination project {} does not exist", destination_id),
            );
        }
        destination
    }

    fn finish_project(
        &self,
        report: &mut MigrationReport,
        project_report: ProjectReport,
        result: std::result::Result<(), ProjectError>,
    ) -> Result<()> {
        for line in project_report.summary_lines() {
            self.logger.log_summary(&line);
        }
        let source = project_report.source.clone();
        report.push(project_report);

        match result {
            Ok(()) => Ok(()),
            Err(ProjectError::Fetch(e)) => {
                error!("Skipping the rest of project {}: {}", source, e);
                report.fail_project(source, e.to_string());
                Ok(())
            }
            Err(ProjectError::Abort(e)) => {
                error!("Aborting import at project {}: {}", source, e);
                Err(e)
            }
        }
    }

    async fn import_project_alert_configs(
        &self,
        element: &AlertConfigExport,
        destination: &Project,
        counts: &mut OutcomeCounts,
    ) -> std::result::Result<(), ProjectError> {
        if element.alert_configs.is_empty() {
            debug!("No alert configs to import from {}", element.project);
            return Ok(());
        }

        let existing = if self.options.skip_duplicates {
            let payload = self
                .api
                .alert_configs(&destination.id)
                .await
                .map_err(ProjectError::Fetch)?;
            let existing = AlertConfigDuplicates::from_existing(&extract_alert_configs(&payload));
            debug!("{} existing alert config(s) in {}", existing.len(), destination);
            Some(existing)
        } else {
            None
        };

        for raw in &element.alert_configs {
            let config = match strip_for_import(raw) {
                Ok(config) => config,
                Err(e) => {
                    self.record_failure(EntityKind::AlertConfig, destination, raw, e, counts)?;
                    continue;
                }
            };

            let label = config.label();
            if existing.as_ref().is_some_and(|d| d.contains(&config)) {
                info!("Skipping existing alert config {} in {}", label, destination.name);
                counts.skipped += 1;
                continue;
            }

            let result = self.api.create_alert_config(&destination.id, &config).await;
            self.settle(EntityKind::AlertConfig, &label, destination, &config.as_value(), result, counts)?;
        }

        Ok(())
    }

    async fn import_project_roles(
        &self,
        element: &UserRoleExport,
        destination: &Project,
        counts: &mut OutcomeCounts,
    ) -> std::result::Result<(), ProjectError> {
        if element.custom_roles.is_empty() {
            return Ok(());
        }
        info!("  → Creating {} custom role(s)...", element.custom_roles.len());

        let existing = if self.options.skip_duplicates {
            let roles = self
                .api
                .custom_roles(&destination.id)
                .await
                .map_err(ProjectError::Fetch)?;
            Some(CustomRoleDuplicates::from_existing(&roles))
        } else {
            None
        };

        for role in &element.custom_roles {
            if existing.as_ref().is_some_and(|d| d.contains(role)) {
                info!("Skipping existing custom role {} in {}", role.role, destination.name);
                counts.skipped += 1;
                continue;
            }

            let body = custom_role_to_atlas(role);
            let result = self.api.create_custom_role(&destination.id, &body).await;
            let payload = serde_json::to_value(&body).unwrap_or_default();
            self.settle(EntityKind::CustomRole, &role.role, destination, &payload, result, counts)?;
        }

        Ok(())
    }

    async fn import_project_users(
        &self,
        element: &UserRoleExport,
        destination: &Project,
        timestamp: &str,
        ledger: &mut CredentialLedger,
        counts: &mut OutcomeCounts,
    ) -> std::result::Result<(), ProjectError> {
        if element.database_users.is_empty() {
            return Ok(());
        }
        info!("  → Creating {} database user(s)...", element.database_users.len());

        let existing = if self.options.skip_duplicates {
            let users = self
                .api
                .database_users(&destination.id)
                .await
                .map_err(ProjectError::Fetch)?;
            Some(DatabaseUserDuplicates::from_existing(&users))
        } else {
            None
        };

        for user in &element.database_users {
            if existing.as_ref().is_some_and(|d| d.contains(user)) {
                info!(
                    "Skipping existing user {}@{} in {}",
                    user.username, ADMIN_DATABASE, destination.name
                );
                counts.skipped += 1;
                continue;
            }

            // Only users actually submitted get a password
            let body = database_user_to_atlas(user, self.passwords.generate());
            let result = self.api.create_database_user(&destination.id, &body).await;
            let payload = serde_json::to_value(&body).unwrap_or_default();

            if self.settle(EntityKind::DatabaseUser, &user.username, destination, &payload, result, counts)? {
                ledger.record(CredentialRecord {
                    timestamp: timestamp.to_string(),
                    source_project: element.project.clone(),
                    destination_project: destination.clone(),
                    username: body.username.clone(),
                    auth_database: body.database_name.clone(),
                    password: body.password,
                    roles: body.roles,
                });
                self.verify_user(&user.username, destination).await;
            }
        }

        Ok(())
    }

    /// A user the destination accepted should show up in its user list
    async fn verify_user(&self, username: &str, destination: &Project) {
        let label = EntityKind::DatabaseUser.label();
        match self.api.database_users(&destination.id).await {
            Ok(users) if DatabaseUserDuplicates::from_existing(&users).contains_username(username) => {
                debug!("Verified user {}@{} in {}", username, ADMIN_DATABASE, destination.name);
            }
            Ok(_) => self
                .logger
                .log_unverified(label, username, &destination.to_string(), "not listed by the destination"),
            Err(e) => self
                .logger
                .log_unverified(label, username, &destination.to_string(), &e.to_string()),
        }
    }

    /// Count a create result; returns whether the record was created
    fn settle(
        &self,
        kind: EntityKind,
        name: &str,
        destination: &Project,
        payload: &Value,
        result: Result<CreateOutcome>,
        counts: &mut OutcomeCounts,
    ) -> std::result::Result<bool, ProjectError> {
        match result {
            Ok(CreateOutcome::Created) => {
                info!("Created {} {} in {}", kind, name, destination.name);
                counts.created += 1;
                Ok(true)
            }
            Ok(CreateOutcome::Conflict) => {
                debug!("{} {} already exists in {} (409), skipping", kind, name, destination.name);
                counts.skipped += 1;
                Ok(false)
            }
            Ok(CreateOutcome::Rejected { status, reason }) => {
                let error = MigrationError::RemoteRejected {
                    entity: kind.label(),
                    name: name.to_string(),
                    project: destination.to_string(),
                    status,
                    reason,
                };
                self.record_failure(kind, destination, payload, error, counts)?;
                Ok(false)
            }
            Err(e) => {
                self.record_failure(kind, destination, payload, e, counts)?;
                Ok(false)
            }
        }
    }

    fn record_failure(
        &self,
        kind: EntityKind,
        destination: &Project,
        payload: &Value,
        error: MigrationError,
        counts: &mut OutcomeCounts,
    ) -> std::result::Result<(), ProjectError> {
        error!("Failed to import {} into {}: {}", kind, destination, error);
        self.logger
            .log_failed_payload(kind.label(), &destination.to_string(), payload);
        counts.failed += 1;

        if self.options.continue_on_error {
            Ok(())
        } else {
            Err(ProjectError::Abort(error))
        }
    }
}
