//! The seam between the orchestrator and a management API deployment.

use async_trait::async_trait;
use serde_json::Value;

use super::constants::status;
use crate::error::Result;
use crate::migration::model::{AtlasCustomRole, AtlasDatabaseUser, Project, StrippedAlertConfig};

/// How the destination answered a create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// 201 or 202
    Created,
    /// 409: the entity already exists
    Conflict,
    /// Any other status
    Rejected { status: u16, reason: String },
}

impl CreateOutcome {
    pub fn from_status(status_code: u16, body: impl Into<String>) -> Self {
        match status_code {
            status::CREATED | status::ACCEPTED => CreateOutcome::Created,
            status::CONFLICT => CreateOutcome::Conflict,
            other => CreateOutcome::Rejected {
                status: other,
                reason: body.into(),
            },
        }
    }
}

/// Operations the migration needs from a deployment, on either side.
///
/// Fetches return `Err` for transport failures and non-success statuses.
/// Creates return `Err` only for transport failures; every HTTP status maps to
/// a [`CreateOutcome`].
#[async_trait]
pub trait ManagementApi: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Raw `{results: [...]}` payload of a project's alert configs
    async fn alert_configs(&self, project_id: &str) -> Result<Value>;

    /// Raw automation config of a project
    async fn automation_config(&self, project_id: &str) -> Result<Value>;

    /// Destination custom roles as returned by the API
    async fn custom_roles(&self, project_id: &str) -> Result<Vec<Value>>;

    /// Destination database users as returned by the API
    async fn database_users(&self, project_id: &str) -> Result<Vec<Value>>;

    async fn create_alert_config(&self, project_id: &str, config: &StrippedAlertConfig) -> Result<CreateOutcome>;

    async fn create_custom_role(&self, project_id: &str, role: &AtlasCustomRole) -> Result<CreateOutcome>;

    async fn create_database_user(&self, project_id: &str, user: &AtlasDatabaseUser) -> Result<CreateOutcome>;
}
