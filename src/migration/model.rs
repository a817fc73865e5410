//! Domain records moved between deployments.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authentication database every destination user is created on
pub const ADMIN_DATABASE: &str = "admin";

/// A project (group) on either deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Alert config as returned by the source, server-assigned fields included
pub type RawAlertConfig = Value;

/// Alert config with `links`, `id`, `created`, `updated` and `groupId` removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrippedAlertConfig(pub Map<String, Value>);

impl StrippedAlertConfig {
    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Short human label for log lines
    pub fn label(&self) -> String {
        let event = self
            .0
            .get("eventTypeName")
            .and_then(Value::as_str)
            .unwrap_or("<unknown event>");
        match self.0.get("enabled").and_then(Value::as_bool) {
            Some(false) => format!("{} (disabled)", event),
            _ => event.to_string(),
        }
    }
}

/// `{role, db}` reference used by users and inherited roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub role: String,
    pub db: String,
}

impl RoleRef {
    pub fn new(role: impl Into<String>, db: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            db: db.into(),
        }
    }
}

/// Custom role in source shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRole {
    pub role: String,
    pub db: String,
    #[serde(default)]
    pub privileges: Vec<Value>,
    #[serde(default)]
    pub roles: Vec<RoleRef>,
}

/// Database user in source shape; never carries a password
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseUser {
    pub username: String,
    pub database_name: String,
    #[serde(default)]
    pub roles: Vec<RoleRef>,
}

/// Role assignment in destination shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub role_name: String,
    pub database_name: String,
}

/// Custom role body for `POST .../customDBRoles/roles`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasCustomRole {
    pub role_name: String,
    pub inherited_roles: Vec<RoleRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileges: Option<Vec<Value>>,
}

/// User body for `POST .../databaseUsers`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasDatabaseUser {
    pub username: String,
    pub password: String,
    pub database_name: String,
    pub roles: Vec<RoleAssignment>,
}

impl std::fmt::Debug for AtlasDatabaseUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtlasDatabaseUser")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("database_name", &self.database_name)
            .field("roles", &self.roles)
            .finish()
    }
}

/// One generated credential, persisted to the credentials CSV
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub timestamp: String,
    pub source_project: Project,
    pub destination_project: Project,
    pub username: String,
    pub auth_database: String,
    pub password: String,
    pub roles: Vec<RoleAssignment>,
}

impl CredentialRecord {
    /// `roleName@databaseName` entries joined by `;`
    pub fn role_summary(&self) -> String {
        self.roles
            .iter()
            .map(|r| format!("{}@{}", r.role_name, r.database_name))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("timestamp", &self.timestamp)
            .field("source_project", &self.source_project)
            .field("destination_project", &self.destination_project)
            .field("username", &self.username)
            .field("auth_database", &self.auth_database)
            .field("password", &"[REDACTED]")
            .field("roles", &self.role_summary())
            .finish()
    }
}

/// Snapshot element for alert config migrations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AlertConfigExport {
    pub project: Project,
    pub alert_configs: Vec<RawAlertConfig>,
}

/// Snapshot element for user and role migrations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserRoleExport {
    pub project: Project,
    pub custom_roles: Vec<CustomRole>,
    pub database_users: Vec<DatabaseUser>,
}
