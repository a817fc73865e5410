//! Duplicate detection against destination state.
//!
//! Each detector is built from state fetched right before the decision and
//! is dropped with the project it was built for.

use std::collections::HashSet;

use serde_json::Value;

use super::model::{ADMIN_DATABASE, CustomRole, DatabaseUser, StrippedAlertConfig};
use super::transform::strip_server_fields;

/// Structural equality over stripped alert configs
#[derive(Debug, Default)]
pub struct AlertConfigDuplicates {
    existing: Vec<StrippedAlertConfig>,
}

impl AlertConfigDuplicates {
    /// Existing destination configs are stripped leniently; they are not ours to validate
    pub fn from_existing(existing: &[Value]) -> Self {
        Self {
            existing: existing
                .iter()
                .filter_map(Value::as_object)
                .map(|o| StrippedAlertConfig(strip_server_fields(o)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.existing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.existing.is_empty()
    }

    /// The existing record matching `pending` field for field, if any
    pub fn find(&self, pending: &StrippedAlertConfig) -> Option<&StrippedAlertConfig> {
        self.existing.iter().find(|existing| *existing == pending)
    }

    pub fn contains(&self, pending: &StrippedAlertConfig) -> bool {
        self.find(pending).is_some()
    }
}

/// Custom roles collide on name alone
#[derive(Debug, Default)]
pub struct CustomRoleDuplicates {
    names: HashSet<String>,
}

impl CustomRoleDuplicates {
    /// Destination roles carry `roleName`
    pub fn from_existing(existing: &[Value]) -> Self {
        Self {
            names: existing
                .iter()
                .filter_map(|r| r.get("roleName").and_then(Value::as_str))
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, pending: &CustomRole) -> bool {
        self.names.contains(&pending.role)
    }
}

/// Users collide on `(username, "admin")` whatever their source database
#[derive(Debug, Default)]
pub struct DatabaseUserDuplicates {
    users: HashSet<(String, String)>,
}

impl DatabaseUserDuplicates {
    pub fn from_existing(existing: &[Value]) -> Self {
        Self {
            users: existing
                .iter()
                .filter_map(|u| {
                    let username = u.get("username").and_then(Value::as_str)?;
                    let database = u.get("databaseName").and_then(Value::as_str)?;
                    Some((username.to_string(), database.to_string()))
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains(&self, pending: &DatabaseUser) -> bool {
        self.contains_username(&pending.username)
    }

    pub fn contains_username(&self, username: &str) -> bool {
        self.users
            .contains(&(username.to_string(), ADMIN_DATABASE.to_string()))
    }
}
