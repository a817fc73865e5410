//! Source-to-destination format transformation.

use serde_json::{Map, Value};

use super::model::{
    ADMIN_DATABASE, AtlasCustomRole, AtlasDatabaseUser, CustomRole, DatabaseUser, RawAlertConfig,
    RoleAssignment, RoleRef, StrippedAlertConfig,
};
use crate::error::{MigrationError, Result};

/// Fields the server assigns to an alert config; invalid on re-submission
pub const SERVER_ASSIGNED_FIELDS: [&str; 5] = ["links", "id", "created", "updated", "groupId"];

/// Strip an exported alert config for import.
///
/// Every server-assigned field must be present on a raw record; a missing one
/// means the payload does not have the shape we exported.
pub fn strip_for_import(record: &RawAlertConfig) -> Result<StrippedAlertConfig> {
    const ENTITY: &str = "alert config";

    let object = record
        .as_object()
        .ok_or_else(|| MigrationError::malformed(ENTITY, "not a JSON object", record))?;

    if let Some(missing) = SERVER_ASSIGNED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
        return Err(MigrationError::malformed(
            ENTITY,
            format!("missing server-assigned field `{}`", missing),
            record,
        ));
    }

    Ok(StrippedAlertConfig(strip_server_fields(object)))
}

/// Remove whichever server-assigned fields are present. Idempotent.
pub fn strip_server_fields(object: &Map<String, Value>) -> Map<String, Value> {
    let mut stripped = object.clone();
    for field in SERVER_ASSIGNED_FIELDS {
        stripped.remove(field);
    }
    stripped
}

/// `{role, db}` -> `{roleName, databaseName}`
pub fn role_assignment(role: &RoleRef) -> RoleAssignment {
    RoleAssignment {
        role_name: role.role.clone(),
        database_name: role.db.clone(),
    }
}

pub fn role_assignments(roles: &[RoleRef]) -> Vec<RoleAssignment> {
    roles.iter().map(role_assignment).collect()
}

/// Custom role in destination shape; `privileges` only when non-empty
pub fn custom_role_to_atlas(role: &CustomRole) -> AtlasCustomRole {
    AtlasCustomRole {
        role_name: role.role.clone(),
        inherited_roles: role.roles.clone(),
        privileges: if role.privileges.is_empty() {
            None
        } else {
            Some(role.privileges.clone())
        },
    }
}

/// Destination user body, always authenticated against `admin`
pub fn database_user_to_atlas(user: &DatabaseUser, password: String) -> AtlasDatabaseUser {
    AtlasDatabaseUser {
        username: user.username.clone(),
        password,
        database_name: ADMIN_DATABASE.to_string(),
        roles: role_assignments(&user.roles),
    }
}
