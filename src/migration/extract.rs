//! Entity extraction from raw management API payloads.
//!
//! Everything here is pure: payloads are already in memory. Missing optional
//! collections produce empty results. Entries lacking a required field are
//! dropped and logged as malformed rather than failing the whole payload.

use log::{debug, warn};
use serde_json::Value;

use super::model::{CustomRole, DatabaseUser, RawAlertConfig, RoleRef};
use crate::error::{MigrationError, Result};

/// Alert configs from a `GET .../alertConfigs` payload (`{results: [...]}`)
pub fn extract_alert_configs(payload: &Value) -> Vec<RawAlertConfig> {
    let configs = array_at(payload, &["results"])
        .iter()
        .filter(|c| c.is_object())
        .cloned()
        .collect::<Vec<_>>();
    debug!("Extracted {} alert configs", configs.len());
    configs
}

/// Custom roles from the top-level `roles` array of an automation config
pub fn extract_custom_roles(automation_config: &Value) -> Vec<CustomRole> {
    let mut roles = Vec::new();

    for entry in array_at(automation_config, &["roles"]) {
        match parse_custom_role(entry) {
            Ok(role) => {
                debug!("Extracted custom role: {} on database {}", role.role, role.db);
                roles.push(role);
            }
            Err(e) => log_malformed(&e),
        }
    }

    roles
}

/// Database users from `auth.usersWanted` of an automation config
pub fn extract_database_users(automation_config: &Value) -> Vec<DatabaseUser> {
    let mut users = Vec::new();

    for entry in array_at(automation_config, &["auth", "usersWanted"]) {
        match parse_database_user(entry) {
            Ok(user) => {
                debug!(
                    "Extracted user: {} on database {} with {} roles",
                    user.username,
                    user.database_name,
                    user.roles.len()
                );
                users.push(user);
            }
            Err(e) => log_malformed(&e),
        }
    }

    users
}

fn parse_custom_role(entry: &Value) -> Result<CustomRole> {
    const ENTITY: &str = "custom role";

    Ok(CustomRole {
        role: required_str(entry, "role", ENTITY)?,
        db: required_str(entry, "db", ENTITY)?,
        privileges: array_at(entry, &["privileges"]).to_vec(),
        roles: parse_role_refs(entry, ENTITY)?,
    })
}

fn parse_database_user(entry: &Value) -> Result<DatabaseUser> {
    const ENTITY: &str = "database user";

    Ok(DatabaseUser {
        username: required_str(entry, "user", ENTITY)?,
        database_name: required_str(entry, "db", ENTITY)?,
        roles: parse_role_refs(entry, ENTITY)?,
    })
}

fn parse_role_refs(entry: &Value, entity: &'static str) -> Result<Vec<RoleRef>> {
    array_at(entry, &["roles"])
        .iter()
        .map(|r| Ok(RoleRef::new(required_str(r, "role", entity)?, required_str(r, "db", entity)?)))
        .collect()
}

fn required_str(entry: &Value, field: &str, entity: &'static str) -> Result<String> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| MigrationError::malformed(entity, format!("missing string field `{}`", field), entry))
}

/// Array at a nested path; anything absent or not an array reads as empty
fn array_at<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    let mut current = value;
    for key in path {
        match current.get(key) {
            Some(next) => current = next,
            None => return &[],
        }
    }
    current.as_array().map(Vec::as_slice).unwrap_or(&[])
}

fn log_malformed(error: &MigrationError) {
    if let MigrationError::MalformedRecord { payload, .. } = error {
        warn!("Skipping entry: {} - payload: {}", error, payload);
    } else {
        warn!("Skipping entry: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn automation_config() -> Value {
        json!({
            "roles": [
                {
                    "role": "reporting",
                    "db": "admin",
                    "privileges": [{"resource": {"db": "sales", "collection": ""}, "actions": ["find"]}],
                    "roles": [{"role": "read", "db": "sales"}]
                },
                {"role": "empty", "db": "admin"}
            ],
            "auth": {
                "usersWanted": [
                    {"user": "alice", "db": "app", "roles": [{"role": "readWrite", "db": "app"}]},
                    {"user": "bob", "db": "admin"}
                ]
            }
        })
    }

    #[test]
    fn test_extract_custom_roles() {
        let roles = extract_custom_roles(&automation_config());
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].role, "reporting");
        assert_eq!(roles[0].privileges.len(), 1);
        assert_eq!(roles[0].roles, vec![RoleRef::new("read", "sales")]);
        assert!(roles[1].privileges.is_empty());
        assert!(roles[1].roles.is_empty());
    }

    #[test]
    fn test_extract_database_users() {
        let users = extract_database_users(&automation_config());
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "alice");
        assert_eq!(users[0].database_name, "app");
        assert_eq!(users[0].roles, vec![RoleRef::new("readWrite", "app")]);
        assert!(users[1].roles.is_empty());
    }

    #[test]
    fn test_missing_collections_are_empty() {
        let config = json!({"processes": []});
        assert!(extract_custom_roles(&config).is_empty());
        assert!(extract_database_users(&config).is_empty());
        assert!(extract_database_users(&json!({"auth": {}})).is_empty());
        assert!(extract_alert_configs(&json!({})).is_empty());
    }

    #[test]
    fn test_roles_and_users_extract_independently() {
        let config = json!({"auth": {"usersWanted": [{"user": "carol", "db": "admin", "roles": []}]}});
        assert!(extract_custom_roles(&config).is_empty());
        assert_eq!(extract_database_users(&config).len(), 1);
    }

    #[test]
    fn test_malformed_entries_are_dropped() {
        let config = json!({
            "roles": [{"db": "admin"}, {"role": "ok", "db": "admin"}],
            "auth": {"usersWanted": [
                {"user": "dave", "db": "admin", "roles": [{"role": "read"}]},
                {"user": "erin", "db": "admin"}
            ]}
        });
        let roles = extract_custom_roles(&config);
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role, "ok");

        let users = extract_database_users(&config);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "erin");
    }

    #[test]
    fn test_extract_alert_configs_keeps_objects() {
        let payload = json!({"results": [{"id": "1"}, "garbage", {"id": "2"}], "totalCount": 3});
        let configs = extract_alert_configs(&payload);
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[1]["id"], "2");
    }
}
