//! In-memory deployment used as source and destination in integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use janus::api::{ApiLogger, CreateOutcome, ManagementApi, MonitoringConfig};
use janus::migration::{AtlasCustomRole, AtlasDatabaseUser, MigrationOptions, Orchestrator, Project, StrippedAlertConfig};
use janus::{MigrationError, Result};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    projects: Vec<Project>,
    alert_configs: HashMap<String, Vec<Value>>,
    automation: HashMap<String, Value>,
    roles: HashMap<String, Vec<Value>>,
    users: HashMap<String, Vec<Value>>,
    failing_projects: HashSet<String>,
    alert_status: HashMap<String, u16>,
    role_status: HashMap<String, u16>,
    user_status: HashMap<String, u16>,
    unreachable: HashSet<String>,
    hide_created_users: bool,
    posted_alert_configs: Vec<Value>,
    posted_roles: Vec<AtlasCustomRole>,
    posted_users: Vec<AtlasDatabaseUser>,
    calls: Vec<String>,
    next_id: usize,
}

/// Fake management API with scripted responses
#[derive(Default)]
pub struct FakeDeployment {
    state: Mutex<State>,
}

impl FakeDeployment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().projects.push(Project::new(id, name));
        self
    }

    pub fn with_alert_configs(self, project_id: &str, configs: Vec<Value>) -> Self {
        self.state
            .lock()
            .unwrap()
            .alert_configs
            .insert(project_id.to_string(), configs);
        self
    }

    pub fn with_automation(self, project_id: &str, config: Value) -> Self {
        self.state
            .lock()
            .unwrap()
            .automation
            .insert(project_id.to_string(), config);
        self
    }

    pub fn with_role(self, project_id: &str, role_name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .roles
            .entry(project_id.to_string())
            .or_default()
            .push(json!({"roleName": role_name, "actions": [], "inheritedRoles": []}));
        self
    }

    pub fn with_user(self, project_id: &str, username: &str, database_name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .users
            .entry(project_id.to_string())
            .or_default()
            .push(json!({"username": username, "databaseName": database_name, "roles": []}));
        self
    }

    /// Every fetch for this project fails with HTTP 500
    pub fn failing_project(self, project_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_projects
            .insert(project_id.to_string());
        self
    }

    pub fn respond_to_alert(self, event_type: &str, status: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .alert_status
            .insert(event_type.to_string(), status);
        self
    }

    pub fn respond_to_role(self, role_name: &str, status: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .role_status
            .insert(role_name.to_string(), status);
        self
    }

    pub fn respond_to_user(self, username: &str, status: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .user_status
            .insert(username.to_string(), status);
        self
    }

    /// Creating the named alert event type, role or user fails before any response arrives
    pub fn unreachable_for(self, name: &str) -> Self {
        self.state.lock().unwrap().unreachable.insert(name.to_string());
        self
    }

    /// Accept user creates but never list the new users
    pub fn hiding_created_users(self) -> Self {
        self.state.lock().unwrap().hide_created_users = true;
        self
    }

    pub fn posted_alert_configs(&self) -> Vec<Value> {
        self.state.lock().unwrap().posted_alert_configs.clone()
    }

    pub fn posted_roles(&self) -> Vec<AtlasCustomRole> {
        self.state.lock().unwrap().posted_roles.clone()
    }

    pub fn posted_users(&self) -> Vec<AtlasDatabaseUser> {
        self.state.lock().unwrap().posted_users.clone()
    }

    /// `role:<name>` and `user:<name>` in the order creates arrived
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn alert_configs_in(&self, project_id: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .alert_configs
            .get(project_id)
            .cloned()
            .unwrap_or_default()
    }

    fn transport_failure(state: &State, name: &str, project_id: &str) -> Result<()> {
        if !state.unreachable.contains(name) {
            return Ok(());
        }
        // An invalid URL is the simplest way to get a real reqwest::Error
        let source = reqwest::Client::new().get("http://[::1").build().unwrap_err();
        Err(MigrationError::transport(format!("fake://groups/{}", project_id), source))
    }

    fn check(&self, state: &State, project_id: &str) -> Result<()> {
        if state.failing_projects.contains(project_id) {
            return Err(MigrationError::HttpStatus {
                url: format!("fake://groups/{}", project_id),
                status: 500,
                body: "Internal Server Error".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ManagementApi for FakeDeployment {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.state.lock().unwrap().projects.clone())
    }

    async fn alert_configs(&self, project_id: &str) -> Result<Value> {
        let state = self.state.lock().unwrap();
        self.check(&state, project_id)?;
        let configs = state.alert_configs.get(project_id).cloned().unwrap_or_default();
        Ok(json!({ "results": configs, "totalCount": configs.len() }))
    }

    async fn automation_config(&self, project_id: &str) -> Result<Value> {
        let state = self.state.lock().unwrap();
        self.check(&state, project_id)?;
        state
            .automation
            .get(project_id)
            .cloned()
            .ok_or_else(|| MigrationError::HttpStatus {
                url: format!("fake://groups/{}/automationConfig", project_id),
                status: 404,
                body: "automation not enabled".into(),
            })
    }

    async fn custom_roles(&self, project_id: &str) -> Result<Vec<Value>> {
        let state = self.state.lock().unwrap();
        self.check(&state, project_id)?;
        Ok(state.roles.get(project_id).cloned().unwrap_or_default())
    }

    async fn database_users(&self, project_id: &str) -> Result<Vec<Value>> {
        let state = self.state.lock().unwrap();
        self.check(&state, project_id)?;
        Ok(state.users.get(project_id).cloned().unwrap_or_default())
    }

    async fn create_alert_config(&self, project_id: &str, config: &StrippedAlertConfig) -> Result<CreateOutcome> {
        let mut state = self.state.lock().unwrap();
        state.posted_alert_configs.push(config.as_value());

        let event = config.0.get("eventTypeName").and_then(Value::as_str).unwrap_or_default();
        Self::transport_failure(&state, event, project_id)?;
        let status = state.alert_status.get(event).copied().unwrap_or(201);
        if status == 201 {
            state.next_id += 1;
            let mut stored = config.0.clone();
            stored.insert("id".into(), json!(format!("alert-{}", state.next_id)));
            stored.insert("groupId".into(), json!(project_id));
            stored.insert("created".into(), json!("2024-05-01T10:00:00Z"));
            stored.insert("updated".into(), json!("2024-05-01T10:00:00Z"));
            stored.insert("links".into(), json!([]));
            state
                .alert_configs
                .entry(project_id.to_string())
                .or_default()
                .push(Value::Object(stored));
        }
        Ok(CreateOutcome::from_status(status, format!("status {}", status)))
    }

    async fn create_custom_role(&self, project_id: &str, role: &AtlasCustomRole) -> Result<CreateOutcome> {
        let mut state = self.state.lock().unwrap();
        state.posted_roles.push(role.clone());
        state.calls.push(format!("role:{}", role.role_name));
        Self::transport_failure(&state, &role.role_name, project_id)?;

        let status = state.role_status.get(&role.role_name).copied().unwrap_or(201);
        if status == 201 {
            state
                .roles
                .entry(project_id.to_string())
                .or_default()
                .push(json!({"roleName": role.role_name}));
        }
        Ok(CreateOutcome::from_status(status, format!("status {}", status)))
    }

    async fn create_database_user(&self, project_id: &str, user: &AtlasDatabaseUser) -> Result<CreateOutcome> {
        let mut state = self.state.lock().unwrap();
        state.posted_users.push(user.clone());
        state.calls.push(format!("user:{}", user.username));
        Self::transport_failure(&state, &user.username, project_id)?;

        let status = state.user_status.get(&user.username).copied().unwrap_or(201);
        if (status == 201 || status == 202) && !state.hide_created_users {
            state
                .users
                .entry(project_id.to_string())
                .or_default()
                .push(json!({"username": user.username, "databaseName": user.database_name, "roles": user.roles}));
        }
        Ok(CreateOutcome::from_status(status, format!("status {}", status)))
    }
}

pub fn quiet_logger() -> ApiLogger {
    ApiLogger::new(MonitoringConfig::disabled())
}

pub fn orchestrator<'a>(api: &'a FakeDeployment, options: MigrationOptions) -> Orchestrator<'a> {
    Orchestrator::new(api, options, quiet_logger()).unwrap()
}

/// Alert config as the source returns it, server-assigned fields included
pub fn source_alert(id: &str, event_type: &str, threshold: u64) -> Value {
    json!({
        "id": id,
        "groupId": "src-project",
        "created": "2023-01-01T00:00:00Z",
        "updated": "2023-06-01T00:00:00Z",
        "links": [{"rel": "self", "href": format!("https://om.example.com/alertConfigs/{}", id)}],
        "eventTypeName": event_type,
        "enabled": true,
        "threshold": {"operator": "GREATER_THAN", "threshold": threshold, "units": "RAW"},
        "notifications": [{"typeName": "GROUP", "intervalMin": 5, "delayMin": 0, "emailEnabled": true}]
    })
}
