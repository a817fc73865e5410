use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::warn;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

use super::auth::{DigestCredentials, request_uri};
use super::constants::{self, ITEMS_PER_PAGE, USER_AGENT, headers};
use super::logging::{ApiLogger, OperationContext};
use super::management::{CreateOutcome, ManagementApi};
use crate::error::{MigrationError, Result};
use crate::migration::model::{AtlasCustomRole, AtlasDatabaseUser, Project, StrippedAlertConfig};

/// Connection details for one deployment
#[derive(Clone)]
pub struct Endpoint {
    pub url: String,
    pub username: String,
    pub api_key: String,
    pub verify_ssl: bool,
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("api_key", &"[REDACTED]")
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

/// Digest-authenticated client for the Ops Manager public API and the Atlas admin API
pub struct ManagementClient {
    base_url: String,
    credentials: DigestCredentials,
    http_client: reqwest::Client,
    logger: ApiLogger,
}

impl ManagementClient {
    pub fn new(endpoint: &Endpoint, timeout: Duration, logger: ApiLogger) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!endpoint.verify_ssl)
            .build()
            .map_err(|e| MigrationError::transport(&endpoint.url, e))?;

        if !endpoint.verify_ssl {
            warn!("TLS certificate verification is disabled for {}", endpoint.url);
        }

        Ok(Self {
            base_url: endpoint.url.trim_end_matches('/').to_string(),
            credentials: DigestCredentials::new(&endpoint.username, &endpoint.api_key),
            http_client,
            logger,
        })
    }

    fn request(&self, method: &Method, url: &str, accept: &str, body: Option<&[u8]>, authorization: Option<&str>) -> reqwest::RequestBuilder {
        let mut request = self.http_client.request(method.clone(), url).header(ACCEPT, accept);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, headers::CONTENT_TYPE_JSON)
                .body(body.to_vec());
        }
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }
        request
    }

    /// Send a request, answering one digest challenge; returns status and body text
    async fn send(&self, method: Method, url: &str, accept: &str, body: Option<&Value>, context: &OperationContext) -> Result<(u16, String)> {
        let body_bytes = body.map(serde_json::to_vec).transpose()?;

        let mut logged_headers = HashMap::new();
        logged_headers.insert("Accept".to_string(), accept.to_string());
        self.logger.log_request(context, method.as_str(), url, &logged_headers);
        if let Some(body) = body {
            self.logger.log_payload(context, "request", body);
        }

        let started = Instant::now();
        let mut response = self
            .request(&method, url, accept, body_bytes.as_deref(), None)
            .send()
            .await
            .map_err(|e| self.failed(context, url, e))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            if let Some(challenge) = challenge {
                let authorization =
                    self.credentials
                        .authorization(&challenge, &method, &request_uri(url)?, body_bytes.as_deref())?;
                self.logger.log_auth_challenge(context);

                response = self
                    .request(&method, url, accept, body_bytes.as_deref(), Some(&authorization))
                    .send()
                    .await
                    .map_err(|e| self.failed(context, url, e))?;
            }
        }

        let status = response.status().as_u16();
        self.logger.log_response(context, status, started.elapsed());

        let text = response.text().await.map_err(|e| self.failed(context, url, e))?;
        self.logger.complete_operation(context, Some(status), None);
        Ok((status, text))
    }

    fn failed(&self, context: &OperationContext, url: &str, error: reqwest::Error) -> MigrationError {
        let error = MigrationError::transport(url, error);
        self.logger.complete_operation(context, None, Some(&error.to_string()));
        error
    }

    async fn get_json(&self, url: &str, accept: &str, entity: &str) -> Result<Value> {
        let context = self.logger.start_operation("fetch", entity);
        let (status, text) = self.send(Method::GET, url, accept, None, &context).await?;

        if !(200..300).contains(&status) {
            return Err(MigrationError::HttpStatus {
                url: url.to_string(),
                status,
                body: text,
            });
        }

        let payload: Value = serde_json::from_str(&text)?;
        self.logger.log_payload(&context, "response", &payload);
        Ok(payload)
    }

    /// Walk `pageNum` until `totalCount` is reached or a short page comes back
    async fn get_all_results(&self, url: &str, accept: &str, entity: &str) -> Result<Vec<Value>> {
        let mut results = Vec::new();

        for page_num in 1.. {
            let payload = self.get_json(&constants::paged(url, page_num), accept, entity).await?;
            if let Value::Array(items) = payload {
                results.extend(items);
                break;
            }

            let page = results_of(&payload);
            let fetched = page.len();
            results.extend(page);

            let done = match payload.get("totalCount").and_then(Value::as_u64) {
                Some(total) => results.len() as u64 >= total,
                None => fetched < ITEMS_PER_PAGE,
            };
            if done || fetched == 0 {
                break;
            }
        }

        Ok(results)
    }

    async fn post(&self, url: &str, accept: &str, body: &Value, entity: &str) -> Result<CreateOutcome> {
        let context = self.logger.start_operation("create", entity);
        let (status, text) = self.send(Method::POST, url, accept, Some(body), &context).await?;
        Ok(CreateOutcome::from_status(status, text))
    }
}

/// `results` of a list payload, or the payload itself when it is a bare array
pub fn results_of(payload: &Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items.clone(),
        other => other
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    }
}

#[async_trait]
impl ManagementApi for ManagementClient {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let url = constants::projects_endpoint(&self.base_url);
        let results = self.get_all_results(&url, headers::CONTENT_TYPE_JSON, "groups").await?;

        let mut projects = Vec::with_capacity(results.len());
        for group in &results {
            match (group.get("id").and_then(Value::as_str), group.get("name").and_then(Value::as_str)) {
                (Some(id), Some(name)) => projects.push(Project::new(id, name)),
                _ => warn!("Ignoring project without id or name: {}", group),
            }
        }
        Ok(projects)
    }

    async fn alert_configs(&self, project_id: &str) -> Result<Value> {
        let url = constants::alert_configs_endpoint(&self.base_url, project_id);
        let results = self.get_all_results(&url, headers::CONTENT_TYPE_JSON, "alertConfigs").await?;
        Ok(json!({ "results": results }))
    }

    async fn automation_config(&self, project_id: &str) -> Result<Value> {
        let url = constants::automation_config_endpoint(&self.base_url, project_id);
        self.get_json(&url, headers::CONTENT_TYPE_JSON, "automationConfig").await
    }

    async fn custom_roles(&self, project_id: &str) -> Result<Vec<Value>> {
        let url = constants::custom_roles_endpoint(&self.base_url, project_id);
        let payload = self.get_json(&url, headers::ATLAS_ACCEPT, "customDBRoles").await?;
        Ok(results_of(&payload))
    }

    async fn database_users(&self, project_id: &str) -> Result<Vec<Value>> {
        let url = constants::database_users_endpoint(&self.base_url, project_id);
        self.get_all_results(&url, headers::ATLAS_ACCEPT, "databaseUsers").await
    }

    async fn create_alert_config(&self, project_id: &str, config: &StrippedAlertConfig) -> Result<CreateOutcome> {
        let url = constants::alert_configs_endpoint(&self.base_url, project_id);
        self.post(&url, headers::CONTENT_TYPE_JSON, &config.as_value(), "alertConfigs").await
    }

    async fn create_custom_role(&self, project_id: &str, role: &AtlasCustomRole) -> Result<CreateOutcome> {
        let url = constants::custom_roles_endpoint(&self.base_url, project_id);
        let body = serde_json::to_value(role)?;
        self.post(&url, headers::ATLAS_ACCEPT, &body, "customDBRoles").await
    }

    async fn create_database_user(&self, project_id: &str, user: &AtlasDatabaseUser) -> Result<CreateOutcome> {
        let url = constants::database_users_endpoint(&self.base_url, project_id);
        let body = serde_json::to_value(user)?;
        self.post(&url, headers::ATLAS_ACCEPT, &body, "databaseUsers").await
    }
}
