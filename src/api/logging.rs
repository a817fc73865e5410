//! Structured logging with correlation tracking for management API calls
//!
//! One `ApiLogger` is built from configuration at startup and handed to the
//! API client and the orchestrator; nothing here touches global logger state.

use log::{debug, error, info, trace, warn};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::{Duration, Instant};

const REDACTED: &str = "[REDACTED]";

/// Monitoring and logging configuration
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub request_logging: bool,
    pub log_payloads: bool,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            request_logging: true,
            log_payloads: false,
            log_level: LogLevel::Info,
        }
    }
}

impl MonitoringConfig {
    /// Everything on, for `--debug` runs
    pub fn verbose() -> Self {
        Self {
            request_logging: true,
            log_payloads: true,
            log_level: LogLevel::Debug,
        }
    }

    pub fn disabled() -> Self {
        Self {
            request_logging: false,
            log_payloads: false,
            log_level: LogLevel::Error,
        }
    }
}

/// Structured logger for API operations with correlation tracking
#[derive(Debug, Clone)]
pub struct ApiLogger {
    config: MonitoringConfig,
}

/// Context for a single API operation with correlation tracking
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Unique correlation ID for this operation
    pub correlation_id: String,
    /// Operation type (fetch, create, verify)
    pub operation_type: String,
    /// Entity being operated on
    pub entity: String,
    /// Start time for duration tracking
    pub start_time: Instant,
}

impl Default for ApiLogger {
    fn default() -> Self {
        Self::new(MonitoringConfig::default())
    }
}

impl ApiLogger {
    pub fn new(config: MonitoringConfig) -> Self {
        Self { config }
    }

    /// Start tracking a new operation
    pub fn start_operation(&self, operation_type: &str, entity: &str) -> OperationContext {
        let context = OperationContext {
            correlation_id: uuid::Uuid::new_v4().to_string(),
            operation_type: operation_type.to_string(),
            entity: entity.to_string(),
            start_time: Instant::now(),
        };

        if self.config.request_logging && self.should_log(LogLevel::Trace) {
            let log_data = json!({
                "event": "operation_started",
                "correlation_id": context.correlation_id,
                "operation_type": context.operation_type,
                "entity": context.entity,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });

            trace!("API Operation Started: {}", log_data);
        }

        context
    }

    /// Log HTTP request details
    pub fn log_request(&self, context: &OperationContext, method: &str, url: &str, headers: &HashMap<String, String>) {
        if !self.config.request_logging || !self.should_log(LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "http_request",
            "correlation_id": context.correlation_id,
            "operation_type": context.operation_type,
            "entity": context.entity,
            "method": method,
            "url": url,
            "headers": self.sanitize_headers(headers),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("HTTP Request: {}", log_data);
    }

    /// Log a request or response body with secrets masked
    pub fn log_payload(&self, context: &OperationContext, direction: &str, payload: &Value) {
        if !self.config.log_payloads || !self.should_log(LogLevel::Debug) {
            return;
        }

        debug!(
            "HTTP {} body [{}]: {}",
            direction,
            context.correlation_id,
            redact_payload(payload)
        );
    }

    /// Log HTTP response details
    pub fn log_response(&self, context: &OperationContext, status_code: u16, duration: Duration) {
        if !self.config.request_logging || !self.should_log(LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "http_response",
            "correlation_id": context.correlation_id,
            "operation_type": context.operation_type,
            "entity": context.entity,
            "status_code": status_code,
            "duration_ms": duration.as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("HTTP Response: {}", log_data);
    }

    /// Digest challenge answered; the retry carries the Authorization header
    pub fn log_auth_challenge(&self, context: &OperationContext) {
        if self.config.request_logging && self.should_log(LogLevel::Trace) {
            trace!("Answering digest challenge [{}] for {}", context.correlation_id, context.entity);
        }
    }

    /// Complete an operation and log its outcome
    pub fn complete_operation(&self, context: &OperationContext, status_code: Option<u16>, error_message: Option<&str>) {
        if !self.config.request_logging || !self.should_log(LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "operation_completed",
            "correlation_id": context.correlation_id,
            "operation_type": context.operation_type,
            "entity": context.entity,
            "duration_ms": context.elapsed().as_millis(),
            "status_code": status_code,
            "error_message": error_message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("API Operation Completed: {}", log_data);
    }

    /// Log the payload of a record that could not be migrated
    pub fn log_failed_payload(&self, entity: &str, project: &str, payload: &Value) {
        if !self.should_log(LogLevel::Error) {
            return;
        }

        error!(
            "Failed {} payload for project {}: {}",
            entity,
            project,
            redact_payload(payload)
        );
    }

    /// Warn about a record that was created but could not be confirmed
    pub fn log_unverified(&self, entity: &str, name: &str, project: &str, reason: &str) {
        if self.should_log(LogLevel::Warn) {
            warn!("Created {} {} in project {} but could not verify it: {}", entity, name, project, reason);
        }
    }

    /// Summary line for one entity type of one project
    pub fn log_summary(&self, line: &str) {
        if self.should_log(LogLevel::Info) {
            info!("{}", line);
        }
    }

    /// Check if we should log at the given level
    fn should_log(&self, level: LogLevel) -> bool {
        match (self.config.log_level, level) {
            (LogLevel::Error, LogLevel::Error) => true,
            (LogLevel::Warn, LogLevel::Error | LogLevel::Warn) => true,
            (LogLevel::Info, LogLevel::Error | LogLevel::Warn | LogLevel::Info) => true,
            (LogLevel::Debug, LogLevel::Error | LogLevel::Warn | LogLevel::Info | LogLevel::Debug) => true,
            (LogLevel::Trace, _) => true,
            _ => false,
        }
    }

    /// Sanitize headers to remove sensitive information
    fn sanitize_headers(&self, headers: &HashMap<String, String>) -> HashMap<String, String> {
        let mut sanitized = HashMap::new();

        for (key, value) in headers {
            let key_lower = key.to_lowercase();
            if key_lower.contains("authorization") || key_lower.contains("token") || key_lower.contains("key") {
                sanitized.insert(key.clone(), REDACTED.to_string());
            } else {
                sanitized.insert(key.clone(), value.clone());
            }
        }

        sanitized
    }
}

/// Copy of `payload` with every `password`/`apiKey` value masked, at any depth
pub fn redact_payload(payload: &Value) -> Value {
    match payload {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let lower = k.to_lowercase();
                    if lower.contains("password") || lower == "apikey" || lower == "secret" {
                        (k.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (k.clone(), redact_payload(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_payload).collect()),
        other => other.clone(),
    }
}

impl OperationContext {
    /// Calculate elapsed time since operation started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
