//! Error types for the migration library.

use thiserror::Error;

/// Main error type for export/import operations.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Network, timeout or TLS failure talking to a management API
    #[error("Transport error calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status on a request that was expected to succeed
    #[error("HTTP {status} from {url}: {body}")]
    HttpStatus { url: String, status: u16, body: String },

    /// Digest challenge could not be parsed or answered
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A record is missing a field migration depends on
    #[error("Malformed {entity} record: {reason}")]
    MalformedRecord {
        entity: &'static str,
        reason: String,
        payload: String,
    },

    /// The destination refused to create a record (anything but 201/202/409)
    #[error("Destination rejected {entity} '{name}' in project {project}: {status} {reason}")]
    RemoteRejected {
        entity: &'static str,
        name: String,
        project: String,
        status: u16,
        reason: String,
    },

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl MigrationError {
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        MigrationError::Transport {
            url: url.into(),
            source,
        }
    }

    pub fn malformed(
        entity: &'static str,
        reason: impl Into<String>,
        payload: &serde_json::Value,
    ) -> Self {
        MigrationError::MalformedRecord {
            entity,
            reason: reason.into(),
            payload: payload.to_string(),
        }
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrationError>;
