//! Management API access
//!
//! Talks to an Ops Manager public API (source, and destination for alert
//! configs) and the Atlas admin API v2 (destination for roles and users).
//! The orchestrator only sees the [`ManagementApi`] trait.

pub mod auth;
pub mod client;
pub mod constants;
pub mod logging;
pub mod management;

pub use auth::DigestCredentials;
pub use client::{Endpoint, ManagementClient};
pub use logging::{ApiLogger, LogLevel, MonitoringConfig, OperationContext};
pub use management::{CreateOutcome, ManagementApi};
