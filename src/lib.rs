pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod migration;
pub mod ui;

pub use error::{MigrationError, Result};
