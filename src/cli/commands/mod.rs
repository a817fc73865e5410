pub mod alert_configs;
pub mod common;
pub mod db_users;

pub use alert_configs::{AlertConfigCommands, handle_alert_config_command};
pub use common::Session;
pub use db_users::{DbUserCommands, handle_db_user_command};
