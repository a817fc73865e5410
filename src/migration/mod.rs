//! Alert config, custom role and database user migration
//!
//! Pure stages (`extract`, `transform`, `duplicates`, `password`) are driven
//! by the [`Orchestrator`], which talks to deployments only through
//! [`crate::api::ManagementApi`].

pub mod credentials;
pub mod duplicates;
pub mod extract;
pub mod mapping;
pub mod model;
pub mod orchestrator;
pub mod password;
pub mod report;
pub mod snapshot;
pub mod transform;

pub use credentials::CredentialLedger;
pub use mapping::ProjectMapping;
pub use model::{
    AlertConfigExport, AtlasCustomRole, AtlasDatabaseUser, CredentialRecord, CustomRole, DatabaseUser, Project,
    RoleAssignment, RoleRef, StrippedAlertConfig, UserRoleExport,
};
pub use orchestrator::{ExportOutcome, MigrationOptions, Orchestrator};
pub use password::PasswordGenerator;
pub use report::{EntityKind, MigrationReport, OutcomeCounts, ProjectReport};
pub use snapshot::{read_snapshot, write_snapshot};
