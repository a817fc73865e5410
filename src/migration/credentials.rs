//! In-memory buffer of generated credentials, flushed to CSV once.

use std::fs::OpenOptions;
use std::path::Path;

use log::info;

use super::model::CredentialRecord;
use crate::error::Result;

pub const CSV_HEADER: [&str; 9] = [
    "timestamp",
    "source_project",
    "source_project_id",
    "destination_project",
    "destination_project_id",
    "username",
    "auth_database",
    "password",
    "roles",
];

/// Generated credentials collected during an import
#[derive(Debug, Default)]
pub struct CredentialLedger {
    records: Vec<CredentialRecord>,
}

impl CredentialLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: CredentialRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[CredentialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append every record to `path`.
    ///
    /// The header is written only when the file is new or empty; rows from
    /// earlier runs are never truncated.
    pub fn flush(&self, path: &Path) -> Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_empty = file.metadata()?.len() == 0;

        let mut writer = csv::Writer::from_writer(file);
        if is_empty {
            writer.write_record(CSV_HEADER)?;
        }
        for record in &self.records {
            let role_summary = record.role_summary();
            writer.write_record([
                record.timestamp.as_str(),
                record.source_project.name.as_str(),
                record.source_project.id.as_str(),
                record.destination_project.name.as_str(),
                record.destination_project.id.as_str(),
                record.username.as_str(),
                record.auth_database.as_str(),
                record.password.as_str(),
                role_summary.as_str(),
            ])?;
        }
        writer.flush()?;

        info!("Saved {} generated credential(s) to {}", self.records.len(), path.display());
        Ok(())
    }
}
