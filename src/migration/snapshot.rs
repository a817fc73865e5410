//! The intermediate JSON file handed from export to import.

use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Write a snapshot as a pretty-printed JSON array so it diffs cleanly
pub fn write_snapshot<T: Serialize>(path: &Path, elements: &[T]) -> Result<()> {
    let content = serde_json::to_string_pretty(elements)?;
    fs::write(path, content)?;
    info!("Wrote snapshot with {} project(s) to {}", elements.len(), path.display());
    Ok(())
}

pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)?;
    let elements: Vec<T> = serde_json::from_str(&content)?;
    debug!("Read snapshot with {} project(s) from {}", elements.len(), path.display());
    Ok(elements)
}
