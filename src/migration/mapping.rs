//! Source project to destination project mapping, resolved before import.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum MappingTarget {
    Project(String),
    Skip,
}

/// Which destination project each source project is imported into.
///
/// Source projects with no entry are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMapping {
    targets: HashMap<String, MappingTarget>,
}

impl ProjectMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every source project onto the destination project with the same id
    pub fn same_ids<'a>(source_ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut mapping = Self::new();
        for id in source_ids {
            mapping.map(id, id);
        }
        mapping
    }

    pub fn map(&mut self, source_id: impl Into<String>, destination_id: impl Into<String>) -> &mut Self {
        self.targets
            .insert(source_id.into(), MappingTarget::Project(destination_id.into()));
        self
    }

    pub fn skip(&mut self, source_id: impl Into<String>) -> &mut Self {
        self.targets.insert(source_id.into(), MappingTarget::Skip);
        self
    }

    pub fn contains(&self, source_id: &str) -> bool {
        self.targets.contains_key(source_id)
    }

    /// Destination id for `source_id`, `None` when skipped or unmapped
    pub fn resolve(&self, source_id: &str) -> Option<&str> {
        match self.targets.get(source_id) {
            Some(MappingTarget::Project(id)) => Some(id.as_str()),
            _ => None,
        }
    }
}
