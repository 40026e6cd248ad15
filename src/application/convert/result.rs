//! Convert Result

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::entities::ConversionResult;

/// One planned write or deletion, as reported by a dry run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedWrite {
    pub component: String,
    pub type_name: String,
    pub output: PathBuf,
    pub delete: bool,
}

/// Result of a convert operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConvertResult {
    /// Files that were written
    pub written: Vec<PathBuf>,
    /// Files that were removed
    pub deleted: Vec<PathBuf>,
    /// Files left alone because their content did not change
    pub skipped: Vec<PathBuf>,
    /// Everything the conversion planned, in order
    pub planned: Vec<PlannedWrite>,
    /// Single-file replacements that never matched
    pub unmatched_replacements: Vec<String>,
}

impl ConvertResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn from_plan(results: &[ConversionResult]) -> Self {
        let planned = results
            .iter()
            .flat_map(|result| {
                result.writes.iter().map(move |write| PlannedWrite {
                    component: result.component.full_name(),
                    type_name: result.component.type_name().to_string(),
                    output: write.output().to_path_buf(),
                    delete: write.is_delete(),
                })
            })
            .collect();
        Self {
            planned,
            ..Self::default()
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.written.is_empty() || !self.deleted.is_empty()
    }
}
