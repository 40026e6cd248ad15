//! ComponentWriter port
//!
//! Realizes conversion results on some destination.

use std::path::PathBuf;

use crate::domain::entities::ConversionResult;
use crate::error::MetaformResult;

/// Outcome of writing a batch of conversion results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Files that were written
    pub written: Vec<PathBuf>,
    /// Files that were removed
    pub deleted: Vec<PathBuf>,
    /// Files left alone because their content did not change
    pub skipped: Vec<PathBuf>,
}

impl WriteReport {
    /// Whether anything on disk changed
    pub fn has_changes(&self) -> bool {
        !self.written.is_empty() || !self.deleted.is_empty()
    }
}

pub trait ComponentWriter: Send + Sync {
    fn write(&self, results: &[ConversionResult]) -> MetaformResult<WriteReport>;
}
