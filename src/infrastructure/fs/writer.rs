//! Standard writer - realizes write instructions on disk
//!
//! Relative outputs are placed under the writer's root, absolute outputs
//! (merge targets) are used as they are. Every write goes through a
//! temporary file in the destination directory and is renamed into place.

use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::entities::{ConversionResult, WriteInstruction};
use crate::domain::ports::{ComponentWriter, FsError, WriteReport};
use crate::error::MetaformResult;

#[derive(Debug, Clone)]
pub struct StandardWriter {
    root: PathBuf,
    skip_unchanged: bool,
}

impl StandardWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            skip_unchanged: true,
        }
    }

    /// Rewrite files even when their content is unchanged
    pub fn with_skip_unchanged(mut self, skip_unchanged: bool) -> Self {
        self.skip_unchanged = skip_unchanged;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, output: &Path) -> PathBuf {
        if output.is_absolute() {
            output.to_path_buf()
        } else {
            self.root.join(output)
        }
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> MetaformResult<bool> {
        if self.skip_unchanged && path.is_file() {
            let existing = std::fs::read(path).map_err(|e| FsError::io(path, e))?;
            if hash_content(&existing) == hash_content(content) {
                return Ok(false);
            }
        }
        let parent = path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| FsError::io(parent, e))?;

        let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|e| FsError::io(parent, e))?;
        temp.write_all(content).map_err(|e| FsError::io(path, e))?;
        temp.persist(path).map_err(|e| FsError::io(path, e.error))?;
        Ok(true)
    }
}

/// SHA-256 of some content, `sha256:`-prefixed
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{:x}", hasher.finalize())
}

impl ComponentWriter for StandardWriter {
    fn write(&self, results: &[ConversionResult]) -> MetaformResult<WriteReport> {
        let mut report = WriteReport::default();
        for result in results {
            for instruction in &result.writes {
                let path = self.resolve(instruction.output());
                match instruction {
                    WriteInstruction::Delete { full_name, .. } => {
                        if path.is_file() {
                            std::fs::remove_file(&path).map_err(|e| FsError::io(&path, e))?;
                            debug!(path = %path.display(), component = %full_name, "deleted");
                            report.deleted.push(path);
                        }
                    }
                    WriteInstruction::Write { source, .. } => {
                        let content = source.read()?;
                        if self.write_file(&path, &content)? {
                            report.written.push(path);
                        } else {
                            report.skipped.push(path);
                        }
                    }
                }
            }
        }
        Ok(report)
    }
}
