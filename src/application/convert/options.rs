//! Convert Options
//!
//! Configuration types for convert operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::entities::SourceComponent;
use crate::domain::services::ReplacementSet;
use crate::domain::value_objects::TargetFormat;

/// Where converted files go
#[derive(Debug, Clone)]
pub enum OutputConfig {
    /// A fresh directory, optionally nested under a package name
    Directory {
        output_directory: PathBuf,
        package_name: Option<String>,
    },
    /// Into an existing project, next to the components it already has
    Merge {
        /// Local components incoming ones are matched against
        merge_with: Vec<SourceComponent>,
        /// Package directory new files go to
        default_directory: PathBuf,
        /// Root scanned for parent documents nothing claimed
        project_root: Option<PathBuf>,
    },
}

impl OutputConfig {
    pub fn directory(output_directory: impl Into<PathBuf>) -> Self {
        Self::Directory {
            output_directory: output_directory.into(),
            package_name: None,
        }
    }

    pub fn is_merge(&self) -> bool {
        matches!(self, Self::Merge { .. })
    }

    /// Root relative write instructions resolve against
    pub fn writer_root(&self) -> PathBuf {
        match self {
            Self::Directory {
                output_directory,
                package_name: Some(package),
            } => output_directory.join(package),
            Self::Directory {
                output_directory, ..
            } => output_directory.clone(),
            // Merge outputs are either existing paths or already carry the default directory
            Self::Merge { .. } => PathBuf::new(),
        }
    }

    pub fn default_directory(&self) -> Option<&Path> {
        match self {
            Self::Merge {
                default_directory, ..
            } => Some(default_directory),
            Self::Directory { .. } => None,
        }
    }

    pub fn project_root(&self) -> Option<&Path> {
        match self {
            Self::Merge { project_root, .. } => project_root.as_deref(),
            Self::Directory { .. } => None,
        }
    }
}

/// Options for the convert use case
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub format: TargetFormat,
    pub output: OutputConfig,
    /// Plan only, don't touch the disk
    pub dry_run: bool,
    /// Leave files alone when their content would not change
    pub skip_unchanged: bool,
    /// Applied to source files when converting to the metadata format
    pub replacements: Option<Arc<ReplacementSet>>,
}

impl ConvertOptions {
    pub fn new(format: TargetFormat, output: OutputConfig) -> Self {
        Self {
            format,
            output,
            dry_run: false,
            skip_unchanged: true,
            replacements: None,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_skip_unchanged(mut self, skip_unchanged: bool) -> Self {
        self.skip_unchanged = skip_unchanged;
        self
    }

    pub fn with_replacements(mut self, replacements: Option<Arc<ReplacementSet>>) -> Self {
        self.replacements = replacements;
        self
    }
}
