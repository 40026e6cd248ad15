//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::services::DEFAULT_CHUNK_SIZE;
use crate::domain::value_objects::ReplacementRule;
use crate::error::MetaformResult;

use super::loader::{self, ConfigWarning};

/// File name looked up at the project root
pub const CONFIG_FILE_NAME: &str = "metaform.toml";

/// Package directory used when the project does not name one
pub const DEFAULT_PACKAGE_DIRECTORY: &str = "force-app";

/// Project layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directories holding source-format components, relative to the project root
    #[serde(default = "default_package_directories")]
    pub package_directories: Vec<PathBuf>,

    /// Where new files go when converting into the project
    #[serde(default)]
    pub default_directory: Option<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            package_directories: default_package_directories(),
            default_directory: None,
        }
    }
}

fn default_package_directories() -> Vec<PathBuf> {
    vec![PathBuf::from(DEFAULT_PACKAGE_DIRECTORY)]
}

/// Registry customization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Built-in presets applied over the registry, in order
    #[serde(default)]
    pub presets: Vec<String>,

    /// JSON overlay adding or replacing types
    #[serde(default)]
    pub custom_registry: Option<PathBuf>,
}

/// Conversion tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Read size for streaming replacements
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Leave files alone when their content would not change
    #[serde(default = "default_true")]
    pub skip_unchanged: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            skip_unchanged: true,
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_true() -> bool {
    true
}

/// `metaform.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub convert: ConvertConfig,

    #[serde(default)]
    pub replacements: Vec<ReplacementRule>,
}

impl Config {
    /// Load from a file, ignoring unknown-key warnings
    pub fn load(path: &Path) -> MetaformResult<Self> {
        loader::load_with_warnings(path).map(|(config, _)| config)
    }

    pub fn load_with_warnings(path: &Path) -> MetaformResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Package directory new files go to, relative to the project root
    pub fn default_package_directory(&self) -> PathBuf {
        self.project
            .default_directory
            .clone()
            .or_else(|| self.project.package_directories.first().cloned())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PACKAGE_DIRECTORY))
    }
}
