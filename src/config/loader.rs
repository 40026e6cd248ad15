//! Configuration loading and environment overrides

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{MetaformError, MetaformResult};

use super::types::{Config, CONFIG_FILE_NAME};

pub const ENV_DEFAULT_DIRECTORY: &str = "METAFORM_DEFAULT_DIRECTORY";
pub const ENV_PRESETS: &str = "METAFORM_PRESETS";
pub const ENV_CHUNK_SIZE: &str = "METAFORM_CHUNK_SIZE";

/// Keys the config understands, for typo suggestions
const KNOWN_KEYS: &[&str] = &[
    "project",
    "package_directories",
    "default_directory",
    "registry",
    "presets",
    "custom_registry",
    "convert",
    "chunk_size",
    "skip_unchanged",
    "replacements",
];

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> MetaformResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| MetaformError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_with_warnings(&content, path)
}

/// Parse TOML content; `path` is only used in messages.
pub fn parse_with_warnings(content: &str, path: &Path) -> MetaformResult<(Config, Vec<ConfigWarning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| MetaformError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(content, &key),
                suggestion: suggest_key(&key),
                key,
                file: path.to_path_buf(),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load the explicit config file, else `<project>/metaform.toml`, else defaults.
///
/// An explicit path that cannot be read is an error; a missing project file
/// is not. Environment overrides are applied last.
pub fn load_or_default(
    explicit: Option<&Path>,
    project_root: &Path,
) -> MetaformResult<(Config, Vec<ConfigWarning>)> {
    let (config, warnings) = match explicit {
        Some(path) => load_with_warnings(path)?,
        None => {
            let project_config = project_root.join(CONFIG_FILE_NAME);
            if project_config.is_file() {
                load_with_warnings(&project_config)?
            } else {
                debug!(root = %project_root.display(), "no project config, using defaults");
                (Config::default(), Vec::new())
            }
        }
    };
    Ok((with_env_overrides(config)?, warnings))
}

/// Apply `METAFORM_*` environment overrides
pub fn with_env_overrides(config: Config) -> MetaformResult<Config> {
    apply_env_overrides(config, |name| std::env::var(name).ok())
}

/// Apply overrides read through `lookup`
pub fn apply_env_overrides(
    mut config: Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> MetaformResult<Config> {
    // METAFORM_DEFAULT_DIRECTORY
    if let Some(dir) = lookup(ENV_DEFAULT_DIRECTORY).filter(|d| !d.trim().is_empty()) {
        config.project.default_directory = Some(PathBuf::from(dir.trim()));
    }

    // METAFORM_PRESETS (comma-separated)
    if let Some(presets) = lookup(ENV_PRESETS) {
        let parsed: Vec<String> = presets
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if !parsed.is_empty() {
            config.registry.presets = parsed;
        }
    }

    // METAFORM_CHUNK_SIZE
    if let Some(size) = lookup(ENV_CHUNK_SIZE) {
        config.convert.chunk_size = size
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| MetaformError::Config {
                file: PathBuf::from(ENV_CHUNK_SIZE),
                message: format!("expected a positive integer, got '{}'", size),
            })?;
    }

    Ok(config)
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    KNOWN_KEYS
        .iter()
        .map(|candidate| (*candidate, strsim::levenshtein(unknown, candidate)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist <= 2)
        .map(|(candidate, _)| candidate.to_string())
}
