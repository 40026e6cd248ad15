//! Configuration module for metaform
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (METAFORM_*)
//! 3. Project config (`metaform.toml` or an explicit `--config` path)
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{
    apply_env_overrides, load_or_default, load_with_warnings, parse_with_warnings,
    with_env_overrides, ConfigWarning, ENV_CHUNK_SIZE, ENV_DEFAULT_DIRECTORY, ENV_PRESETS,
};
pub use types::{
    Config, ConvertConfig, ProjectConfig, RegistryConfig, CONFIG_FILE_NAME,
    DEFAULT_PACKAGE_DIRECTORY,
};
