//! JSON registry loader

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::entities::{Registry, RegistryData};
use crate::error::{MetaformError, MetaformResult, RegistryError};

const BUILTIN_REGISTRY: &str = include_str!("data/registry.json");

const PRESETS: &[(&str, &str)] = &[
    (
        "decomposeCustomLabels",
        include_str!("data/presets/decomposeCustomLabels.json"),
    ),
    (
        "decomposePermissionSet",
        include_str!("data/presets/decomposePermissionSet.json"),
    ),
    (
        "decomposeExternalServiceRegistration",
        include_str!("data/presets/decomposeExternalServiceRegistration.json"),
    ),
];

/// Names of the built-in presets
pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|(name, _)| *name)
}

/// Parse registry JSON, naming `source_name` in errors
pub fn parse_registry_data(source_name: &str, json: &str) -> Result<RegistryData, RegistryError> {
    serde_json::from_str(json).map_err(|e| RegistryError::InvalidData {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

/// The built-in registry without presets
pub fn default_registry() -> Result<Registry, RegistryError> {
    RegistryLoader::new().build()
}

/// Assembles a registry from the built-in data, presets and an optional overlay
#[derive(Debug, Clone, Default)]
pub struct RegistryLoader {
    presets: Vec<String>,
    custom: Option<PathBuf>,
}

impl RegistryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presets<I, S>(mut self, presets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.presets.extend(presets.into_iter().map(Into::into));
        self
    }

    pub fn with_custom_registry(mut self, path: impl Into<PathBuf>) -> Self {
        self.custom = Some(path.into());
        self
    }

    /// Build from compiled-in data only (no overlay file)
    pub fn build(&self) -> Result<Registry, RegistryError> {
        let data = self.builtin_with_presets()?;
        Registry::new(data)
    }

    /// Build including the overlay file, if configured
    pub fn load(&self) -> MetaformResult<Registry> {
        let mut data = self.builtin_with_presets()?;
        if let Some(path) = &self.custom {
            data.overlay(read_overlay(path)?);
        }
        Ok(Registry::new(data)?)
    }

    fn builtin_with_presets(&self) -> Result<RegistryData, RegistryError> {
        let mut data = parse_registry_data("built-in registry", BUILTIN_REGISTRY)?;
        for name in &self.presets {
            let (preset, json) = PRESETS
                .iter()
                .find(|(preset, _)| preset.eq_ignore_ascii_case(name))
                .ok_or_else(|| RegistryError::UnknownPreset(name.clone()))?;
            debug!(preset = %preset, "applying registry preset");
            data.overlay(parse_registry_data(preset, json)?);
        }
        Ok(data)
    }
}

fn read_overlay(path: &Path) -> MetaformResult<RegistryData> {
    let content = fs::read_to_string(path).map_err(|e| MetaformError::Config {
        file: path.to_path_buf(),
        message: format!("cannot read custom registry: {}", e),
    })?;
    Ok(parse_registry_data(&path.display().to_string(), &content)?)
}
