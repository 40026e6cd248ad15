//! Registry entity - read-only index over every known metadata type
//!
//! Built once from [`RegistryData`] and validated on construction. All
//! lookups hand out shared `Arc<MetadataType>` handles.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::metadata_type::{MetadataType, TransformerStrategy};
use crate::domain::services::closest_matches;
use crate::error::RegistryError;

/// Raw registry content as stored in JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryData {
    pub types: IndexMap<String, Arc<MetadataType>>,
}

impl RegistryData {
    /// Add or replace types by id
    pub fn overlay(&mut self, other: RegistryData) {
        for (id, ty) in other.types {
            self.types.insert(id.to_lowercase(), ty);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    types: IndexMap<String, Arc<MetadataType>>,
    suffixes: HashMap<String, String>,
    legacy_suffixes: HashMap<String, String>,
    directories: HashMap<String, String>,
    strict_directories: HashMap<String, String>,
    child_parents: HashMap<String, String>,
}

impl Registry {
    pub fn new(data: RegistryData) -> Result<Self, RegistryError> {
        let mut registry = Self {
            types: IndexMap::new(),
            suffixes: HashMap::new(),
            legacy_suffixes: HashMap::new(),
            directories: HashMap::new(),
            strict_directories: HashMap::new(),
            child_parents: HashMap::new(),
        };

        for (key, ty) in data.types {
            let id = key.to_lowercase();
            if let Some(suffix) = &ty.suffix {
                registry.suffixes.entry(suffix.clone()).or_insert(id.clone());
            }
            if let Some(legacy) = &ty.legacy_suffix {
                registry.legacy_suffixes.insert(legacy.clone(), id.clone());
            }
            if ty.alias_for.is_none() {
                registry
                    .directories
                    .entry(ty.directory_name.clone())
                    .or_insert(id.clone());
            }
            if ty.strict_directory_name {
                registry
                    .strict_directories
                    .insert(ty.directory_name.clone(), id.clone());
            }
            registry.types.insert(id, ty);
        }

        registry.index_children()?;
        Ok(registry)
    }

    fn index_children(&mut self) -> Result<(), RegistryError> {
        let mut owners: HashMap<String, Vec<String>> = HashMap::new();
        for (parent_id, parent) in &self.types {
            for child in parent.child_types() {
                owners
                    .entry(child.id.clone())
                    .or_default()
                    .push(parent_id.clone());
                validate_child(parent, child)?;
            }
        }

        let mut sorted: Vec<_> = owners.into_iter().collect();
        sorted.sort();
        for (child_id, parents) in sorted {
            if parents.len() > 1 || self.types.contains_key(&child_id) {
                return Err(RegistryError::DuplicateChild {
                    child: child_id,
                    parents: parents.join(", "),
                });
            }
            self.child_parents.insert(child_id, parents[0].clone());
        }
        Ok(())
    }

    /// Lookup by id, covering both top-level and child types
    pub fn type_by_id(&self, id: &str) -> Result<Arc<MetadataType>, RegistryError> {
        let id = id.to_lowercase();
        if let Some(ty) = self.types.get(&id) {
            return Ok(Arc::clone(ty));
        }
        self.child_parents
            .get(&id)
            .and_then(|parent| self.types.get(parent))
            .and_then(|parent| parent.child_type(&id))
            .map(Arc::clone)
            .ok_or_else(|| self.not_found(&id))
    }

    /// Lookup by name, ignoring case and spaces, following aliases
    pub fn type_by_name(&self, name: &str) -> Result<Arc<MetadataType>, RegistryError> {
        let normalized: String = name.to_lowercase().split_whitespace().collect();
        let ty = self
            .type_by_id(&normalized)
            .map_err(|_| self.not_found(name))?;
        match &ty.alias_for {
            Some(target) => self.type_by_id(target),
            None => Ok(ty),
        }
    }

    /// Top-level type owning a suffix
    pub fn type_by_suffix(&self, suffix: &str) -> Option<Arc<MetadataType>> {
        self.suffixes
            .get(suffix)
            .and_then(|id| self.types.get(id))
            .map(Arc::clone)
    }

    /// Top-level type whose deprecated suffix matches
    pub fn type_by_legacy_suffix(&self, suffix: &str) -> Option<Arc<MetadataType>> {
        self.legacy_suffixes
            .get(suffix)
            .and_then(|id| self.types.get(id))
            .map(Arc::clone)
    }

    /// Top-level type stored under a directory name
    pub fn type_by_directory(&self, directory: &str) -> Option<Arc<MetadataType>> {
        self.directories
            .get(directory)
            .and_then(|id| self.types.get(id))
            .map(Arc::clone)
    }

    /// Type whose components must live in a directory of exactly this name
    pub fn strict_directory_type(&self, directory: &str) -> Option<Arc<MetadataType>> {
        self.strict_directories
            .get(directory)
            .and_then(|id| self.types.get(id))
            .map(Arc::clone)
    }

    /// Parent of a child type id
    pub fn parent_of_child(&self, child_id: &str) -> Option<Arc<MetadataType>> {
        self.child_parents
            .get(&child_id.to_lowercase())
            .and_then(|id| self.types.get(id))
            .map(Arc::clone)
    }

    /// Top-level types in registry order
    pub fn types(&self) -> impl Iterator<Item = &Arc<MetadataType>> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn not_found(&self, name: &str) -> RegistryError {
        let child_names = self
            .types
            .values()
            .flat_map(|t| t.child_types().map(|c| c.name.as_str()));
        let candidates = self.types.values().map(|t| t.name.as_str()).chain(child_names);
        RegistryError::TypeNotFound {
            name: name.to_string(),
            suggestions: closest_matches(name, candidates),
        }
    }
}

fn validate_child(parent: &MetadataType, child: &MetadataType) -> Result<(), RegistryError> {
    let missing = |field: &'static str| RegistryError::IncompleteChild {
        parent: parent.name.clone(),
        child: child.name.clone(),
        field,
    };
    if parent.is_decomposed() && child.suffix.is_none() {
        return Err(missing("suffix"));
    }
    let splits_by_id = match parent.transformer() {
        TransformerStrategy::NonDecomposed => true,
        TransformerStrategy::Decomposed | TransformerStrategy::DecomposedLabels => {
            child.xml_element_name.is_some()
        }
        _ => false,
    };
    if splits_by_id && child.unique_id_element.is_none() {
        return Err(missing("uniqueIdElement"));
    }
    if child.unique_id_element.is_some() && child.xml_element_name.is_none() {
        return Err(missing("xmlElementName"));
    }
    Ok(())
}
