//! Non-decomposition: child entries routed to the parent file that owns them
//!
//! Entries whose name already exists in a merge target are "claimed" by that
//! file. The rest are "unclaimed" until finalization decides where they go:
//! to another parent file in the project that already owns the name, or else
//! to the default parent file.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::FinalizeOptions;
use crate::domain::entities::{ConversionResult, MetadataType, SourceComponent, WriteInstruction};
use crate::domain::ports::walk_files;
use crate::domain::services::paths::{with_default_directory, xml_destination};
use crate::domain::value_objects::TargetFormat;
use crate::error::{MetaformError, MetaformResult};
use crate::xml::{parse_xml, push_value, with_namespace, XmlObject, XmlValue};

/// Directory never scanned for parent files
const EXCLUDED_DIRECTORY: &str = "node_modules";

/// One named entry of a non-decomposed parent document
#[derive(Debug, Clone, PartialEq)]
pub struct ChildEntry {
    pub name: String,
    /// Element the entry sits under in the parent document
    pub group: String,
    pub body: XmlObject,
}

/// Every named child entry of a parent document.
pub fn child_entries(
    ty: &MetadataType,
    doc: &XmlObject,
    path: &Path,
) -> MetaformResult<Vec<ChildEntry>> {
    let Some(body) = doc.get(&ty.name).and_then(XmlValue::as_object) else {
        return Ok(Vec::new());
    };
    let mut entries = Vec::new();
    for child_type in ty.child_types() {
        let (Some(id_element), Some(group)) = (
            child_type.unique_id_element.as_deref(),
            child_type.xml_element_name.as_deref(),
        ) else {
            continue;
        };
        let Some(values) = body.get(group) else {
            continue;
        };
        for value in values.as_list() {
            let entry = value.clone().into_object();
            let name = entry
                .get(id_element)
                .and_then(XmlValue::as_text)
                .ok_or_else(|| MetaformError::MissingUniqueId {
                    path: path.to_path_buf(),
                    type_name: child_type.name.clone(),
                    element: id_element.to_string(),
                })?
                .to_string();
            entries.push(ChildEntry {
                name,
                group: group.to_string(),
                body: entry,
            });
        }
    }
    Ok(entries)
}

#[derive(Debug, Clone)]
struct ChildGroup {
    parent: SourceComponent,
    children: IndexMap<String, ChildEntry>,
}

impl ChildGroup {
    fn new(parent: &SourceComponent) -> Self {
        Self {
            parent: parent.clone(),
            children: IndexMap::new(),
        }
    }

    fn document(&self) -> XmlObject {
        let mut body = XmlObject::new();
        for entry in self.children.values() {
            push_value(&mut body, &entry.group, XmlValue::Object(entry.body.clone()));
        }
        with_namespace(&self.parent.ty.name, body)
    }
}

#[derive(Debug, Default)]
pub struct NonDecompositionState {
    claimed: IndexMap<PathBuf, ChildGroup>,
    unclaimed: IndexMap<PathBuf, ChildGroup>,
    example: Option<SourceComponent>,
}

impl NonDecompositionState {
    pub fn is_claimed(&self, path: &Path) -> bool {
        self.claimed.contains_key(path)
    }

    /// Start tracking a merge target with the entries it already holds.
    /// Does nothing if the path is already tracked.
    pub fn seed_claimed(&mut self, path: &Path, parent: &SourceComponent, existing: Vec<ChildEntry>) {
        self.claimed.entry(path.to_path_buf()).or_insert_with(|| {
            let mut group = ChildGroup::new(parent);
            for entry in existing {
                group.children.insert(entry.name.clone(), entry);
            }
            group
        });
    }

    pub fn add_claimed(&mut self, path: &Path, parent: &SourceComponent, entry: ChildEntry) {
        self.claimed
            .entry(path.to_path_buf())
            .or_insert_with(|| ChildGroup::new(parent))
            .children
            .insert(entry.name.clone(), entry);
    }

    pub fn add_unclaimed(&mut self, path: &Path, parent: &SourceComponent, entry: ChildEntry) {
        self.unclaimed
            .entry(path.to_path_buf())
            .or_insert_with(|| ChildGroup::new(parent))
            .children
            .insert(entry.name.clone(), entry);
    }

    /// Remember a parent of the type being converted, used to discover
    /// other parent files at finalization.
    pub fn set_example(&mut self, component: &SourceComponent) {
        if self.example.is_none() {
            self.example = Some(component.clone());
        }
    }

    pub fn claimed_names(&self, path: &Path) -> Vec<String> {
        self.claimed
            .get(path)
            .map(|g| g.children.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub(super) fn finalize(
        mut self,
        options: FinalizeOptions<'_>,
    ) -> MetaformResult<Vec<ConversionResult>> {
        if self.claimed.is_empty() {
            return self.finalize_unclaimed(options.default_directory);
        }

        let mut unprocessed = self.discover_parents(options)?;
        let default_path = self.default_parent_path(options.default_directory);

        let unclaimed = std::mem::take(&mut self.unclaimed);
        for group in unclaimed.into_values() {
            for (name, entry) in group.children {
                if let Some(owner) = self.claimed.values_mut().find(|g| g.children.contains_key(&name)) {
                    owner.children.insert(name, entry);
                    continue;
                }
                let owner_path = unprocessed
                    .iter()
                    .find(|(_, g)| g.children.contains_key(&name))
                    .map(|(path, _)| path.clone());
                match owner_path {
                    Some(path) => {
                        debug!(path = %path.display(), name = %name, "entry owned by an unprocessed parent");
                        if let Some(mut owner) = unprocessed.shift_remove(&path) {
                            owner.children.insert(name, entry);
                            self.claimed.insert(path, owner);
                        }
                    }
                    None => {
                        if let Some(group) = default_path
                            .as_ref()
                            .and_then(|p| self.claimed.get_mut(p))
                        {
                            group.children.insert(name, entry);
                        }
                    }
                }
            }
        }

        Ok(self
            .claimed
            .into_iter()
            .map(|(path, group)| {
                let write = WriteInstruction::xml(path, group.document());
                ConversionResult::new(group.parent, vec![write])
            })
            .collect())
    }

    fn finalize_unclaimed(
        self,
        default_directory: Option<&Path>,
    ) -> MetaformResult<Vec<ConversionResult>> {
        // Same-named parents from different directories share one destination
        let mut by_output: IndexMap<PathBuf, ChildGroup> = IndexMap::new();
        for group in self.unclaimed.into_values() {
            let Some(relative) = xml_destination(&group.parent, TargetFormat::Source, None) else {
                continue;
            };
            let output = with_default_directory(default_directory, relative);
            match by_output.get_mut(&output) {
                Some(merged) => merged.children.extend(group.children),
                None => {
                    by_output.insert(output, group);
                }
            }
        }
        Ok(by_output
            .into_iter()
            .map(|(output, group)| {
                let write = WriteInstruction::xml(output, group.document());
                ConversionResult::new(group.parent, vec![write])
            })
            .collect())
    }

    /// First claimed file under the default directory, else the first claimed file
    fn default_parent_path(&self, default_directory: Option<&Path>) -> Option<PathBuf> {
        default_directory
            .and_then(|dir| self.claimed.keys().find(|p| p.starts_with(dir)))
            .or_else(|| self.claimed.keys().next())
            .cloned()
    }

    /// Parent files of the same type in the project that nobody claimed
    fn discover_parents(
        &self,
        options: FinalizeOptions<'_>,
    ) -> MetaformResult<IndexMap<PathBuf, ChildGroup>> {
        let mut found = IndexMap::new();
        let (Some(root), Some(example)) = (
            options.project_root,
            self.example
                .as_ref()
                .or_else(|| self.claimed.values().next().map(|g| &g.parent)),
        ) else {
            return Ok(found);
        };
        let Some(meta_suffix) = example.ty.meta_suffix() else {
            return Ok(found);
        };

        let claimed_dirs: Vec<&Path> = self.claimed.keys().filter_map(|p| p.parent()).collect();
        let keep_dir = |dir: &Path| {
            let name = dir.file_name().and_then(|n| n.to_str()).unwrap_or("");
            !name.starts_with('.')
                && name != EXCLUDED_DIRECTORY
                && !claimed_dirs.iter().any(|claimed| *claimed == dir)
        };
        let tree = options.project_tree;
        for path in walk_files(tree.as_ref(), root, &keep_dir)? {
            let is_parent_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&format!(".{}", meta_suffix)));
            if !is_parent_file || self.claimed.contains_key(&path) {
                continue;
            }
            let bytes = tree.read_file(&path)?;
            let doc = parse_xml(&bytes).map_err(|e| MetaformError::XmlParse {
                path: path.clone(),
                message: e.to_string(),
            })?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(&format!(".{}", meta_suffix)))
                .unwrap_or_default()
                .to_string();
            let parent = SourceComponent::new(name, Arc::clone(&example.ty), Arc::clone(tree))
                .with_xml(&path);
            let mut group = ChildGroup::new(&parent);
            for entry in child_entries(&example.ty, &doc, &path)? {
                group.children.insert(entry.name.clone(), entry);
            }
            found.insert(path, group);
        }
        Ok(found)
    }
}
