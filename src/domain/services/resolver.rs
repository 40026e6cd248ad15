//! Metadata resolver
//!
//! Maps paths of a file tree to source components. Works on both formats: a
//! project in source format and a tree of composed documents.

use indexmap::IndexMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::entities::{
    MetadataType, Registry, SourceAdapterKind, SourceComponent, META_XML_SUFFIX,
};
use crate::domain::ports::{FileTree, FsError};
use crate::domain::services::closest_matches;
use crate::domain::value_objects::{ComponentKey, ForceIgnore};
use crate::error::{MetaformError, MetaformResult};

#[derive(Debug, Clone)]
pub struct MetadataResolver {
    registry: Arc<Registry>,
    tree: Arc<dyn FileTree>,
    force_ignore: Arc<ForceIgnore>,
}

impl MetadataResolver {
    pub fn new(registry: Arc<Registry>, tree: Arc<dyn FileTree>) -> Self {
        Self {
            registry,
            tree,
            force_ignore: Arc::new(ForceIgnore::default()),
        }
    }

    pub fn with_force_ignore(mut self, force_ignore: Arc<ForceIgnore>) -> Self {
        self.force_ignore = force_ignore;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn tree(&self) -> &Arc<dyn FileTree> {
        &self.tree
    }

    /// Every component found at `path`.
    ///
    /// A directory is walked recursively. A single file resolves to the
    /// component it belongs to; a decomposed child file given on its own
    /// resolves to just that child.
    pub fn components_from_path(&self, path: &Path) -> MetaformResult<Vec<SourceComponent>> {
        if !self.tree.exists(path) {
            return Err(FsError::NotFound(path.to_path_buf()).into());
        }
        let mut found = IndexMap::new();
        if self.tree.is_directory(path) && !self.directory_is_component(path) {
            self.collect(path, &mut found)?;
        } else if let Some(component) = self.resolve_component(path, true)? {
            found.insert(component.key(), component);
        }
        debug!(path = %path.display(), count = found.len(), "resolved components");
        Ok(found.into_values().collect())
    }

    fn collect(
        &self,
        dir: &Path,
        found: &mut IndexMap<ComponentKey, SourceComponent>,
    ) -> MetaformResult<()> {
        for name in self.tree.read_directory(dir)? {
            let path = dir.join(&name);
            if self.force_ignore.denies(&path) {
                continue;
            }
            if self.tree.is_directory(&path) && !self.directory_is_component(&path) {
                self.collect(&path, found)?;
                continue;
            }
            if let Some(component) = self.resolve_component(&path, false)? {
                found.entry(component.key()).or_insert(component);
            }
        }
        Ok(())
    }

    /// Directories that are themselves one component: bundles, decomposed
    /// parents and expanded mixed content.
    fn directory_is_component(&self, dir: &Path) -> bool {
        let Some(ty) = parent_name(dir).and_then(|d| self.registry.type_by_directory(d)) else {
            return false;
        };
        match ty.adapter() {
            SourceAdapterKind::Bundle | SourceAdapterKind::Decomposed => true,
            SourceAdapterKind::MixedContent => !ty.in_folder,
            _ => false,
        }
    }

    fn resolve_component(
        &self,
        path: &Path,
        requested: bool,
    ) -> MetaformResult<Option<SourceComponent>> {
        let Some(ty) = self.resolve_type(path)? else {
            debug!(path = %path.display(), "no metadata type for file, skipping");
            return Ok(None);
        };
        let component = match ty.adapter() {
            SourceAdapterKind::Default => self.default_component(path, &ty),
            SourceAdapterKind::MatchingContentFile => self.matching_content_component(path, &ty)?,
            SourceAdapterKind::MixedContent => self.mixed_content_component(path, &ty)?,
            SourceAdapterKind::Bundle => self.bundle_component(path, &ty)?,
            SourceAdapterKind::Decomposed => self.decomposed_component(path, &ty, requested),
            SourceAdapterKind::DecomposedLabels => self.labels_component(path, &ty, requested),
        };
        Ok(component.filter(|c| {
            c.xml
                .as_deref()
                .map_or(true, |xml| self.force_ignore.accepts(xml))
        }))
    }

    fn component(&self, name: impl Into<String>, ty: &Arc<MetadataType>) -> SourceComponent {
        SourceComponent::new(name, Arc::clone(ty), Arc::clone(&self.tree))
            .with_force_ignore(Arc::clone(&self.force_ignore))
    }

    // Type inference

    fn resolve_type(&self, path: &Path) -> MetaformResult<Option<Arc<MetadataType>>> {
        if self.tree.is_directory(path) {
            return Ok(parent_name(path).and_then(|d| self.registry.type_by_directory(d)));
        }
        let Some(file_name) = file_name(path) else {
            return Ok(None);
        };

        if let Some(parent) = self.strict_parent_type(path, file_name)? {
            return Ok(Some(parent));
        }

        if let Some(stem) = file_name.strip_suffix(META_XML_SUFFIX) {
            return self.meta_file_type(path, stem).map(Some);
        }

        if let Some(ty) = self.expanded_content_type(path) {
            return Ok(Some(ty));
        }

        if let Some((_, extension)) = file_name.rsplit_once('.') {
            if let Some(ty) = self.type_for_suffix(path, extension) {
                return Ok(Some(ty));
            }
            if let Some(ty) = self.registry.type_by_legacy_suffix(extension) {
                warn!(path = %path.display(), "'{}' is a deprecated suffix of {}", extension, ty.name);
                return Ok(Some(ty));
            }
        }

        Ok(self
            .enclosing_type(path)
            .filter(|ty| {
                ty.suffix.is_none()
                    || matches!(
                        ty.adapter(),
                        SourceAdapterKind::MixedContent | SourceAdapterKind::Bundle
                    )
            }))
    }

    /// A file below `<dir>/<Parent>/` of a strict-directory decomposed type
    /// must be the parent's own document or one of its children.
    fn strict_parent_type(
        &self,
        path: &Path,
        file_name: &str,
    ) -> MetaformResult<Option<Arc<MetadataType>>> {
        let parts = normal_parts(path);
        let strict = parts.iter().enumerate().find_map(|(i, part)| {
            let ty = self.registry.strict_directory_type(part)?;
            (ty.adapter() == SourceAdapterKind::Decomposed && parts.len() > i + 2).then_some(ty)
        });
        let Some(parent) = strict else {
            return Ok(None);
        };

        let own_document = parent
            .meta_suffix()
            .is_some_and(|suffix| file_name.ends_with(&format!(".{}", suffix)));
        let child_document = file_name
            .strip_suffix(META_XML_SUFFIX)
            .and_then(|stem| stem.rsplit_once('.'))
            .is_some_and(|(_, suffix)| parent.child_type_by_suffix(suffix).is_some());
        if own_document || child_document {
            Ok(Some(parent))
        } else {
            Err(MetaformError::UnexpectedChildType {
                path: path.to_path_buf(),
                parent_type: parent.name.clone(),
            })
        }
    }

    fn meta_file_type(&self, path: &Path, stem: &str) -> MetaformResult<Arc<MetadataType>> {
        let Some((_, suffix)) = stem.rsplit_once('.') else {
            // Folder documents in metadata format: `reports/Sales-meta.xml`
            let folder = self
                .enclosing_type(path)
                .and_then(|ty| ty.folder_type.clone())
                .and_then(|id| self.registry.type_by_id(&id).ok());
            return folder.ok_or_else(|| MetaformError::TypeInference {
                path: path.to_path_buf(),
                message: "document has no type suffix".to_string(),
            });
        };

        if let Some(ty) = self.type_for_suffix(path, suffix) {
            return Ok(ty);
        }
        if let Some(parent) = self.parent_of_child_suffix(suffix) {
            return Ok(parent);
        }
        if let Some(ty) = self.registry.type_by_legacy_suffix(suffix) {
            warn!(path = %path.display(), "'{}' is a deprecated suffix of {}", suffix, ty.name);
            return Ok(ty);
        }
        if let Some(ty) = self
            .enclosing_type(path)
            .filter(|ty| ty.adapter() == SourceAdapterKind::MixedContent)
        {
            return Ok(ty);
        }

        let suffixes: Vec<&str> = self
            .registry
            .types()
            .filter_map(|t| t.suffix.as_deref())
            .collect();
        let suggestions = closest_matches(suffix, suffixes);
        let hint = if suggestions.is_empty() {
            String::new()
        } else {
            format!(" (did you mean {}?)", suggestions.join(", "))
        };
        Err(MetaformError::TypeInference {
            path: path.to_path_buf(),
            message: format!("no type uses the suffix '{}'{}", suffix, hint),
        })
    }

    /// Top-level type for a suffix. Strict-directory types only match inside
    /// their own directory.
    fn type_for_suffix(&self, path: &Path, suffix: &str) -> Option<Arc<MetadataType>> {
        self.registry.type_by_suffix(suffix).filter(|ty| {
            !ty.strict_directory_name
                || normal_parts(path)
                    .iter()
                    .any(|part| *part == ty.directory_name)
        })
    }

    fn parent_of_child_suffix(&self, suffix: &str) -> Option<Arc<MetadataType>> {
        self.registry
            .types()
            .find(|t| t.child_type_by_suffix(suffix).is_some())
            .cloned()
    }

    /// Type of a file nested inside an expanded content directory
    /// (`staticresources/app/lib/x.js`, `lwc/card/card.html`).
    fn expanded_content_type(&self, path: &Path) -> Option<Arc<MetadataType>> {
        let parts = normal_parts(path);
        parts.iter().enumerate().rev().find_map(|(i, part)| {
            let ty = self.registry.type_by_directory(part)?;
            let below = parts.len() - i - 1;
            let min_depth = match ty.adapter() {
                SourceAdapterKind::Bundle => 2,
                SourceAdapterKind::MixedContent if ty.in_folder => 3,
                SourceAdapterKind::MixedContent => 2,
                _ => return None,
            };
            (below >= min_depth).then_some(ty)
        })
    }

    /// Type owning the nearest enclosing type directory
    fn enclosing_type(&self, path: &Path) -> Option<Arc<MetadataType>> {
        let parts = normal_parts(path);
        parts[..parts.len().saturating_sub(1)]
            .iter()
            .rev()
            .find_map(|part| self.registry.type_by_directory(part))
    }

    // Source adapters

    fn default_component(&self, path: &Path, ty: &Arc<MetadataType>) -> Option<SourceComponent> {
        if self.tree.is_directory(path) {
            return None;
        }
        let name = component_name(path, ty)?;
        Some(self.component(name, ty).with_xml(path))
    }

    fn matching_content_component(
        &self,
        path: &Path,
        ty: &Arc<MetadataType>,
    ) -> MetaformResult<Option<SourceComponent>> {
        let Some(file_name) = file_name(path) else {
            return Ok(None);
        };
        let (xml, content) = match file_name.strip_suffix(META_XML_SUFFIX) {
            Some(content_name) => (path.to_path_buf(), path.with_file_name(content_name)),
            None => (
                path.with_file_name(format!("{}{}", file_name, META_XML_SUFFIX)),
                path.to_path_buf(),
            ),
        };
        let Some(name) = component_name(&xml, ty) else {
            return Ok(None);
        };
        let component = self.component(name, ty);
        if !self.tree.exists(&xml) {
            return Err(MetaformError::MissingXml {
                full_name: component.full_name(),
                type_name: ty.name.clone(),
            });
        }
        if !self.tree.exists(&content) {
            return Err(MetaformError::MissingContent {
                full_name: component.full_name(),
                type_name: ty.name.clone(),
                path: content,
            });
        }
        Ok(Some(component.with_xml(xml).with_content(content)))
    }

    fn mixed_content_component(
        &self,
        path: &Path,
        ty: &Arc<MetadataType>,
    ) -> MetaformResult<Option<SourceComponent>> {
        let Some((container, item)) = split_at_type_directory(path, ty) else {
            return Ok(None);
        };
        let base = item.split('.').next().unwrap_or(&item).to_string();

        let mut xml = ty
            .meta_suffix()
            .map(|suffix| container.join(format!("{}.{}", base, suffix)))
            .filter(|p| self.tree.exists(p));
        if xml.is_none() && !self.tree.is_directory(&container.join(&item)) {
            let candidate = if item.ends_with(META_XML_SUFFIX) {
                container.join(&item)
            } else {
                container.join(format!("{}{}", item, META_XML_SUFFIX))
            };
            xml = Some(candidate).filter(|p| self.tree.exists(p));
        }

        let name = folder_qualified(&container, ty, base.clone());
        let component = self.component(name, ty);
        let Some(xml) = xml else {
            return Err(MetaformError::MissingXml {
                full_name: component.full_name(),
                type_name: ty.name.clone(),
            });
        };

        let content = self.find_mixed_content(&container, &base, &xml)?;
        let Some(content) = content else {
            return Err(MetaformError::MissingContent {
                full_name: component.full_name(),
                type_name: ty.name.clone(),
                path: container.join(&base),
            });
        };
        Ok(Some(component.with_xml(xml).with_content(content)))
    }

    /// Directory named like the component, else a sibling file sharing its
    /// base name that is not a composed document.
    fn find_mixed_content(
        &self,
        container: &Path,
        base: &str,
        xml: &Path,
    ) -> MetaformResult<Option<PathBuf>> {
        let dir = container.join(base);
        if self.tree.is_directory(&dir) {
            return Ok(Some(dir));
        }
        let xml_name = file_name(xml).unwrap_or_default();
        let prefix = format!("{}.", base);
        Ok(self
            .tree
            .read_directory(container)?
            .into_iter()
            .find(|entry| {
                entry != xml_name
                    && !entry.ends_with(META_XML_SUFFIX)
                    && (entry == base || entry.starts_with(&prefix))
            })
            .map(|entry| container.join(entry)))
    }

    fn bundle_component(
        &self,
        path: &Path,
        ty: &Arc<MetadataType>,
    ) -> MetaformResult<Option<SourceComponent>> {
        let Some((container, item)) = split_at_type_directory(path, ty) else {
            return Ok(None);
        };
        let bundle_dir = container.join(&item);
        let component = self.component(item.clone(), ty);
        let xml = ty
            .meta_suffix()
            .map(|suffix| bundle_dir.join(format!("{}.{}", item, suffix)))
            .filter(|p| self.tree.exists(p));
        match xml {
            Some(xml) => Ok(Some(component.with_xml(xml).with_content(bundle_dir))),
            None => Err(MetaformError::MissingXml {
                full_name: component.full_name(),
                type_name: ty.name.clone(),
            }),
        }
    }

    fn decomposed_component(
        &self,
        path: &Path,
        ty: &Arc<MetadataType>,
        requested: bool,
    ) -> Option<SourceComponent> {
        let (container, item) = split_at_type_directory(path, ty)?;
        let parent_dir = container.join(&item);

        // Composed document in metadata format: `objects/Account.object`
        if !self.tree.is_directory(&parent_dir) {
            let name = component_name(path, ty)?;
            return Some(self.component(name, ty).with_xml(path));
        }

        let parent_xml = ty
            .meta_suffix()
            .map(|suffix| parent_dir.join(format!("{}.{}", item, suffix)))
            .filter(|p| self.tree.exists(p));
        let mut parent = self.component(item, ty).with_content(&parent_dir);
        if let Some(xml) = &parent_xml {
            parent = parent.with_xml(xml);
        }

        if requested && parent_xml.as_deref() != Some(path) && !self.tree.is_directory(path) {
            if let Some(child) = self.child_component(path, &parent) {
                return Some(child);
            }
        }
        Some(parent)
    }

    fn labels_component(
        &self,
        path: &Path,
        ty: &Arc<MetadataType>,
        requested: bool,
    ) -> Option<SourceComponent> {
        let file = file_name(path)?;
        let own_document = ty.suffix.as_deref().is_some_and(|suffix| {
            file.ends_with(&format!(".{}", suffix))
                || file.ends_with(&format!(".{}{}", suffix, META_XML_SUFFIX))
        });
        if own_document {
            return Some(self.component(ty.name.clone(), ty).with_xml(path));
        }

        let parent = self
            .component(ty.name.clone(), ty)
            .with_content(path.parent().unwrap_or(Path::new("")));
        if requested {
            if let Some(child) = self.child_component(path, &parent) {
                return Some(child);
            }
        }
        Some(parent)
    }

    fn child_component(&self, path: &Path, parent: &SourceComponent) -> Option<SourceComponent> {
        let stem = file_name(path)?.strip_suffix(META_XML_SUFFIX)?;
        let (name, suffix) = stem.rsplit_once('.')?;
        let child_type = parent.ty.child_type_by_suffix(suffix)?;
        Some(
            SourceComponent::new(name, Arc::clone(child_type), Arc::clone(&self.tree))
                .with_xml(path)
                .with_parent(Arc::new(parent.clone())),
        )
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn parent_name(path: &Path) -> Option<&str> {
    path.parent().and_then(file_name)
}

fn normal_parts(path: &Path) -> Vec<&str> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect()
}

/// Directory holding the component (the type directory, or its folder for
/// in-folder types) and the first path segment below it.
fn split_at_type_directory(path: &Path, ty: &MetadataType) -> Option<(PathBuf, String)> {
    let components: Vec<Component<'_>> = path.components().collect();
    let index = components
        .iter()
        .rposition(|c| c.as_os_str() == ty.directory_name.as_str())?;
    let container_len = if ty.in_folder { index + 2 } else { index + 1 };
    let item = components.get(container_len)?.as_os_str().to_str()?.to_string();
    let container: PathBuf = components[..container_len].iter().collect();
    Some((container, item))
}

/// `Folder/Name` for in-folder types
fn folder_qualified(container: &Path, ty: &MetadataType, name: String) -> String {
    if !ty.in_folder {
        return name;
    }
    match file_name(container) {
        Some(folder) => format!("{}/{}", folder, name),
        None => name,
    }
}

/// Component name of a composed document path, dropping the marker and
/// type suffixes.
fn component_name(path: &Path, ty: &MetadataType) -> Option<String> {
    let file = file_name(path)?;
    let mut name = file.strip_suffix(META_XML_SUFFIX).unwrap_or(file);
    for suffix in [&ty.suffix, &ty.legacy_suffix].into_iter().flatten() {
        if let Some(stripped) = name.strip_suffix(&format!(".{}", suffix)) {
            name = stripped;
            break;
        }
    }
    let container = path.parent().unwrap_or(Path::new(""));
    Some(folder_qualified(container, ty, name.to_string()))
}
