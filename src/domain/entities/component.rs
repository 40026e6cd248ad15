//! SourceComponent entity - one logical unit resolved from a file tree
//!
//! A component knows its type, where its composed document and content
//! live, and its parent (for children). Children are never stored: they are
//! derived from the tree every time [`SourceComponent::children`] is called.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use super::metadata_type::{MetadataType, TransformerStrategy, META_XML_SUFFIX};
use super::registry::Registry;
use crate::domain::ports::{walk_files, FileTree};
use crate::domain::services::ReplacementSet;
use crate::domain::value_objects::{ComponentKey, ForceIgnore};
use crate::error::{MetaformError, MetaformResult};
use crate::xml::{parse_xml, with_namespace, XmlObject, XmlValue, XML_NS_KEY};

#[derive(Debug, Clone)]
pub struct SourceComponent {
    pub name: String,
    pub ty: Arc<MetadataType>,
    pub xml: Option<PathBuf>,
    pub content: Option<PathBuf>,
    pub parent: Option<Arc<SourceComponent>>,
    tree: Arc<dyn FileTree>,
    force_ignore: Arc<ForceIgnore>,
    replacements: Option<Arc<ReplacementSet>>,
}

impl SourceComponent {
    pub fn new(name: impl Into<String>, ty: Arc<MetadataType>, tree: Arc<dyn FileTree>) -> Self {
        Self {
            name: name.into(),
            ty,
            xml: None,
            content: None,
            parent: None,
            tree,
            force_ignore: Arc::new(ForceIgnore::default()),
            replacements: None,
        }
    }

    pub fn with_xml(mut self, xml: impl Into<PathBuf>) -> Self {
        self.xml = Some(xml.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<PathBuf>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_parent(mut self, parent: Arc<SourceComponent>) -> Self {
        self.force_ignore = Arc::clone(&parent.force_ignore);
        self.replacements = parent.replacements.clone();
        self.parent = Some(parent);
        self
    }

    pub fn with_force_ignore(mut self, force_ignore: Arc<ForceIgnore>) -> Self {
        self.force_ignore = force_ignore;
        self
    }

    /// Attach the run's replacements; later reads through
    /// [`read_source`](Self::read_source) apply them.
    pub fn set_replacements(&mut self, replacements: Option<Arc<ReplacementSet>>) {
        self.replacements = replacements;
    }

    pub fn replacements(&self) -> Option<&Arc<ReplacementSet>> {
        self.replacements.as_ref()
    }

    /// `Parent.Child` for children unless the type ignores its parent's name
    pub fn full_name(&self) -> String {
        match &self.parent {
            Some(parent) if !self.ty.ignore_parent_name => {
                format!("{}.{}", parent.full_name(), self.name)
            }
            _ => self.name.clone(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.ty.name
    }

    pub fn key(&self) -> ComponentKey {
        ComponentKey::new(&self.ty.id, &self.full_name())
    }

    pub fn tree(&self) -> &Arc<dyn FileTree> {
        &self.tree
    }

    pub fn force_ignore(&self) -> &ForceIgnore {
        &self.force_ignore
    }

    /// Read a file of this component, applying attached replacements
    pub fn read_source(&self, path: &Path) -> MetaformResult<Vec<u8>> {
        let reader = self.tree.stream(path)?;
        self.read_with_replacements(path, reader)
    }

    pub fn read_with_replacements(
        &self,
        path: &Path,
        mut reader: impl Read,
    ) -> MetaformResult<Vec<u8>> {
        match &self.replacements {
            Some(set) => Ok(set.apply(path, reader)?),
            None => {
                let mut out = Vec::new();
                reader.read_to_end(&mut out)?;
                Ok(out)
            }
        }
    }

    /// Parse the composed document.
    ///
    /// A child of a non-decomposed parent shares the parent's file, so only
    /// its own entry is extracted and wrapped as a standalone document.
    pub fn parse_xml(&self) -> MetaformResult<Option<XmlObject>> {
        let Some(xml) = &self.xml else {
            return Ok(None);
        };
        let doc = self.parse_file(xml)?;

        match &self.parent {
            Some(parent) if parent.xml.as_ref() == Some(xml) => {
                Ok(self.fragment_from_parent(&doc, parent)?)
            }
            _ => Ok(Some(doc)),
        }
    }

    fn parse_file(&self, path: &Path) -> MetaformResult<XmlObject> {
        let bytes = self.read_source(path)?;
        parse_xml(&bytes).map_err(|e| MetaformError::XmlParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn fragment_from_parent(
        &self,
        doc: &XmlObject,
        parent: &SourceComponent,
    ) -> MetaformResult<Option<XmlObject>> {
        let (Some(id_element), Some(group)) = (
            self.ty.unique_id_element.as_deref(),
            self.ty.xml_element_name.as_deref(),
        ) else {
            return Ok(None);
        };
        let entries = doc
            .get(&parent.ty.name)
            .and_then(XmlValue::as_object)
            .and_then(|body| body.get(group));
        let Some(entries) = entries else {
            return Ok(None);
        };
        let found = entries.as_list().into_iter().find_map(|entry| {
            let obj = entry.as_object()?;
            (obj.get(id_element)?.as_text()? == self.name).then(|| obj.clone())
        });
        Ok(found.map(|fragment| with_namespace(&self.ty.name, fragment)))
    }

    /// Content files, honoring the ignore rules
    pub fn walk_content(&self) -> MetaformResult<Vec<PathBuf>> {
        let Some(content) = &self.content else {
            return Ok(Vec::new());
        };
        let ignore = &self.force_ignore;
        let files = walk_files(self.tree.as_ref(), content, &|dir: &Path| {
            ignore.accepts(dir)
        })?;
        Ok(files
            .into_iter()
            .filter(|f| self.force_ignore.accepts(f))
            .collect())
    }

    /// Derive the children of this component from the tree.
    pub fn children(&self, registry: &Registry) -> MetaformResult<Vec<SourceComponent>> {
        if !self.ty.has_children() {
            return Ok(Vec::new());
        }
        let children = match self.ty.transformer() {
            TransformerStrategy::NonDecomposed => self.children_from_xml()?,
            _ => self.children_from_files(registry)?,
        };
        for child in &children {
            if self.ty.child_type(&child.ty.id).is_none() {
                return Err(MetaformError::TypeInference {
                    path: child.xml.clone().unwrap_or_default(),
                    message: format!(
                        "{} is not a child type of {}",
                        child.ty.name, self.ty.name
                    ),
                });
            }
        }
        Ok(children)
    }

    fn children_from_files(&self, registry: &Registry) -> MetaformResult<Vec<SourceComponent>> {
        let parent = Arc::new(self.clone());
        let own_suffix = self.ty.meta_suffix();
        let mut children = Vec::new();

        for path in self.walk_content()? {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if own_suffix
                .as_deref()
                .is_some_and(|suffix| file_name.ends_with(&format!(".{}", suffix)))
            {
                continue;
            }
            let Some(stem) = file_name.strip_suffix(META_XML_SUFFIX) else {
                continue;
            };
            let Some((name, suffix)) = stem.rsplit_once('.') else {
                continue;
            };

            match self.ty.child_type_by_suffix(suffix) {
                Some(child_type) => children.push(
                    SourceComponent::new(name, Arc::clone(child_type), Arc::clone(&self.tree))
                        .with_xml(&path)
                        .with_parent(Arc::clone(&parent)),
                ),
                None if registry.type_by_suffix(suffix).is_some() => {
                    return Err(MetaformError::UnexpectedChildType {
                        path,
                        parent_type: self.ty.name.clone(),
                    });
                }
                None => {
                    warn!(
                        path = %path.display(),
                        parent = %self.ty.name,
                        "skipping file with unknown child suffix '{}'",
                        suffix
                    );
                }
            }
        }
        Ok(children)
    }

    fn children_from_xml(&self) -> MetaformResult<Vec<SourceComponent>> {
        let (Some(xml), Some(doc)) = (&self.xml, self.parse_xml()?) else {
            return Ok(Vec::new());
        };
        let Some(body) = doc.get(&self.ty.name).and_then(XmlValue::as_object) else {
            return Ok(Vec::new());
        };
        let parent = Arc::new(self.clone());
        let mut children = Vec::new();

        for child_type in self.ty.child_types() {
            let (Some(id_element), Some(group)) = (
                child_type.unique_id_element.as_deref(),
                child_type.xml_element_name.as_deref(),
            ) else {
                continue;
            };
            let Some(entries) = body.get(group) else {
                continue;
            };
            for entry in entries.as_list() {
                let name = entry
                    .as_object()
                    .and_then(|obj| obj.get(id_element))
                    .and_then(XmlValue::as_text)
                    .ok_or_else(|| MetaformError::MissingUniqueId {
                        path: xml.clone(),
                        type_name: child_type.name.clone(),
                        element: id_element.to_string(),
                    })?;
                children.push(
                    SourceComponent::new(name, Arc::clone(child_type), Arc::clone(&self.tree))
                        .with_xml(xml)
                        .with_parent(Arc::clone(&parent)),
                );
            }
        }
        Ok(children)
    }
}

/// Drop the namespace marker from a document body
pub fn strip_namespace(mut body: XmlObject) -> XmlObject {
    body.shift_remove(XML_NS_KEY);
    body
}

#[cfg(test)]
mod tests;
