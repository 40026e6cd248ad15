//! Decomposed transformer
//!
//! To source: the composed document is split into one file per child entry
//! plus a parent file holding whatever is left. To metadata: parent and
//! children are recorded in the context and recomposed at finalization.
//!
//! Three policies share the same routing:
//!
//! - `Standard`: children by group tag, named by their unique id element
//! - `PermissionSet`: object-scoped entries grouped per object, every other
//!   child group collected into one file
//! - `Labels`: one file per label, no parent file

use indexmap::{IndexMap, IndexSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::TransformOptions;
use crate::domain::entities::{
    strip_namespace, DecompositionLayout, MetadataType, Registry, SourceComponent,
    TransformerStrategy, WriteInstruction,
};
use crate::domain::ports::MetadataTransformer;
use crate::domain::services::paths::{child_file_name, relative_directory, with_default_directory};
use crate::domain::services::ConvertContext;
use crate::domain::value_objects::{ComponentKey, TargetFormat};
use crate::error::{MetaformError, MetaformResult, RegistryError};
use crate::xml::{has_real_values, push_value, with_namespace, XmlObject, XmlValue};

/// Permission set entries that belong to one object, and the element
/// naming that object
const OBJECT_SCOPED: &[(&str, &str)] = &[
    ("objectPermissions", "object"),
    ("fieldPermissions", "field"),
    ("recordTypeVisibilities", "recordType"),
    ("tabSettings", "tab"),
];

const OBJECT_SETTINGS: &str = "objectsettings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompositionPolicy {
    Standard,
    PermissionSet,
    Labels,
}

#[derive(Debug, Clone)]
pub struct DecomposedTransformer {
    registry: Arc<Registry>,
    options: TransformOptions,
    policy: DecompositionPolicy,
}

/// One child file produced from the composed document
#[derive(Debug)]
struct ChildDocument {
    name: String,
    ty: Arc<MetadataType>,
    doc: XmlObject,
    /// Path below the parent's source directory
    relative: PathBuf,
}

/// Where a child document ends up when decomposing
enum ChildRoute {
    /// Over the matching file of the merge target
    Existing,
    /// Next to the merge target's parent file
    Sibling,
    /// Decided at finalization unless a merge target claims it first
    Deferred,
}

impl DecomposedTransformer {
    pub fn new(registry: Arc<Registry>, options: TransformOptions, policy: DecompositionPolicy) -> Self {
        Self {
            registry,
            options,
            policy,
        }
    }

    /// Directory the parent's source files live in
    fn parent_directory(&self, component: &SourceComponent) -> PathBuf {
        match self.policy {
            DecompositionPolicy::Labels => PathBuf::from(TargetFormat::Source.package_root())
                .join(&component.ty.directory_name),
            _ => relative_directory(component, TargetFormat::Source),
        }
    }

    fn split(
        &self,
        component: &SourceComponent,
        body: XmlObject,
    ) -> MetaformResult<(Vec<ChildDocument>, XmlObject)> {
        match self.policy {
            DecompositionPolicy::PermissionSet => Ok(self.split_permission_set(component, body)),
            _ => self.split_by_unique_id(component, body),
        }
    }

    fn split_by_unique_id(
        &self,
        component: &SourceComponent,
        body: XmlObject,
    ) -> MetaformResult<(Vec<ChildDocument>, XmlObject)> {
        let mut children = Vec::new();
        let mut remainder = XmlObject::new();

        for (tag, value) in body {
            let Some(child_ty) = component.ty.child_type_by_group_tag(&tag).cloned() else {
                remainder.insert(tag, value);
                continue;
            };
            let id_element = child_ty.unique_id_element.as_deref().ok_or_else(|| {
                RegistryError::IncompleteChild {
                    parent: component.ty.name.clone(),
                    child: child_ty.name.clone(),
                    field: "uniqueIdElement",
                }
            })?;
            let suffix = child_ty.suffix.clone().unwrap_or_else(|| child_ty.id.clone());

            for entry in value.into_list() {
                let entry = entry.into_object();
                let name = entry
                    .get(id_element)
                    .and_then(XmlValue::as_text)
                    .ok_or_else(|| MetaformError::MissingUniqueId {
                        path: component.xml.clone().unwrap_or_default(),
                        type_name: child_ty.name.clone(),
                        element: id_element.to_string(),
                    })?
                    .to_string();
                let file = child_file_name(&name, &suffix);
                let relative = match (self.policy, component.ty.decomposition()) {
                    (DecompositionPolicy::Labels, _) | (_, DecompositionLayout::TopLevel) => {
                        PathBuf::from(file)
                    }
                    (_, DecompositionLayout::FolderPerType) => {
                        PathBuf::from(&child_ty.directory_name).join(file)
                    }
                };
                children.push(ChildDocument {
                    doc: with_namespace(&child_ty.name, entry),
                    name,
                    ty: Arc::clone(&child_ty),
                    relative,
                });
            }
        }
        Ok((children, remainder))
    }

    fn split_permission_set(
        &self,
        component: &SourceComponent,
        body: XmlObject,
    ) -> (Vec<ChildDocument>, XmlObject) {
        let ty = &component.ty;
        let object_settings = ty.child_type(OBJECT_SETTINGS).cloned();
        let mut per_object: IndexMap<String, XmlObject> = IndexMap::new();
        let mut grouped: IndexMap<String, (Arc<MetadataType>, XmlObject)> = IndexMap::new();
        let mut remainder = XmlObject::new();

        for (tag, value) in body {
            let scope = OBJECT_SCOPED
                .iter()
                .find(|(group, _)| *group == tag)
                .filter(|_| object_settings.is_some());
            if let Some((_, object_element)) = scope {
                for entry in value.into_list() {
                    let object = object_of(&entry, object_element);
                    push_value(per_object.entry(object).or_default(), &tag, entry);
                }
                continue;
            }
            match ty.child_type_by_group_tag(&tag) {
                Some(child_ty) => {
                    let (_, group) = grouped
                        .entry(child_ty.id.clone())
                        .or_insert_with(|| (Arc::clone(child_ty), XmlObject::new()));
                    for entry in value.into_list() {
                        push_value(group, &tag, entry);
                    }
                }
                None => {
                    remainder.insert(tag, value);
                }
            }
        }

        let mut children = Vec::new();
        if let Some(settings_ty) = object_settings {
            let suffix = settings_ty.suffix.clone().unwrap_or_else(|| settings_ty.id.clone());
            for (object, entries) in per_object {
                children.push(ChildDocument {
                    relative: PathBuf::from(&settings_ty.directory_name)
                        .join(child_file_name(&object, &suffix)),
                    doc: with_namespace(&ty.name, entries),
                    name: object,
                    ty: Arc::clone(&settings_ty),
                });
            }
        }
        for (_, (child_ty, entries)) in grouped {
            let suffix = child_ty.suffix.clone().unwrap_or_else(|| child_ty.id.clone());
            children.push(ChildDocument {
                name: component.name.clone(),
                relative: PathBuf::from(child_file_name(&component.name, &suffix)),
                doc: with_namespace(&ty.name, entries),
                ty: child_ty,
            });
        }
        (children, remainder)
    }

    fn existing_has_real_values(merge_with: &SourceComponent) -> MetaformResult<bool> {
        let Some(doc) = merge_with.parse_xml()? else {
            return Ok(false);
        };
        Ok(doc
            .get(&merge_with.ty.name)
            .and_then(XmlValue::as_object)
            .is_some_and(has_real_values))
    }
}

/// Object an object-scoped permission entry belongs to
fn object_of(entry: &XmlValue, element: &str) -> String {
    let value = entry
        .as_object()
        .and_then(|obj| obj.get(element))
        .and_then(XmlValue::as_text)
        .unwrap_or_default();
    match element {
        "tab" => value.strip_prefix("standard-").unwrap_or(value).to_string(),
        "field" | "recordType" => value.split('.').next().unwrap_or(value).to_string(),
        _ => value.to_string(),
    }
}

impl MetadataTransformer for DecomposedTransformer {
    fn strategy(&self) -> TransformerStrategy {
        match self.policy {
            DecompositionPolicy::Standard => TransformerStrategy::Decomposed,
            DecompositionPolicy::PermissionSet => TransformerStrategy::DecomposedPermissionSet,
            DecompositionPolicy::Labels => TransformerStrategy::DecomposedLabels,
        }
    }

    fn to_metadata_format(
        &self,
        component: &SourceComponent,
        context: &mut ConvertContext,
    ) -> MetaformResult<Vec<WriteInstruction>> {
        if component.parent.is_some() {
            context.recomposition.record_child(component);
        } else {
            context.recomposition.record_parent(component);
            for child in component.children(&self.registry)? {
                context.recomposition.record_child(&child);
            }
        }
        Ok(Vec::new())
    }

    fn to_source_format(
        &self,
        component: &SourceComponent,
        merge_with: Option<&SourceComponent>,
        context: &mut ConvertContext,
    ) -> MetaformResult<Vec<WriteInstruction>> {
        if component.parent.is_some() {
            debug!(component = %component.key(), "child documents are split from their parent");
            return Ok(Vec::new());
        }
        let doc = component
            .parse_xml()?
            .ok_or_else(|| MetaformError::MissingXml {
                full_name: component.full_name(),
                type_name: component.ty.name.clone(),
            })?;
        let body = doc
            .get(&component.ty.name)
            .cloned()
            .map(|value| strip_namespace(value.into_object()))
            .unwrap_or_default();

        let default_dir = self.options.default_directory();
        let parent_dir = self.parent_directory(component);
        let merge_xml = merge_with.and_then(|m| m.xml.as_deref());
        let parent_output = match merge_xml {
            Some(xml) => xml.to_path_buf(),
            None => with_default_directory(
                default_dir,
                parent_dir.join(child_file_name(
                    &component.name,
                    component.ty.suffix.as_deref().unwrap_or(&component.ty.id),
                )),
            ),
        };
        if self.policy != DecompositionPolicy::Labels
            && component.force_ignore().denies(&parent_output)
        {
            debug!(output = %parent_output.display(), "parent output is ignored");
            return Ok(Vec::new());
        }

        let (children, remainder) = self.split(component, body)?;
        let existing: IndexMap<ComponentKey, SourceComponent> = match merge_with {
            Some(target) => target
                .children(&self.registry)?
                .into_iter()
                .map(|child| (child.key(), child))
                .collect(),
            None => IndexMap::new(),
        };

        let parent = Arc::new(component.clone());
        let mut writes = Vec::new();
        let mut incoming = IndexSet::new();

        for child in children {
            let origin =
                SourceComponent::new(child.name.as_str(), Arc::clone(&child.ty), Arc::clone(component.tree()))
                    .with_parent(Arc::clone(&parent));
            let key = origin.key();
            incoming.insert(key.clone());

            let existing_xml = existing.get(&key).and_then(|e| e.xml.clone());
            let (destination, route) = match (existing_xml, merge_xml) {
                (Some(existing_xml), _) => (existing_xml, ChildRoute::Existing),
                (None, Some(merge_xml)) if child.ty.unaddressable_without_parent => {
                    let dir = merge_xml.parent().unwrap_or(Path::new(""));
                    (dir.join(&child.relative), ChildRoute::Sibling)
                }
                _ => (
                    with_default_directory(default_dir, parent_dir.join(&child.relative)),
                    ChildRoute::Deferred,
                ),
            };
            if component.force_ignore().denies(&destination) {
                debug!(child = %key, output = %destination.display(), "child output is ignored");
                continue;
            }

            let write = WriteInstruction::xml(destination, child.doc);
            match route {
                ChildRoute::Existing => {
                    writes.push(write);
                    context.decomposition.mark_found(key, &origin);
                }
                ChildRoute::Sibling => writes.push(write),
                ChildRoute::Deferred => context.decomposition.defer(key, &origin, Some(write)),
            }
        }

        if self.policy != DecompositionPolicy::Labels {
            let has_values = has_real_values(&remainder);
            let parent_doc = with_namespace(&component.ty.name, remainder);
            match merge_with {
                Some(_) if has_values => writes.push(WriteInstruction::xml(parent_output, parent_doc)),
                Some(target) if Self::existing_has_real_values(target)? => {
                    debug!(component = %component.key(), "keeping existing parent document");
                }
                Some(_) => context.decomposition.defer(
                    component.key(),
                    component,
                    Some(WriteInstruction::xml(parent_output, parent_doc)),
                ),
                None if !has_values && self.options.output_exists(&parent_output) => {
                    context.decomposition.defer(component.key(), component, None);
                }
                None => writes.push(WriteInstruction::xml(parent_output, parent_doc)),
            }
        }

        if let Some(target) = merge_with {
            if component.ty.all_children_unaddressable() {
                for (key, stale) in existing.iter().filter(|(key, _)| !incoming.contains(*key)) {
                    if let Some(xml) = &stale.xml {
                        debug!(child = %key, "removing child missing from the incoming document");
                        writes.push(WriteInstruction::delete(xml.clone(), stale));
                    }
                }
                debug!(target = %target.key(), "pruned stale children");
            }
        }
        Ok(writes)
    }
}
