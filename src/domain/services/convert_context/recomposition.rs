//! Recomposition: merge child documents back into their parent document

use indexmap::IndexMap;

use crate::domain::entities::{
    strip_namespace, ConversionResult, SourceComponent, TransformerStrategy, WriteInstruction,
};
use crate::domain::services::paths::relative_directory;
use crate::domain::value_objects::{ComponentKey, TargetFormat};
use crate::error::{MetaformError, MetaformResult};
use crate::xml::{push_value, with_namespace, XmlObject, XmlValue};

#[derive(Debug, Default)]
struct RecompositionEntry {
    component: Option<SourceComponent>,
    children: IndexMap<ComponentKey, SourceComponent>,
}

#[derive(Debug, Default)]
pub struct RecompositionState {
    entries: IndexMap<ComponentKey, RecompositionEntry>,
}

impl RecompositionState {
    /// Register a parent component; its document seeds the recomposed one.
    pub fn record_parent(&mut self, parent: &SourceComponent) {
        self.entries.entry(parent.key()).or_default().component = Some(parent.clone());
    }

    /// Register a child under the parent it belongs to.
    pub fn record_child(&mut self, child: &SourceComponent) {
        let Some(parent) = &child.parent else {
            return;
        };
        self.entries
            .entry(parent.key())
            .or_default()
            .children
            .insert(child.key(), child.clone());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(super) fn finalize(self) -> MetaformResult<Vec<ConversionResult>> {
        let mut results = Vec::with_capacity(self.entries.len());
        for entry in self.entries.into_values() {
            let parent = match (entry.component, entry.children.values().next()) {
                (Some(parent), _) => parent,
                (None, Some(child)) => match &child.parent {
                    Some(parent) => SourceComponent::clone(parent),
                    None => continue,
                },
                (None, None) => continue,
            };
            let body = recompose(&parent, entry.children.values())?;
            let output = recomposed_output(&parent);
            results.push(ConversionResult::new(
                parent.clone(),
                vec![WriteInstruction::xml(output, with_namespace(&parent.ty.name, body))],
            ));
        }
        Ok(results)
    }
}

fn starts_empty(parent: &SourceComponent) -> bool {
    parent.ty.starts_empty()
        || parent.ty.transformer() == TransformerStrategy::NonDecomposed
        || parent.xml.is_none()
}

fn recompose<'a>(
    parent: &SourceComponent,
    children: impl Iterator<Item = &'a SourceComponent>,
) -> MetaformResult<XmlObject> {
    let mut body = if starts_empty(parent) {
        XmlObject::new()
    } else {
        root_body(parent)?
    };

    for child in children {
        let child_body = root_body(child)?;
        match &child.ty.unique_id_element {
            Some(id_element) => {
                let mut entry = child_body;
                if !entry.contains_key(id_element) {
                    entry.shift_insert(0, id_element.clone(), XmlValue::text(child.name.clone()));
                }
                push_value(&mut body, child.ty.group_tag(), XmlValue::Object(entry));
            }
            // Grouped child files hold the parent's own tags
            None => {
                for (tag, value) in child_body {
                    for item in value.into_list() {
                        push_value(&mut body, &tag, item);
                    }
                }
            }
        }
    }
    Ok(body)
}

/// Body of the single root element of a component's document, without the
/// namespace marker.
fn root_body(component: &SourceComponent) -> MetaformResult<XmlObject> {
    let doc = component
        .parse_xml()?
        .ok_or_else(|| MetaformError::MissingXml {
            full_name: component.full_name(),
            type_name: component.ty.name.clone(),
        })?;
    Ok(doc
        .into_iter()
        .next()
        .map(|(_, value)| strip_namespace(value.into_object()))
        .unwrap_or_default())
}

fn recomposed_output(parent: &SourceComponent) -> std::path::PathBuf {
    let dir = relative_directory(parent, TargetFormat::Metadata);
    match &parent.ty.suffix {
        Some(suffix) => dir.join(format!("{}.{}", parent.full_name(), suffix)),
        None => dir.join(parent.full_name()),
    }
}
