//! Non-decomposed transformer
//!
//! Children live as entries inside one shared parent document in both
//! formats. Converting to source routes each entry to the parent file that
//! already owns it; the routing itself happens when the context finalizes.

use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::{Registry, SourceComponent, TransformerStrategy, WriteInstruction};
use crate::domain::ports::MetadataTransformer;
use crate::domain::services::convert_context::child_entries;
use crate::domain::services::ConvertContext;
use crate::error::{MetaformError, MetaformResult};

#[derive(Debug, Clone)]
pub struct NonDecomposedTransformer {
    registry: Arc<Registry>,
}

impl NonDecomposedTransformer {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

impl MetadataTransformer for NonDecomposedTransformer {
    fn strategy(&self) -> TransformerStrategy {
        TransformerStrategy::NonDecomposed
    }

    fn to_metadata_format(
        &self,
        component: &SourceComponent,
        context: &mut ConvertContext,
    ) -> MetaformResult<Vec<WriteInstruction>> {
        if component.parent.is_some() {
            context.recomposition.record_child(component);
            return Ok(Vec::new());
        }
        context.recomposition.record_parent(component);
        for child in component.children(&self.registry)? {
            context.recomposition.record_child(&child);
        }
        Ok(Vec::new())
    }

    fn to_source_format(
        &self,
        component: &SourceComponent,
        merge_with: Option<&SourceComponent>,
        context: &mut ConvertContext,
    ) -> MetaformResult<Vec<WriteInstruction>> {
        let missing = || MetaformError::MissingXml {
            full_name: component.full_name(),
            type_name: component.ty.name.clone(),
        };
        let xml = component.xml.as_deref().ok_or_else(missing)?;
        let doc = component.parse_xml()?.ok_or_else(missing)?;
        let incoming = child_entries(&component.ty, &doc, xml)?;
        context.non_decomposition.set_example(component);

        let target = merge_with.and_then(|m| m.xml.as_deref().map(|path| (m, path)));
        if let Some((target, target_xml)) = target {
            if !context.non_decomposition.is_claimed(target_xml) {
                let existing = match target.parse_xml()? {
                    Some(existing) => child_entries(&target.ty, &existing, target_xml)?,
                    None => Vec::new(),
                };
                context
                    .non_decomposition
                    .seed_claimed(target_xml, target, existing);
            }
        }

        let claimed = target
            .map(|(_, path)| context.non_decomposition.claimed_names(path))
            .unwrap_or_default();
        for entry in incoming {
            match target {
                Some((target, target_xml)) if claimed.contains(&entry.name) => {
                    context.non_decomposition.add_claimed(target_xml, target, entry);
                }
                _ => context.non_decomposition.add_unclaimed(xml, component, entry),
            }
        }
        debug!(
            component = %component.key(),
            claimed = claimed.len(),
            "routed entries of non-decomposed parent"
        );
        Ok(Vec::new())
    }
}
