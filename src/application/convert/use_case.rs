//! Convert Use Case
//!
//! Orchestrates a conversion:
//! 1. Index the local components incoming ones merge into
//! 2. Run each component through the transformer of its strategy
//! 3. Finalize the conversion context once every component was seen
//! 4. Hand the results to a writer
//!
//! All conversion rules live in the transformers and domain services.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::entities::{ConversionResult, Registry, SourceComponent};
use crate::domain::ports::{ComponentWriter, FileTree};
use crate::domain::services::{ComponentIndex, ConvertContext, FinalizeOptions};
use crate::domain::value_objects::TargetFormat;
use crate::error::MetaformResult;
use crate::infrastructure::fs::{LocalTree, StandardWriter};
use crate::infrastructure::transformers::{TransformOptions, TransformerFactory};

use super::options::{ConvertOptions, OutputConfig};
use super::result::ConvertResult;

/// Converts resolved components to another format
#[derive(Debug, Clone)]
pub struct MetadataConverter {
    registry: Arc<Registry>,
    /// Where the output and the merge project live
    output_tree: Arc<dyn FileTree>,
}

impl MetadataConverter {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            output_tree: Arc::new(LocalTree::new()),
        }
    }

    /// Consult another tree for what already exists at the output
    pub fn with_output_tree(mut self, output_tree: Arc<dyn FileTree>) -> Self {
        self.output_tree = output_tree;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Everything the conversion would write, without writing it
    pub fn plan(
        &self,
        components: Vec<SourceComponent>,
        options: &ConvertOptions,
    ) -> MetaformResult<Vec<ConversionResult>> {
        let factory = TransformerFactory::new(
            Arc::clone(&self.registry),
            TransformOptions {
                default_directory: options.output.default_directory().map(Path::to_path_buf),
                output_root: options.output.writer_root(),
                output_tree: Arc::clone(&self.output_tree),
            },
        );
        let index = match &options.output {
            OutputConfig::Merge { merge_with, .. } => {
                ComponentIndex::from_components(merge_with.iter().cloned(), &self.registry)?
            }
            OutputConfig::Directory { .. } => ComponentIndex::new(),
        };
        debug!(
            components = components.len(),
            merge_targets = index.len(),
            format = %options.format,
            "planning conversion"
        );

        let mut context = ConvertContext::new();
        let mut results = Vec::with_capacity(components.len());
        for mut component in components {
            let transformer = factory.transformer_for(&component);
            let writes = match options.format {
                TargetFormat::Metadata => {
                    component.set_replacements(options.replacements.clone());
                    transformer.to_metadata_format(&component, &mut context)?
                }
                TargetFormat::Source => {
                    let merge_with = index.merge_target(&component);
                    transformer.to_source_format(&component, merge_with, &mut context)?
                }
            };
            if !writes.is_empty() {
                results.push(ConversionResult::new(component, writes));
            }
        }

        results.extend(context.finalize(FinalizeOptions {
            default_directory: options.output.default_directory(),
            project_root: options.output.project_root(),
            project_tree: &self.output_tree,
        })?);
        Ok(results)
    }

    /// Convert and write with the standard writer
    pub fn convert(
        &self,
        components: Vec<SourceComponent>,
        options: &ConvertOptions,
    ) -> MetaformResult<ConvertResult> {
        let writer = StandardWriter::new(options.output.writer_root())
            .with_skip_unchanged(options.skip_unchanged);
        self.convert_with(components, options, &writer)
    }

    /// Convert and write through `writer`
    pub fn convert_with(
        &self,
        components: Vec<SourceComponent>,
        options: &ConvertOptions,
        writer: &dyn ComponentWriter,
    ) -> MetaformResult<ConvertResult> {
        let plan = self.plan(components, options)?;
        let mut result = ConvertResult::from_plan(&plan);
        if options.dry_run {
            info!(planned = result.planned.len(), "dry run, nothing written");
            return Ok(result);
        }

        let report = writer.write(&plan)?;
        result.written = report.written;
        result.deleted = report.deleted;
        result.skipped = report.skipped;

        // Hits are recorded while files are read, which happens during the write
        if let Some(replacements) = &options.replacements {
            result.unmatched_replacements = replacements.unmatched();
            for unmatched in &result.unmatched_replacements {
                warn!(replacement = %unmatched, "replacement never matched");
            }
        }
        info!(
            written = result.written.len(),
            deleted = result.deleted.len(),
            skipped = result.skipped.len(),
            "conversion complete"
        );
        Ok(result)
    }
}
