//! Transformers
//!
//! These implement the MetadataTransformer port from the domain layer.
//! Each one turns a resolved component into write instructions for the
//! requested format, recording cross-component work in the context.

mod decomposed;
mod default;
mod external_service;
mod non_decomposed;
mod static_resource;

pub use decomposed::{DecomposedTransformer, DecompositionPolicy};
pub use default::DefaultTransformer;
pub use external_service::ExternalServiceTransformer;
pub use non_decomposed::NonDecomposedTransformer;
pub use static_resource::StaticResourceTransformer;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::entities::{Registry, SourceComponent, TransformerStrategy};
use crate::domain::ports::{FileTree, MetadataTransformer};
use crate::infrastructure::fs::LocalTree;

/// Settings shared by every transformer of a run
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Package directory new source files go to when merging
    pub default_directory: Option<PathBuf>,
    /// Root relative outputs resolve against
    pub output_root: PathBuf,
    /// Tree consulted to see what is already on disk at the output
    pub output_tree: Arc<dyn FileTree>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            default_directory: None,
            output_root: PathBuf::new(),
            output_tree: Arc::new(LocalTree::new()),
        }
    }
}

impl TransformOptions {
    pub fn default_directory(&self) -> Option<&Path> {
        self.default_directory.as_deref()
    }

    /// Whether `output` already exists where the writer would put it
    pub fn output_exists(&self, output: &Path) -> bool {
        if output.is_absolute() {
            self.output_tree.exists(output)
        } else {
            self.output_tree.exists(&self.output_root.join(output))
        }
    }
}

/// Picks the transformer for a component.
///
/// Children are converted by their parent's transformer.
#[derive(Debug, Clone)]
pub struct TransformerFactory {
    registry: Arc<Registry>,
    options: TransformOptions,
}

impl TransformerFactory {
    pub fn new(registry: Arc<Registry>, options: TransformOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub fn transformer_for(&self, component: &SourceComponent) -> Box<dyn MetadataTransformer> {
        let strategy = component
            .parent
            .as_ref()
            .map(|parent| parent.ty.transformer())
            .unwrap_or_else(|| component.ty.transformer());
        let registry = Arc::clone(&self.registry);
        let options = self.options.clone();

        match strategy {
            TransformerStrategy::Standard => Box::new(
                DefaultTransformer::new().with_default_directory(options.default_directory),
            ),
            TransformerStrategy::Decomposed => Box::new(DecomposedTransformer::new(
                registry,
                options,
                DecompositionPolicy::Standard,
            )),
            TransformerStrategy::DecomposedPermissionSet => Box::new(DecomposedTransformer::new(
                registry,
                options,
                DecompositionPolicy::PermissionSet,
            )),
            TransformerStrategy::DecomposedLabels => Box::new(DecomposedTransformer::new(
                registry,
                options,
                DecompositionPolicy::Labels,
            )),
            TransformerStrategy::NonDecomposed => Box::new(NonDecomposedTransformer::new(registry)),
            TransformerStrategy::StaticResource => {
                Box::new(StaticResourceTransformer::new(options))
            }
            TransformerStrategy::DecomposedExternalServiceRegistration => {
                Box::new(
                    ExternalServiceTransformer::new()
                        .with_default_directory(options.default_directory),
                )
            }
        }
    }
}
