//! Conversion context
//!
//! Per-run store for writes that depend on more than one component. Each
//! transformer records into the context while components are processed;
//! [`ConvertContext::finalize`] consumes it once all of them have been seen
//! and emits the remaining writes.

mod decomposition;
mod non_decomposition;
mod recomposition;

pub use decomposition::DecompositionState;
pub use non_decomposition::{child_entries, ChildEntry, NonDecompositionState};
pub use recomposition::RecompositionState;

use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::ConversionResult;
use crate::domain::ports::FileTree;
use crate::error::MetaformResult;

/// Inputs the finalizers need beyond the recorded state
#[derive(Debug, Clone, Copy)]
pub struct FinalizeOptions<'a> {
    /// Package directory new files go to when merging
    pub default_directory: Option<&'a Path>,
    /// Root scanned for parent documents nobody claimed
    pub project_root: Option<&'a Path>,
    pub project_tree: &'a Arc<dyn FileTree>,
}

#[derive(Debug, Default)]
pub struct ConvertContext {
    pub recomposition: RecompositionState,
    pub decomposition: DecompositionState,
    pub non_decomposition: NonDecompositionState,
}

impl ConvertContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every finalizer. Consumes the context so it can only happen once.
    pub fn finalize(self, options: FinalizeOptions<'_>) -> MetaformResult<Vec<ConversionResult>> {
        let mut results = self.recomposition.finalize()?;
        let recomposed = results.len();

        results.extend(self.decomposition.finalize());
        let decomposed = results.len() - recomposed;

        results.extend(self.non_decomposition.finalize(options)?);
        debug!(
            recomposed,
            decomposed,
            non_decomposed = results.len() - recomposed - decomposed,
            "finalized conversion context"
        );
        Ok(results)
    }
}
