//! MetadataTransformer port
//!
//! One implementation per [`TransformerStrategy`]. A transformer turns a
//! component into write instructions for the requested format, recording
//! anything that depends on other components in the [`ConvertContext`].

use crate::domain::entities::{SourceComponent, TransformerStrategy, WriteInstruction};
use crate::domain::services::ConvertContext;
use crate::error::MetaformResult;

pub trait MetadataTransformer: std::fmt::Debug + Send + Sync {
    /// The strategy this transformer implements
    fn strategy(&self) -> TransformerStrategy;

    /// Source format to composed documents
    fn to_metadata_format(
        &self,
        component: &SourceComponent,
        context: &mut ConvertContext,
    ) -> MetaformResult<Vec<WriteInstruction>>;

    /// Composed documents to source format.
    ///
    /// `merge_with` is the existing local component the output should be
    /// merged into, if there is one.
    fn to_source_format(
        &self,
        component: &SourceComponent,
        merge_with: Option<&SourceComponent>,
        context: &mut ConvertContext,
    ) -> MetaformResult<Vec<WriteInstruction>>;
}
