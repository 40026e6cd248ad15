//! Domain Entities
//!
//! - `MetadataType` - static description of a document kind
//! - `Registry` - index over every known type
//! - `SourceComponent` - one logical unit resolved from a file tree
//! - `WriteInstruction` - a planned write or deletion

mod component;
mod metadata_type;
mod registry;
mod write_instruction;

pub use component::{strip_namespace, SourceComponent};
pub use metadata_type::{
    ChildTypes, DecompositionLayout, MetadataType, RecompositionPolicy, SourceAdapterKind,
    Strategies, TransformerStrategy, META_XML_SUFFIX,
};
pub use registry::{Registry, RegistryData};
pub use write_instruction::{ConversionResult, WriteInstruction, WriteSource};
