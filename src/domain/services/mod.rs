//! Domain Services
//!
//! Conversion logic that operates on domain entities. File access goes
//! through the [`FileTree`](crate::domain::ports::FileTree) port only.

mod component_index;
pub mod convert_context;
pub mod paths;
mod replacement_engine;
mod resolver;
mod suggestions;

pub use component_index::ComponentIndex;
pub use convert_context::{ConvertContext, FinalizeOptions};
pub use replacement_engine::{FileSelector, ReplacementSet, DEFAULT_CHUNK_SIZE};
pub use resolver::MetadataResolver;
pub use suggestions::closest_matches;
