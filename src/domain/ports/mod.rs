//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

mod component_writer;
mod file_tree;
mod transformer;

pub use component_writer::{ComponentWriter, WriteReport};
pub use file_tree::{walk_files, FileTree, FsError, FsResult};
pub use transformer::MetadataTransformer;
