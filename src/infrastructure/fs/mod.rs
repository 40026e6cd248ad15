//! File System Implementations
//!
//! Concrete implementations of the FileTree and ComponentWriter ports.

mod local;
mod virtual_tree;
mod writer;

pub use local::LocalTree;
pub use virtual_tree::VirtualTree;
pub use writer::{hash_content, StandardWriter};
