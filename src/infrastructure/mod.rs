//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - File trees (local, in-memory) and the output writer
//! - `registry/` - Built-in registry data, presets and overlays
//! - `transformers/` - One transformer per conversion strategy

pub mod fs;
pub mod registry;
pub mod transformers;

// Re-export for convenience
pub use fs::{LocalTree, StandardWriter, VirtualTree};
pub use registry::{default_registry, RegistryLoader};
pub use transformers::{TransformOptions, TransformerFactory};
