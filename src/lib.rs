//! metaform - decomposition and recomposition engine for metadata documents
//!
//! A composed document describes one logical unit (an object, a label set,
//! a permission set) in a single XML file. metaform splits such documents
//! into a source tree of small files and merges them back, driven by a
//! registry of type descriptors.
//!
//! ```ignore
//! use metaform::application::{ConvertOptions, MetadataConverter, OutputConfig};
//! use metaform::domain::value_objects::TargetFormat;
//!
//! let registry = Arc::new(metaform::infrastructure::default_registry()?);
//! let resolver = MetadataResolver::new(Arc::clone(&registry), Arc::new(LocalTree::new()));
//! let components = resolver.components_from_path(Path::new("force-app"))?;
//! let options = ConvertOptions::new(TargetFormat::Metadata, OutputConfig::directory("out"));
//! MetadataConverter::new(registry).convert(components, &options)?;
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod xml;

// Re-exports for convenience
pub use application::{ConvertOptions, ConvertResult, MetadataConverter, OutputConfig};
pub use config::Config;
pub use domain::entities::{MetadataType, Registry, SourceComponent, WriteInstruction};
pub use domain::services::MetadataResolver;
pub use domain::value_objects::TargetFormat;
pub use error::{MetaformError, MetaformResult, RegistryError};
