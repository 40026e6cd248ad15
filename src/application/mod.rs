//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain and the transformers)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `MetadataConverter` - Runs components through their transformers, finalizes and writes

pub mod convert;

pub use convert::{
    build_replacements, ConvertOptions, ConvertResult, MetadataConverter, OutputConfig,
    PlannedWrite,
};
