//! Domain Layer
//!
//! The conversion engine without any direct disk access.
//!
//! ## Structure
//!
//! - `entities/` - Core entities (MetadataType, Registry, SourceComponent, WriteInstruction)
//! - `value_objects/` - Immutable value types (ComponentKey, TargetFormat, ForceIgnore)
//! - `services/` - Resolver, path rules, conversion context, replacements
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No direct I/O** - Files are read through the `FileTree` port
//! 2. **Describe, don't act** - Conversions produce `WriteInstruction`s; a writer realizes them
//! 3. **Ports & Adapters** - Transformers and writers are trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
