//! Registry data sources
//!
//! The built-in registry and presets are compiled into the binary; a
//! project may add a JSON overlay on top.

mod loader;

pub use loader::{default_registry, parse_registry_data, preset_names, RegistryLoader};
