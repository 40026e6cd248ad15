//! Domain Value Objects
//!
//! Immutable value types shared by the conversion pipeline.

mod component_key;
mod format;
mod ignore_patterns;
mod replacement;

pub use component_key::ComponentKey;
pub use format::TargetFormat;
pub use ignore_patterns::{ForceIgnore, IgnoreError, IGNORE_FILE_NAME};
pub use replacement::{EnvCondition, Replacement, ReplacementMatcher, ReplacementRule};
