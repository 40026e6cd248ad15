//! Convert Module
//!
//! Orchestrates a conversion between the source and metadata formats.
//!
//! ## Structure
//!
//! - `options` - Configuration types (`ConvertOptions`, `OutputConfig`)
//! - `result` - Result types (`ConvertResult`)
//! - `replacements` - Turns configured rules into a `ReplacementSet`
//! - `use_case` - Core use case logic (`MetadataConverter`)
//!
//! ## Usage
//!
//! ```ignore
//! use metaform::application::convert::{ConvertOptions, MetadataConverter, OutputConfig};
//!
//! let converter = MetadataConverter::new(registry);
//! let output = OutputConfig::directory("out");
//! let result = converter.convert(components, &ConvertOptions::new(TargetFormat::Metadata, output))?;
//! ```

mod options;
mod replacements;
mod result;
mod use_case;

pub use options::{ConvertOptions, OutputConfig};
pub use replacements::build_replacements;
pub use result::{ConvertResult, PlannedWrite};
pub use use_case::MetadataConverter;
