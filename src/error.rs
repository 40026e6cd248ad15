//! Error types for metaform
//!
//! Uses `thiserror` for library errors. The binary wraps these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::FsError;
use crate::domain::value_objects::IgnoreError;

/// Result type alias for metaform operations
pub type MetaformResult<T> = Result<T, MetaformError>;

/// Main error type for metaform operations
#[derive(Error, Debug)]
pub enum MetaformError {
    /// Registry data is invalid or a lookup failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A composed document could not be parsed
    #[error("could not parse {path}: {message}")]
    XmlParse { path: PathBuf, message: String },

    /// A child entry is missing the element that names it
    #[error("{type_name} entry in {path} is missing its unique id element '{element}'")]
    MissingUniqueId {
        path: PathBuf,
        type_name: String,
        element: String,
    },

    /// The type of a file could not be inferred
    #[error("could not infer a metadata type for {path}: {message}")]
    TypeInference { path: PathBuf, message: String },

    /// A file inside a parent's folder resolved to a type that is not one of its children
    #[error("unexpected child metadata {path}: not a declared child of {parent_type}")]
    UnexpectedChildType { path: PathBuf, parent_type: String },

    /// A component that needs a composed document has none
    #[error("{full_name} ({type_name}) has no composed document")]
    MissingXml {
        full_name: String,
        type_name: String,
    },

    /// A component that needs content files has none
    #[error("expected content for {full_name} ({type_name}) next to {path}")]
    MissingContent {
        full_name: String,
        type_name: String,
        path: PathBuf,
    },

    /// Invalid replacement configuration
    #[error("replacement error: {0}")]
    Replacement(String),

    /// Static resource archive could not be read or written
    #[error("archive error for {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// Project configuration is invalid
    #[error("invalid config in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// File tree error
    #[error(transparent)]
    Fs(#[from] FsError),

    /// Ignore rules could not be loaded
    #[error(transparent)]
    Ignore(#[from] IgnoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors raised by the type registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No type matches the requested id, name or suffix
    #[error("no metadata type named '{name}'{}", format_suggestions(.suggestions))]
    TypeNotFound {
        name: String,
        suggestions: Vec<String>,
    },

    /// Registry JSON failed to deserialize
    #[error("invalid registry data in {source_name}: {message}")]
    InvalidData { source_name: String, message: String },

    /// A child id is also a top-level id, or belongs to two parents
    #[error("child type '{child}' is declared more than once (parents: {parents})")]
    DuplicateChild { child: String, parents: String },

    /// A child descriptor lacks a field the conversion needs
    #[error("child type '{child}' of '{parent}' is missing '{field}'")]
    IncompleteChild {
        parent: String,
        child: String,
        field: &'static str,
    },

    /// A preset name is not known
    #[error("unknown registry preset '{0}'")]
    UnknownPreset(String),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}
