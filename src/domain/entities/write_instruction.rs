//! WriteInstruction entity - a planned file write or deletion
//!
//! Transformers and finalizers only describe output; the writer realizes it.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::component::SourceComponent;
use crate::domain::ports::FileTree;
use crate::domain::services::ReplacementSet;
use crate::error::MetaformResult;
use crate::xml::{to_xml_bytes, XmlObject};

/// Where the bytes of a write come from
#[derive(Debug, Clone)]
pub enum WriteSource {
    Bytes(Vec<u8>),
    /// Copy of a file from a tree, with optional replacements applied
    File {
        path: PathBuf,
        tree: Arc<dyn FileTree>,
        replacements: Option<Arc<ReplacementSet>>,
    },
    /// Serialized at write time
    Xml(XmlObject),
}

impl WriteSource {
    pub fn copy_of(component: &SourceComponent, path: &Path) -> Self {
        WriteSource::File {
            path: path.to_path_buf(),
            tree: Arc::clone(component.tree()),
            replacements: component.replacements().cloned(),
        }
    }

    /// Produce the bytes to write
    pub fn read(&self) -> MetaformResult<Vec<u8>> {
        match self {
            WriteSource::Bytes(bytes) => Ok(bytes.clone()),
            WriteSource::Xml(doc) => Ok(to_xml_bytes(doc)),
            WriteSource::File {
                path,
                tree,
                replacements,
            } => {
                let mut reader = tree.stream(path)?;
                match replacements {
                    Some(set) => Ok(set.apply(path, reader)?),
                    None => {
                        let mut out = Vec::new();
                        reader.read_to_end(&mut out)?;
                        Ok(out)
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum WriteInstruction {
    Write {
        output: PathBuf,
        source: WriteSource,
    },
    Delete {
        output: PathBuf,
        type_name: String,
        full_name: String,
    },
}

impl WriteInstruction {
    pub fn write(output: impl Into<PathBuf>, source: WriteSource) -> Self {
        WriteInstruction::Write {
            output: output.into(),
            source,
        }
    }

    pub fn xml(output: impl Into<PathBuf>, doc: XmlObject) -> Self {
        Self::write(output, WriteSource::Xml(doc))
    }

    pub fn delete(output: impl Into<PathBuf>, component: &SourceComponent) -> Self {
        WriteInstruction::Delete {
            output: output.into(),
            type_name: component.type_name().to_string(),
            full_name: component.full_name(),
        }
    }

    pub fn output(&self) -> &Path {
        match self {
            WriteInstruction::Write { output, .. } | WriteInstruction::Delete { output, .. } => {
                output
            }
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, WriteInstruction::Delete { .. })
    }

    /// The document of an XML write, if this is one
    pub fn as_xml(&self) -> Option<&XmlObject> {
        match self {
            WriteInstruction::Write {
                source: WriteSource::Xml(doc),
                ..
            } => Some(doc),
            _ => None,
        }
    }
}

/// Writes produced for one component
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub component: SourceComponent,
    pub writes: Vec<WriteInstruction>,
}

impl ConversionResult {
    pub fn new(component: SourceComponent, writes: Vec<WriteInstruction>) -> Self {
        Self { component, writes }
    }
}
