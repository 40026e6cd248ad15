//! Default transformer - one document plus content files, copied as they are
//!
//! Only the file names and locations change between formats.

use std::path::PathBuf;
use tracing::trace;

use crate::domain::entities::{SourceComponent, TransformerStrategy, WriteInstruction, WriteSource};
use crate::domain::ports::MetadataTransformer;
use crate::domain::services::paths::{content_destination, with_default_directory, xml_destination};
use crate::domain::services::ConvertContext;
use crate::domain::value_objects::TargetFormat;
use crate::error::MetaformResult;

#[derive(Debug, Default, Clone)]
pub struct DefaultTransformer {
    /// Prefix for new source files when merging
    default_directory: Option<PathBuf>,
}

impl DefaultTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_directory(mut self, default_directory: Option<PathBuf>) -> Self {
        self.default_directory = default_directory;
        self
    }

    fn place(&self, output: PathBuf, format: TargetFormat, merged: bool) -> PathBuf {
        match format {
            TargetFormat::Source if !merged => {
                with_default_directory(self.default_directory.as_deref(), output)
            }
            _ => output,
        }
    }

    fn copy_files(
        &self,
        component: &SourceComponent,
        format: TargetFormat,
        merge_with: Option<&SourceComponent>,
    ) -> MetaformResult<Vec<WriteInstruction>> {
        let mut writes = Vec::new();
        for file in component.walk_content()? {
            // Bundles keep their document inside the content directory
            if component.xml.as_deref() == Some(file.as_path()) {
                continue;
            }
            let merged = merge_with.is_some_and(|m| m.content.is_some());
            let output = self.place(
                content_destination(component, &file, format, merge_with),
                format,
                merged,
            );
            trace!(from = %file.display(), to = %output.display(), "copy content");
            writes.push(WriteInstruction::write(
                output,
                WriteSource::copy_of(component, &file),
            ));
        }
        if let (Some(xml), Some(output)) = (
            component.xml.as_deref(),
            xml_destination(component, format, merge_with),
        ) {
            let merged = merge_with.is_some_and(|m| m.xml.is_some());
            writes.push(WriteInstruction::write(
                self.place(output, format, merged),
                WriteSource::copy_of(component, xml),
            ));
        }
        Ok(writes)
    }
}

impl MetadataTransformer for DefaultTransformer {
    fn strategy(&self) -> TransformerStrategy {
        TransformerStrategy::Standard
    }

    fn to_metadata_format(
        &self,
        component: &SourceComponent,
        _context: &mut ConvertContext,
    ) -> MetaformResult<Vec<WriteInstruction>> {
        self.copy_files(component, TargetFormat::Metadata, None)
    }

    fn to_source_format(
        &self,
        component: &SourceComponent,
        merge_with: Option<&SourceComponent>,
        _context: &mut ConvertContext,
    ) -> MetaformResult<Vec<WriteInstruction>> {
        self.copy_files(component, TargetFormat::Source, merge_with)
    }
}
