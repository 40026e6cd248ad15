//! Static resource transformer
//!
//! In metadata format the resource body is a single `.resource` file. Archive
//! content types are expanded into a directory in source format and zipped
//! back when converting to metadata; every other body is one file whose
//! extension follows the MIME type.

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::TransformOptions;
use crate::domain::entities::{SourceComponent, TransformerStrategy, WriteInstruction, WriteSource};
use crate::domain::ports::MetadataTransformer;
use crate::domain::services::paths::{relative_directory, xml_destination};
use crate::domain::services::ConvertContext;
use crate::domain::value_objects::TargetFormat;
use crate::error::{MetaformError, MetaformResult};
use crate::xml::XmlValue;

const RESOURCE_EXTENSION: &str = "resource";

/// Content types stored as archives
const ARCHIVE_MIME_TYPES: &[&str] = &[
    "application/zip",
    "application/x-zip-compressed",
    "application/jar",
];

const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("application/javascript", "js"),
    ("application/json", "json"),
    ("application/octet-stream", "bin"),
    ("application/pdf", "pdf"),
    ("application/xml", "xml"),
    ("image/gif", "gif"),
    ("image/jpeg", "jpeg"),
    ("image/png", "png"),
    ("image/svg+xml", "svg"),
    ("text/css", "css"),
    ("text/csv", "csv"),
    ("text/html", "html"),
    ("text/javascript", "js"),
    ("text/plain", "txt"),
    ("text/xml", "xml"),
];

const FALLBACK_EXTENSION: &str = "bin";

/// Bytes inspected when sniffing for text
const TEXT_SAMPLE: usize = 8192;

#[derive(Debug, Clone)]
pub struct StaticResourceTransformer {
    options: TransformOptions,
}

/// Extension for a non-archive body of `content_type`
pub fn extension_for(content_type: &str) -> &'static str {
    let content_type = content_type.trim().to_ascii_lowercase();
    MIME_EXTENSIONS
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
        .unwrap_or(FALLBACK_EXTENSION)
}

pub fn is_archive(content_type: &str) -> bool {
    let content_type = content_type.trim().to_ascii_lowercase();
    ARCHIVE_MIME_TYPES.contains(&content_type.as_str())
}

/// No NUL bytes and few control characters in the first few kilobytes
fn looks_like_text(data: &[u8]) -> bool {
    if data.is_empty() {
        return true;
    }
    let sample = &data[..data.len().min(TEXT_SAMPLE)];
    if sample.contains(&0) {
        return false;
    }
    let control = sample
        .iter()
        .filter(|&&b| b < 32 && b != b'\n' && b != b'\r' && b != b'\t')
        .count();
    control < sample.len() / 10 + 1
}

impl StaticResourceTransformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    fn content_type(component: &SourceComponent) -> MetaformResult<Option<String>> {
        let Some(doc) = component.parse_xml()? else {
            return Ok(None);
        };
        Ok(doc
            .get(&component.ty.name)
            .and_then(XmlValue::as_object)
            .and_then(|body| body.get("contentType"))
            .and_then(XmlValue::as_text)
            .map(str::to_string))
    }

    /// Raw file bytes, with replacements applied to text files only
    fn read_for_archive(&self, component: &SourceComponent, path: &Path) -> MetaformResult<Vec<u8>> {
        let bytes = component.tree().read_file(path)?;
        match component.replacements() {
            Some(set) if set.applies_to(path) && looks_like_text(&bytes) => {
                Ok(set.apply(path, bytes.as_slice())?)
            }
            _ => Ok(bytes),
        }
    }

    fn zip_directory(&self, component: &SourceComponent, dir: &Path) -> MetaformResult<Vec<u8>> {
        let archive_error = |message: String| MetaformError::Archive {
            path: dir.to_path_buf(),
            message,
        };
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for file in component.walk_content()? {
            let relative = file.strip_prefix(dir).unwrap_or(&file);
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            trace!(entry = %name, "adding archive entry");
            let bytes = self.read_for_archive(component, &file)?;
            writer
                .start_file(name, options)
                .map_err(|e| archive_error(e.to_string()))?;
            writer.write_all(&bytes)?;
        }
        let cursor = writer.finish().map_err(|e| archive_error(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    fn expand(
        &self,
        component: &SourceComponent,
        archive_path: &Path,
        destination: &Path,
    ) -> MetaformResult<Vec<WriteInstruction>> {
        let archive_error = |message: String| MetaformError::Archive {
            path: archive_path.to_path_buf(),
            message,
        };
        let bytes = component.tree().read_file(archive_path)?;
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| archive_error(e.to_string()))?;

        let mut writes = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| archive_error(e.to_string()))?;
            if entry.is_dir() {
                continue;
            }
            let Some(relative) = entry.enclosed_name() else {
                debug!(entry = %entry.name(), "skipping archive entry outside the archive root");
                continue;
            };
            let output = destination.join(relative);
            if component.force_ignore().denies(&output) {
                continue;
            }
            let mut content = Vec::new();
            entry.read_to_end(&mut content)?;
            writes.push(WriteInstruction::write(output, WriteSource::Bytes(content)));
        }
        Ok(writes)
    }
}

impl MetadataTransformer for StaticResourceTransformer {
    fn strategy(&self) -> TransformerStrategy {
        TransformerStrategy::StaticResource
    }

    fn to_metadata_format(
        &self,
        component: &SourceComponent,
        _context: &mut ConvertContext,
    ) -> MetaformResult<Vec<WriteInstruction>> {
        let mut writes = Vec::new();
        if let Some(content) = component.content.as_deref() {
            let output = relative_directory(component, TargetFormat::Metadata)
                .join(format!("{}.{}", component.name, RESOURCE_EXTENSION));
            let source = if component.tree().is_directory(content) {
                WriteSource::Bytes(self.zip_directory(component, content)?)
            } else {
                WriteSource::copy_of(component, content)
            };
            writes.push(WriteInstruction::write(output, source));
        }
        if let (Some(xml), Some(output)) = (
            component.xml.as_deref(),
            xml_destination(component, TargetFormat::Metadata, None),
        ) {
            writes.push(WriteInstruction::write(output, WriteSource::copy_of(component, xml)));
        }
        Ok(writes)
    }

    fn to_source_format(
        &self,
        component: &SourceComponent,
        merge_with: Option<&SourceComponent>,
        _context: &mut ConvertContext,
    ) -> MetaformResult<Vec<WriteInstruction>> {
        let mut writes = Vec::new();
        if let Some(content) = component.content.as_deref() {
            let content_type = Self::content_type(component)?.unwrap_or_default();
            let merge_content = merge_with.and_then(|m| m.content.clone());
            let base = self
                .options
                .default_directory()
                .map(Path::to_path_buf)
                .unwrap_or_default()
                .join(relative_directory(component, TargetFormat::Source));

            if is_archive(&content_type) {
                let destination = merge_content.unwrap_or_else(|| base.join(&component.name));
                writes.extend(self.expand(component, content, &destination)?);
            } else {
                let destination: PathBuf = merge_content.unwrap_or_else(|| {
                    base.join(format!("{}.{}", component.name, extension_for(&content_type)))
                });
                writes.push(WriteInstruction::write(
                    destination,
                    WriteSource::copy_of(component, content),
                ));
            }
        }
        if let (Some(xml), Some(output)) = (
            component.xml.as_deref(),
            xml_destination(component, TargetFormat::Source, merge_with),
        ) {
            writes.push(WriteInstruction::write(output, WriteSource::copy_of(component, xml)));
        }
        Ok(writes)
    }
}
