//! External service registration transformer
//!
//! The inline `schema` element is moved to its own file next to the source
//! document, and put back when converting to metadata.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::entities::{
    strip_namespace, SourceComponent, TransformerStrategy, WriteInstruction, WriteSource,
    META_XML_SUFFIX,
};
use crate::domain::ports::MetadataTransformer;
use crate::domain::services::paths::with_default_directory;
use crate::domain::services::ConvertContext;
use crate::domain::value_objects::TargetFormat;
use crate::error::{MetaformError, MetaformResult};
use crate::xml::{with_namespace, XmlObject, XmlValue};

const SCHEMA_ELEMENT: &str = "schema";
const SCHEMA_EXTENSION_ELEMENT: &str = "schemaUploadFileExtension";
const DEFAULT_SCHEMA_EXTENSION: &str = "yaml";

#[derive(Debug, Default, Clone)]
pub struct ExternalServiceTransformer {
    default_directory: Option<PathBuf>,
}

impl ExternalServiceTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_directory(mut self, default_directory: Option<PathBuf>) -> Self {
        self.default_directory = default_directory;
        self
    }

    fn body(component: &SourceComponent) -> MetaformResult<XmlObject> {
        let doc = component
            .parse_xml()?
            .ok_or_else(|| MetaformError::MissingXml {
                full_name: component.full_name(),
                type_name: component.ty.name.clone(),
            })?;
        Ok(doc
            .get(&component.ty.name)
            .cloned()
            .map(|value| strip_namespace(value.into_object()))
            .unwrap_or_default())
    }

    fn schema_extension(body: &XmlObject) -> String {
        body.get(SCHEMA_EXTENSION_ELEMENT)
            .and_then(XmlValue::as_text)
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_SCHEMA_EXTENSION)
            .to_string()
    }

    fn type_directory(component: &SourceComponent, format: TargetFormat) -> PathBuf {
        PathBuf::from(format.package_root()).join(&component.ty.directory_name)
    }

    fn suffix(component: &SourceComponent) -> &str {
        component.ty.suffix.as_deref().unwrap_or(&component.ty.id)
    }
}

impl MetadataTransformer for ExternalServiceTransformer {
    fn strategy(&self) -> TransformerStrategy {
        TransformerStrategy::DecomposedExternalServiceRegistration
    }

    fn to_metadata_format(
        &self,
        component: &SourceComponent,
        _context: &mut ConvertContext,
    ) -> MetaformResult<Vec<WriteInstruction>> {
        let mut body = Self::body(component)?;
        if let Some(xml) = component.xml.as_deref() {
            let schema = xml
                .parent()
                .unwrap_or(Path::new(""))
                .join(format!("{}.{}", component.name, Self::schema_extension(&body)));
            if component.tree().exists(&schema) {
                let bytes = component.read_source(&schema)?;
                body.insert(
                    SCHEMA_ELEMENT.to_string(),
                    XmlValue::text(String::from_utf8_lossy(&bytes).into_owned()),
                );
            } else {
                debug!(schema = %schema.display(), "no schema file next to the registration");
            }
        }
        let output = Self::type_directory(component, TargetFormat::Metadata)
            .join(format!("{}.{}", component.name, Self::suffix(component)));
        Ok(vec![WriteInstruction::xml(
            output,
            with_namespace(&component.ty.name, body),
        )])
    }

    fn to_source_format(
        &self,
        component: &SourceComponent,
        merge_with: Option<&SourceComponent>,
        _context: &mut ConvertContext,
    ) -> MetaformResult<Vec<WriteInstruction>> {
        let mut body = Self::body(component)?;
        let xml_output = match merge_with.and_then(|m| m.xml.clone()) {
            Some(existing) => existing,
            None => with_default_directory(
                self.default_directory.as_deref(),
                Self::type_directory(component, TargetFormat::Source).join(format!(
                    "{}.{}{}",
                    component.name,
                    Self::suffix(component),
                    META_XML_SUFFIX
                )),
            ),
        };

        let mut writes = Vec::new();
        let schema = body
            .shift_remove(SCHEMA_ELEMENT)
            .and_then(|value| value.as_text().map(str::to_string));
        if let Some(schema) = schema.filter(|s| !s.is_empty()) {
            let output = xml_output
                .parent()
                .unwrap_or(Path::new(""))
                .join(format!("{}.{}", component.name, Self::schema_extension(&body)));
            writes.push(WriteInstruction::write(
                output,
                WriteSource::Bytes(schema.into_bytes()),
            ));
        }
        writes.push(WriteInstruction::xml(
            xml_output,
            with_namespace(&component.ty.name, body),
        ));
        Ok(writes)
    }
}
