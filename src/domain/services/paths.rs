//! Path conventions shared by every transformer
//!
//! Destinations are computed relative to a package directory: the source
//! format places everything under `main/default`, the metadata format at the
//! package root.

use std::path::{Component, Path, PathBuf};
use tracing::warn;

use crate::domain::entities::{SourceAdapterKind, SourceComponent, META_XML_SUFFIX};
use crate::domain::value_objects::TargetFormat;

/// Sub-path of `path` starting at the first component named `part`.
///
/// With `include_part` false the matching component itself is dropped.
/// Returns `None` when no component matches.
pub fn trim_until(path: &Path, part: &str, include_part: bool) -> Option<PathBuf> {
    let components: Vec<Component<'_>> = path.components().collect();
    let index = components
        .iter()
        .position(|c| c.as_os_str() == part)?;
    let start = if include_part { index } else { index + 1 };
    Some(components[start..].iter().collect())
}

/// Path that places `path` under the component's type directory, keeping
/// everything below that directory.
fn below_type_directory(component: &SourceComponent, path: &Path) -> PathBuf {
    let dir = &component.ty.directory_name;
    trim_until(path, dir, true).unwrap_or_else(|| {
        PathBuf::from(dir).join(path.file_name().unwrap_or(path.as_os_str()))
    })
}

/// Directory a component lives in, relative to the package directory.
pub fn relative_directory(component: &SourceComponent, format: TargetFormat) -> PathBuf {
    let base = PathBuf::from(format.package_root());
    let ty = &component.ty;

    if ty.suffix.is_none() || ty.in_folder || ty.is_folder_type() {
        let anchor = component.xml.as_ref().or(component.content.as_ref());
        if let Some(anchor) = anchor {
            let trimmed = below_type_directory(component, anchor);
            return base.join(trimmed.parent().unwrap_or(Path::new("")));
        }
    }
    if format == TargetFormat::Source && ty.is_decomposed() {
        let full_name = component.full_name();
        let top = full_name.split('.').next().unwrap_or(&full_name);
        return base.join(&ty.directory_name).join(top);
    }
    base.join(&ty.directory_name)
}

/// Destination of a content file of `component`.
///
/// Files inside a content directory keep their path below that directory.
pub fn content_destination(
    component: &SourceComponent,
    source: &Path,
    format: TargetFormat,
    merge_with: Option<&SourceComponent>,
) -> PathBuf {
    let content_is_dir = component
        .content
        .as_deref()
        .is_some_and(|c| component.tree().is_directory(c));
    let below_content = component
        .content
        .as_deref()
        .and_then(|c| c.file_name())
        .and_then(|name| name.to_str())
        .and_then(|name| trim_until(source, name, true));

    if let Some(merge_content) = merge_with.and_then(|m| m.content.as_deref()) {
        return match (content_is_dir, below_content) {
            (true, Some(relative)) => merge_content
                .parent()
                .unwrap_or(Path::new(""))
                .join(relative),
            _ => merge_content.to_path_buf(),
        };
    }

    let dir = relative_directory(component, format);
    match (content_is_dir, below_content) {
        (true, Some(relative)) => dir.join(relative),
        _ => dir.join(source.file_name().unwrap_or(source.as_os_str())),
    }
}

/// Destination of the composed document of `component`.
pub fn xml_destination(
    component: &SourceComponent,
    format: TargetFormat,
    merge_with: Option<&SourceComponent>,
) -> Option<PathBuf> {
    if let Some(merge_xml) = merge_with.and_then(|m| m.xml.as_ref()) {
        return Some(merge_xml.clone());
    }
    let xml = component.xml.as_ref()?;
    let ty = &component.ty;

    if ty.adapter() == SourceAdapterKind::Bundle && component.content.is_some() {
        return Some(content_destination(component, xml, format, None));
    }

    let file_name = xml.file_name()?.to_str()?.to_string();
    let file_name = if component.content.is_none() {
        composed_file_name(&file_name, ty.suffix.as_deref(), ty.is_folder_type(), format)
    } else {
        replace_legacy_suffix(component, file_name)
    };
    Some(relative_directory(component, format).join(file_name))
}

fn composed_file_name(
    file_name: &str,
    suffix: Option<&str>,
    is_folder: bool,
    format: TargetFormat,
) -> String {
    match format {
        TargetFormat::Metadata => {
            if let (true, Some(suffix)) = (is_folder, suffix) {
                return file_name.replacen(&format!(".{}", suffix), "", 1);
            }
            if let Some(stripped) = file_name.strip_suffix(META_XML_SUFFIX) {
                return stripped.to_string();
            }
            match (suffix, file_name.rsplit_once('.')) {
                (Some(suffix), Some((stem, _))) => format!("{}.{}", stem, suffix),
                (Some(suffix), None) => format!("{}.{}", file_name, suffix),
                (None, _) => file_name.to_string(),
            }
        }
        TargetFormat::Source => {
            if let (true, Some(suffix)) = (is_folder, suffix) {
                let dotted = format!(".{}{}", suffix, META_XML_SUFFIX);
                if !file_name.ends_with(&dotted) {
                    if let Some(stem) = file_name.strip_suffix(META_XML_SUFFIX) {
                        return format!("{}{}", stem, dotted);
                    }
                }
            }
            if file_name.ends_with(META_XML_SUFFIX) {
                file_name.to_string()
            } else {
                format!("{}{}", file_name, META_XML_SUFFIX)
            }
        }
    }
}

fn replace_legacy_suffix(component: &SourceComponent, file_name: String) -> String {
    let (Some(legacy), Some(suffix)) = (&component.ty.legacy_suffix, &component.ty.suffix) else {
        return file_name;
    };
    let legacy_meta = format!(".{}{}", legacy, META_XML_SUFFIX);
    match file_name.strip_suffix(&legacy_meta) {
        Some(stem) => {
            warn!(
                file = %file_name,
                "suffix '{}' is deprecated for {}, writing '{}' instead",
                legacy,
                component.ty.name,
                suffix
            );
            format!("{}.{}{}", stem, suffix, META_XML_SUFFIX)
        }
        None => file_name,
    }
}

/// File name of a decomposed child document
pub fn child_file_name(name: &str, child_suffix: &str) -> String {
    format!("{}.{}{}", name, child_suffix, META_XML_SUFFIX)
}

/// Prefix a relative destination with the default directory when merging
pub fn with_default_directory(default_directory: Option<&Path>, relative: PathBuf) -> PathBuf {
    match default_directory {
        Some(dir) => dir.join(relative),
        None => relative,
    }
}
