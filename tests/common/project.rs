//! Isolated project directory with helpers to resolve, convert and run the CLI.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

use metaform::application::{ConvertOptions, ConvertResult, MetadataConverter, OutputConfig};
use metaform::domain::entities::{Registry, SourceComponent};
use metaform::domain::services::MetadataResolver;
use metaform::domain::value_objects::TargetFormat;
use metaform::infrastructure::{default_registry, LocalTree};
use metaform::xml::{parse_xml, XmlObject, XmlValue};

/// Result of running the metaform binary
#[derive(Debug)]
pub struct CliResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

pub struct TestProject {
    pub dir: TempDir,
    /// Canonical root, so paths compare equal with what the resolver walks
    pub root: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        // The default `.tmp` prefix would match the built-in `**/.*` ignore rule
        let dir = tempfile::Builder::new().prefix("metaform").tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        Self { dir, root }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read {}: {}\nfiles:\n{}", relative, e, self.files().join("\n")))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// Every file below `relative`, as paths relative to it, sorted
    pub fn files_under(&self, relative: &str) -> Vec<String> {
        let base = self.path(relative);
        let mut files = Vec::new();
        collect(&base, &base, &mut files);
        files.sort();
        files
    }

    pub fn files(&self) -> Vec<String> {
        self.files_under("")
    }

    pub fn resolve(&self, registry: &Arc<Registry>, relative: &str) -> Vec<SourceComponent> {
        MetadataResolver::new(Arc::clone(registry), Arc::new(LocalTree::new()))
            .components_from_path(&self.path(relative))
            .unwrap()
    }

    /// Convert everything under `from` into a fresh directory `to`
    pub fn convert_dir(&self, from: &str, to: &str, format: TargetFormat) -> ConvertResult {
        let registry = Arc::new(default_registry().unwrap());
        self.convert_dir_with(&registry, from, to, format)
    }

    pub fn convert_dir_with(
        &self,
        registry: &Arc<Registry>,
        from: &str,
        to: &str,
        format: TargetFormat,
    ) -> ConvertResult {
        let components = self.resolve(registry, from);
        let options = ConvertOptions::new(format, OutputConfig::directory(self.path(to)));
        MetadataConverter::new(Arc::clone(registry))
            .convert(components, &options)
            .unwrap()
    }

    /// Convert `from` into source format, merging into the components under `project`
    pub fn merge_into(
        &self,
        registry: &Arc<Registry>,
        from: &str,
        project: &str,
        default_directory: &str,
    ) -> ConvertResult {
        let components = self.resolve(registry, from);
        let output = OutputConfig::Merge {
            merge_with: self.resolve(registry, project),
            default_directory: self.path(default_directory),
            project_root: Some(self.path(project)),
        };
        MetadataConverter::new(Arc::clone(registry))
            .convert(components, &ConvertOptions::new(TargetFormat::Source, output))
            .unwrap()
    }

    pub fn parse(&self, relative: &str) -> XmlObject {
        parse_xml(self.read(relative).as_bytes())
            .unwrap_or_else(|e| panic!("cannot parse {}: {}", relative, e))
    }

    pub fn run(&self, args: &[&str]) -> CliResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> CliResult {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_metaform"));
        cmd.current_dir(&self.root).args(args).env_remove("METAFORM_LOG");
        for (key, value) in env {
            cmd.env(key, value);
        }
        let output = cmd.output().expect("failed to execute metaform");
        CliResult {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

fn collect(base: &Path, dir: &Path, files: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(base, &path, files);
        } else if let Ok(relative) = path.strip_prefix(base) {
            files.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
}

/// Root body of a parsed document
pub fn body<'a>(doc: &'a XmlObject, root: &str) -> &'a XmlObject {
    doc[root]
        .as_object()
        .unwrap_or_else(|| panic!("{root} is not an element"))
}

/// Values of `element` inside every entry of `group`, in document order
pub fn names(body: &XmlObject, group: &str, element: &str) -> Vec<String> {
    body.get(group)
        .map(|value| {
            value
                .as_list()
                .into_iter()
                .filter_map(XmlValue::as_object)
                .filter_map(|entry| entry.get(element).and_then(XmlValue::as_text))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
