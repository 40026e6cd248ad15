use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use metaform::application::{
    build_replacements, ConvertOptions, ConvertResult, MetadataConverter, OutputConfig,
};
use metaform::config::{load_or_default, Config};
use metaform::domain::entities::{Registry, SourceComponent};
use metaform::domain::ports::FileTree;
use metaform::domain::services::MetadataResolver;
use metaform::domain::value_objects::{ForceIgnore, TargetFormat};
use metaform::infrastructure::{LocalTree, RegistryLoader};

use super::project_root::discover_project_root;
use crate::cli::ConvertArgs;

pub fn cmd_convert(args: &ConvertArgs, json: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("cannot read the current directory")?;
    let project_root = match &args.project {
        Some(project) => absolute(&cwd, project)?,
        None => absolute(&cwd, &discover_project_root(&cwd))?,
    };

    let (config, warnings) = load_or_default(args.config.as_deref(), &project_root)?;
    for warning in &warnings {
        warn!("{}", warning);
    }

    let registry = Arc::new(load_registry(&config, &project_root)?);
    let force_ignore = Arc::new(ForceIgnore::load(&project_root)?);
    let tree: Arc<dyn FileTree> = Arc::new(LocalTree::new());
    let resolver = MetadataResolver::new(Arc::clone(&registry), Arc::clone(&tree))
        .with_force_ignore(Arc::clone(&force_ignore));

    let components = resolve_all(&resolver, &cwd, &args.paths)?;
    debug!(components = components.len(), "resolved input");

    let output = if args.merge.is_empty() {
        OutputConfig::Directory {
            output_directory: args
                .output_dir
                .clone()
                .context("--output-dir or --merge is required")?,
            package_name: args.package_name.clone(),
        }
    } else {
        let default_directory = args
            .default_directory
            .clone()
            .unwrap_or_else(|| config.default_package_directory());
        OutputConfig::Merge {
            merge_with: resolve_all(&resolver, &cwd, &args.merge)?,
            default_directory: absolute_path(&project_root, &default_directory),
            project_root: Some(project_root.clone()),
        }
    };

    let replacements = match args.to {
        TargetFormat::Metadata => build_replacements(
            &config.replacements,
            &project_root,
            config.convert.chunk_size,
            |name| std::env::var(name).ok(),
        )?
        .map(Arc::new),
        TargetFormat::Source => None,
    };

    let options = ConvertOptions::new(args.to, output)
        .with_dry_run(args.dry_run)
        .with_skip_unchanged(config.convert.skip_unchanged)
        .with_replacements(replacements);
    let component_count = components.len();
    let result = MetadataConverter::new(registry).convert(components, &options)?;

    if json {
        println!("{}", serde_json::to_string(&result)?);
    } else {
        print_summary(&result, component_count, args.to, args.dry_run);
    }
    Ok(())
}

fn load_registry(config: &Config, project_root: &Path) -> Result<Registry> {
    let mut loader = RegistryLoader::new().with_presets(config.registry.presets.iter().cloned());
    if let Some(custom) = &config.registry.custom_registry {
        loader = loader.with_custom_registry(absolute_path(project_root, custom));
    }
    Ok(loader.load()?)
}

fn resolve_all(
    resolver: &MetadataResolver,
    cwd: &Path,
    paths: &[PathBuf],
) -> Result<Vec<SourceComponent>> {
    let mut components = Vec::new();
    for path in paths {
        let path = absolute(cwd, path)?;
        components.extend(
            resolver
                .components_from_path(&path)
                .with_context(|| format!("cannot resolve {}", path.display()))?,
        );
    }
    Ok(components)
}

/// Canonical absolute path, so paths found by different walks compare equal
fn absolute(cwd: &Path, path: &Path) -> Result<PathBuf> {
    let joined = absolute_path(cwd, path);
    joined
        .canonicalize()
        .with_context(|| format!("cannot access {}", joined.display()))
}

fn absolute_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn print_summary(result: &ConvertResult, components: usize, format: TargetFormat, dry_run: bool) {
    if dry_run {
        println!(
            "Dry run: {} components would produce {} {} format writes",
            components,
            result.planned.len(),
            format
        );
        for planned in &result.planned {
            let action = if planned.delete { "delete" } else { "write" };
            println!("  {} {} ({})", action, planned.output.display(), planned.component);
        }
        return;
    }

    println!("Converted {} components to {} format", components, format);
    println!("  written: {}", result.written.len());
    if !result.deleted.is_empty() {
        println!("  deleted: {}", result.deleted.len());
    }
    if !result.skipped.is_empty() {
        println!("  unchanged: {}", result.skipped.len());
    }
    for unmatched in &result.unmatched_replacements {
        println!("  warning: replacement never matched: {}", unmatched);
    }
}
