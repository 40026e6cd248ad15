use std::path::{Path, PathBuf};

use metaform::config::CONFIG_FILE_NAME;

/// Marker of a source-format project
const PROJECT_MANIFEST: &str = "sfdx-project.json";

/// Discover the project root directory from an invocation directory.
///
/// Heuristics (first match wins, walking upward from `start`):
/// - `metaform.toml`
/// - `sfdx-project.json`
/// - `.git/` or `.git` file (git repo root / worktree)
///
/// Falls back to `start` when no markers are found.
pub(crate) fn discover_project_root(start: &Path) -> PathBuf {
    for dir in start.ancestors() {
        if dir.join(CONFIG_FILE_NAME).is_file() || dir.join(PROJECT_MANIFEST).is_file() {
            return dir.to_path_buf();
        }
        if dir.join(".git").exists() {
            return dir.to_path_buf();
        }
    }
    start.to_path_buf()
}
