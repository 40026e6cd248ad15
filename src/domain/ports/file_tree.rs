//! FileTree port - read-only abstraction over the tree components resolve against
//!
//! Components never touch the disk directly; they read through this trait so
//! the same conversion runs against a project directory or an in-memory tree.

use std::io::Read;
use std::path::{Path, PathBuf};

/// Result type for file tree operations
pub type FsResult<T> = Result<T, FsError>;

/// File tree operation errors
#[derive(Debug)]
pub enum FsError {
    /// File not found
    NotFound(PathBuf),
    /// Path is a directory where a file was expected (or the reverse)
    WrongKind(PathBuf),
    /// I/O error
    Io(PathBuf, std::io::Error),
}

impl FsError {
    /// Attach a path to an I/O error
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            _ => FsError::Io(path.to_path_buf(), err),
        }
    }
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsError::NotFound(path) => write!(f, "File not found: {}", path.display()),
            FsError::WrongKind(path) => {
                write!(f, "Unexpected file kind: {}", path.display())
            }
            FsError::Io(path, err) => write!(f, "I/O error on {}: {}", path.display(), err),
        }
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FsError::Io(_, err) => Some(err),
            _ => None,
        }
    }
}

/// Abstract file tree interface
///
/// Implementations:
/// - `LocalTree` - the project on disk
/// - `VirtualTree` - in-memory, for tests and synthesized merges
pub trait FileTree: std::fmt::Debug + Send + Sync {
    /// Check if a file or directory exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if the path is a directory
    fn is_directory(&self, path: &Path) -> bool;

    /// Names of the entries of a directory, sorted
    fn read_directory(&self, path: &Path) -> FsResult<Vec<String>>;

    /// Read a whole file
    fn read_file(&self, path: &Path) -> FsResult<Vec<u8>>;

    /// Open a file for streaming reads
    fn stream(&self, path: &Path) -> FsResult<Box<dyn Read + Send + '_>>;
}

/// Recursively list every file under `dir` (or `dir` itself if it is a file).
///
/// `keep_dir` decides whether a sub-directory is descended into.
pub fn walk_files(
    tree: &dyn FileTree,
    dir: &Path,
    keep_dir: &dyn Fn(&Path) -> bool,
) -> FsResult<Vec<PathBuf>> {
    if !tree.is_directory(dir) {
        return Ok(if tree.exists(dir) {
            vec![dir.to_path_buf()]
        } else {
            Vec::new()
        });
    }
    let mut files = Vec::new();
    for name in tree.read_directory(dir)? {
        let path = dir.join(&name);
        if tree.is_directory(&path) {
            if keep_dir(&path) {
                files.extend(walk_files(tree, &path, keep_dir)?);
            }
        } else {
            files.push(path);
        }
    }
    Ok(files)
}
