//! Local file tree
//!
//! Implements the FileTree port over the real disk.

use crate::domain::ports::{FileTree, FsError, FsResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// File tree backed by the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTree;

impl LocalTree {
    pub fn new() -> Self {
        Self
    }
}

impl FileTree for LocalTree {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_directory(&self, path: &Path) -> FsResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path).map_err(|e| FsError::io(path, e))? {
            let entry = entry.map_err(|e| FsError::io(path, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn read_file(&self, path: &Path) -> FsResult<Vec<u8>> {
        if path.is_dir() {
            return Err(FsError::WrongKind(path.to_path_buf()));
        }
        std::fs::read(path).map_err(|e| FsError::io(path, e))
    }

    fn stream(&self, path: &Path) -> FsResult<Box<dyn Read + Send + '_>> {
        if path.is_dir() {
            return Err(FsError::WrongKind(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|e| FsError::io(path, e))?;
        Ok(Box::new(std::io::BufReader::new(file)))
    }
}
