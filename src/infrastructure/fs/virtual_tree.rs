//! In-memory file tree
//!
//! Directories are implied by the files stored below them. Cloning shares
//! the same storage.

use crate::domain::ports::{FileTree, FsError, FsResult};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default)]
pub struct VirtualTree {
    files: Arc<RwLock<BTreeMap<PathBuf, Vec<u8>>>>,
}

impl VirtualTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from `(path, contents)` pairs
    pub fn from_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<PathBuf>,
        C: Into<Vec<u8>>,
    {
        let tree = Self::new();
        for (path, content) in files {
            tree.insert(path, content);
        }
        tree
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        if let Ok(mut files) = self.files.write() {
            files.insert(path.into(), content.into());
        }
    }

    pub fn remove(&self, path: &Path) -> bool {
        self.files
            .write()
            .map(|mut files| files.remove(path).is_some())
            .unwrap_or(false)
    }

    /// Every stored file path
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files
            .read()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.read().ok()?.get(path).cloned()
    }
}

impl FileTree for VirtualTree {
    fn exists(&self, path: &Path) -> bool {
        self.get(path).is_some() || self.is_directory(path)
    }

    fn is_directory(&self, path: &Path) -> bool {
        self.files
            .read()
            .map(|files| files.keys().any(|p| p != path && p.starts_with(path)))
            .unwrap_or(false)
    }

    fn read_directory(&self, path: &Path) -> FsResult<Vec<String>> {
        let files = self
            .files
            .read()
            .map_err(|_| FsError::NotFound(path.to_path_buf()))?;
        let names: BTreeSet<String> = files
            .keys()
            .filter_map(|p| p.strip_prefix(path).ok())
            .filter_map(|rest| rest.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            return Err(FsError::NotFound(path.to_path_buf()));
        }
        Ok(names.into_iter().collect())
    }

    fn read_file(&self, path: &Path) -> FsResult<Vec<u8>> {
        match self.get(path) {
            Some(content) => Ok(content),
            None if self.is_directory(path) => Err(FsError::WrongKind(path.to_path_buf())),
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn stream(&self, path: &Path) -> FsResult<Box<dyn Read + Send + '_>> {
        Ok(Box::new(Cursor::new(self.read_file(path)?)))
    }
}
