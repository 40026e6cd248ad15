//! Ignore rules value object
//!
//! Loads `.forceignore` patterns using gitignore semantics and answers
//! `accepts`/`denies` for paths considered during resolution and conversion.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Name of the ignore file at the project root
pub const IGNORE_FILE_NAME: &str = ".forceignore";

/// Maximum file size for `.forceignore` (64KB)
const MAX_FILE_SIZE: u64 = 65536;

/// Maximum number of patterns allowed
const MAX_PATTERNS: usize = 1000;

/// Patterns that always apply, before any user pattern
const DEFAULT_PATTERNS: &[&str] = &[
    "**/*.dup",
    "**/.*",
    "**/package2-descriptor.json",
    "**/package2-manifest.json",
];

/// Ignore rules rooted at a project directory.
///
/// Uses the `ignore` crate for gitignore-compatible pattern matching.
#[derive(Debug)]
pub struct ForceIgnore {
    root: PathBuf,
    matcher: Gitignore,
    pattern_count: usize,
}

impl Default for ForceIgnore {
    fn default() -> Self {
        Self::defaults(Path::new(""))
    }
}

impl ForceIgnore {
    /// Only the built-in patterns.
    pub fn defaults(root: &Path) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in DEFAULT_PATTERNS {
            let _ = builder.add_line(None, pattern);
        }
        let matcher = builder.build().unwrap_or_else(|_| Gitignore::empty());
        Self {
            root: root.to_path_buf(),
            matcher,
            pattern_count: 0,
        }
    }

    /// Load `.forceignore` from the project root.
    ///
    /// Returns the defaults if the file doesn't exist.
    /// Returns `Err` if the file is too large, has too many patterns, or contains invalid syntax.
    pub fn load(project_root: &Path) -> Result<Self, IgnoreError> {
        let ignore_path = project_root.join(IGNORE_FILE_NAME);

        if !ignore_path.exists() {
            return Ok(Self::defaults(project_root));
        }

        let metadata = fs::metadata(&ignore_path).map_err(IgnoreError::Io)?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(IgnoreError::FileTooLarge {
                path: ignore_path,
                size: metadata.len(),
                limit: MAX_FILE_SIZE,
            });
        }

        let content = fs::read_to_string(&ignore_path).map_err(IgnoreError::Io)?;
        Self::from_content(project_root, &ignore_path, &content)
    }

    /// Parse patterns from string content, on top of the defaults.
    pub fn from_content(
        root: &Path,
        source_path: &Path,
        content: &str,
    ) -> Result<Self, IgnoreError> {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in DEFAULT_PATTERNS {
            builder
                .add_line(None, pattern)
                .map_err(|e| IgnoreError::BuildFailed(e.to_string()))?;
        }

        let mut pattern_count = 0;
        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            pattern_count += 1;
            if pattern_count > MAX_PATTERNS {
                return Err(IgnoreError::TooManyPatterns {
                    path: source_path.to_path_buf(),
                    count: pattern_count,
                    limit: MAX_PATTERNS,
                });
            }

            if let Err(e) = builder.add_line(Some(source_path.to_path_buf()), trimmed) {
                return Err(IgnoreError::InvalidPattern {
                    path: source_path.to_path_buf(),
                    line: line_num + 1,
                    pattern: line.to_string(),
                    message: e.to_string(),
                });
            }
        }

        let matcher = builder
            .build()
            .map_err(|e| IgnoreError::BuildFailed(e.to_string()))?;

        Ok(Self {
            root: root.to_path_buf(),
            matcher,
            pattern_count,
        })
    }

    /// Whether a path (file or directory) is excluded.
    pub fn denies(&self, path: &Path) -> bool {
        let relative = self.relativize(path);
        if relative.as_os_str().is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(&relative, false)
            .is_ignore()
    }

    /// Inverse of [`denies`](Self::denies).
    pub fn accepts(&self, path: &Path) -> bool {
        !self.denies(path)
    }

    /// Number of user patterns loaded (defaults excluded).
    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    // The matcher panics on paths outside its root, so anything that is not
    // under the root is matched by its normal components only.
    fn relativize(&self, path: &Path) -> PathBuf {
        let stripped = path.strip_prefix(&self.root).unwrap_or(path);
        stripped
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect()
    }
}

/// Errors that can occur when loading ignore rules.
#[derive(Debug)]
pub enum IgnoreError {
    /// The `.forceignore` file exceeds the size limit.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },
    /// Too many patterns in the file.
    TooManyPatterns {
        path: PathBuf,
        count: usize,
        limit: usize,
    },
    /// A pattern has invalid syntax.
    InvalidPattern {
        path: PathBuf,
        line: usize,
        pattern: String,
        message: String,
    },
    /// Failed to build the gitignore matcher.
    BuildFailed(String),
    /// IO error reading the file.
    Io(std::io::Error),
}

impl fmt::Display for IgnoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileTooLarge { path, size, limit } => {
                write!(
                    f,
                    ".forceignore exceeds {}KB limit ({} bytes): {}",
                    limit / 1024,
                    size,
                    path.display()
                )
            }
            Self::TooManyPatterns { path, count, limit } => {
                write!(
                    f,
                    ".forceignore has {} patterns, exceeds {} limit: {}",
                    count,
                    limit,
                    path.display()
                )
            }
            Self::InvalidPattern {
                path,
                line,
                pattern,
                message,
            } => {
                write!(
                    f,
                    "Invalid pattern at {}:{}: '{}' - {}",
                    path.display(),
                    line,
                    pattern,
                    message
                )
            }
            Self::BuildFailed(msg) => write!(f, "Failed to build ignore matcher: {}", msg),
            Self::Io(e) => write!(f, "IO error reading .forceignore: {}", e),
        }
    }
}

impl std::error::Error for IgnoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}
