//! Streaming content replacement
//!
//! Literal replacements are applied while the file is read in chunks. Each
//! rule is one stage of a chain fed by the stage before it, so rules apply
//! in declaration order exactly as they do over a buffered file. A stage
//! carries its last `find.len() - 1` bytes into the next chunk so a match
//! spanning a chunk boundary is still found. A rule never rescans its own
//! output.
//!
//! As soon as one regex applies to a file the whole file is buffered and the
//! replacements run one after the other over the full text.

use globset::GlobMatcher;
use regex::NoExpand;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::value_objects::{Replacement, ReplacementMatcher};

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Which files a replacement applies to, relative to the project root
#[derive(Debug, Clone)]
pub enum FileSelector {
    Exact(PathBuf),
    Glob(GlobMatcher),
}

impl FileSelector {
    fn matches(&self, relative: &Path) -> bool {
        match self {
            FileSelector::Exact(path) => path == relative,
            FileSelector::Glob(glob) => glob.is_match(relative),
        }
    }
}

#[derive(Debug)]
pub struct ReplacementSet {
    root: PathBuf,
    chunk_size: usize,
    entries: Vec<(FileSelector, Replacement)>,
    hits: Mutex<Vec<bool>>,
}

impl ReplacementSet {
    pub fn new(root: impl Into<PathBuf>, chunk_size: usize) -> Self {
        Self {
            root: root.into(),
            chunk_size: chunk_size.max(1),
            entries: Vec::new(),
            hits: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&mut self, selector: FileSelector, replacement: Replacement) {
        self.entries.push((selector, replacement));
        self.hits_mut().push(false);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn applies_to(&self, path: &Path) -> bool {
        let relative = self.relative(path);
        self.entries.iter().any(|(s, _)| s.matches(relative))
    }

    /// Read `reader` fully, applying every replacement selected for `path`
    pub fn apply(&self, path: &Path, mut reader: impl Read) -> io::Result<Vec<u8>> {
        let relative = self.relative(path);
        let active: Vec<(usize, &Replacement)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, (s, _))| s.matches(relative))
            .map(|(i, (_, r))| (i, r))
            .collect();

        if active.is_empty() {
            let mut out = Vec::new();
            reader.read_to_end(&mut out)?;
            return Ok(out);
        }
        if active.iter().all(|(_, r)| r.matcher.is_literal()) {
            return self.stream_literals(reader, &active);
        }

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(self.replace_buffered(text, &active).into_bytes()),
            // Patterns only apply to text
            Err(e) => Ok(e.into_bytes()),
        }
    }

    /// Single-file replacements that never matched, as `"<pattern> in <file>"`
    pub fn unmatched(&self) -> Vec<String> {
        let hits = self.hits_mut();
        self.entries
            .iter()
            .zip(hits.iter())
            .filter(|(_, hit)| !**hit)
            .filter_map(|((_, r), _)| {
                let file = r.single_file.as_ref()?;
                Some(format!("{} in {}", r.matcher.source(), file.display()))
            })
            .collect()
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        if self.root.as_os_str().is_empty() {
            return path;
        }
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    fn hits_mut(&self) -> std::sync::MutexGuard<'_, Vec<bool>> {
        self.hits.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record_hit(&self, index: usize) {
        if let Some(hit) = self.hits_mut().get_mut(index) {
            *hit = true;
        }
    }

    fn stream_literals(
        &self,
        mut reader: impl Read,
        active: &[(usize, &Replacement)],
    ) -> io::Result<Vec<u8>> {
        let mut stages: Vec<LiteralStage<'_>> = active
            .iter()
            .filter_map(|(i, r)| match &r.matcher {
                ReplacementMatcher::Literal(find) if !find.is_empty() => Some(LiteralStage {
                    index: *i,
                    find: find.as_bytes(),
                    with: r.replace_with.as_bytes(),
                    pending: Vec::new(),
                }),
                _ => None,
            })
            .collect();

        let mut out = Vec::new();
        let mut chunk = vec![0u8; self.chunk_size];
        loop {
            let read = reader.read(&mut chunk)?;
            let eof = read == 0;
            let mut data = chunk[..read].to_vec();
            for stage in &mut stages {
                data = stage.feed(&data, eof, self);
            }
            out.extend_from_slice(&data);
            if eof {
                return Ok(out);
            }
        }
    }

    fn replace_buffered(&self, mut text: String, active: &[(usize, &Replacement)]) -> String {
        for (index, replacement) in active {
            let with = replacement.replace_with.as_str();
            match &replacement.matcher {
                ReplacementMatcher::Literal(find) => {
                    if !find.is_empty() && text.contains(find.as_str()) {
                        text = text.replace(find.as_str(), with);
                        self.record_hit(*index);
                    }
                }
                ReplacementMatcher::Pattern(re) => {
                    if re.is_match(&text) {
                        text = re.replace_all(&text, NoExpand(with)).into_owned();
                        self.record_hit(*index);
                    }
                }
            }
        }
        text
    }
}

/// One literal rule in the streaming chain. Each stage sees the output of
/// the stages before it and holds back `find.len() - 1` bytes between chunks.
struct LiteralStage<'a> {
    index: usize,
    find: &'a [u8],
    with: &'a [u8],
    pending: Vec<u8>,
}

impl LiteralStage<'_> {
    fn feed(&mut self, input: &[u8], eof: bool, set: &ReplacementSet) -> Vec<u8> {
        self.pending.extend_from_slice(input);
        let limit = if eof {
            self.pending.len()
        } else {
            self.pending.len().saturating_sub(self.find.len() - 1)
        };

        let mut out = Vec::with_capacity(self.pending.len());
        let mut pos = 0;
        while pos < limit {
            if self.pending[pos..].starts_with(self.find) {
                out.extend_from_slice(self.with);
                pos += self.find.len();
                set.record_hit(self.index);
            } else {
                out.push(self.pending[pos]);
                pos += 1;
            }
        }
        self.pending.drain(..pos.min(self.pending.len()));
        if eof {
            out.append(&mut self.pending);
        }
        out
    }
}
