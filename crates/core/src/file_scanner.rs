//! File scanning utilities
//!
//! Provides file discovery under a project root with extension and exclude filters.
//! Unreadable entries are skipped rather than reported. The `.git` metadata
//! directory is never entered.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Version-control metadata directory, always pruned
const VCS_DIR: &str = ".git";

/// File scanner with configurable filters
pub struct FileScanner {
    root: PathBuf,
    extensions: Vec<String>,
    exclude_patterns: Vec<glob::Pattern>,
    include_hidden: bool,
}

impl FileScanner {
    /// Create a new file scanner rooted at the given path
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: Vec::new(),
            exclude_patterns: Vec::new(),
            include_hidden: false,
        }
    }

    /// Filter by file extensions (e.g., "sh", "bash", "tf")
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add glob patterns to exclude, matched against the entry name and
    /// its path relative to the root. Invalid patterns are ignored.
    pub fn exclude<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        self.exclude_patterns = patterns
            .iter()
            .filter_map(|p| glob::Pattern::new(p.as_ref()).ok())
            .collect();
        self
    }

    /// Whether to descend into hidden (dot-prefixed) directories other than `.git`
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Return the first matching file, stopping the walk as soon as one is found
    pub fn find_first(&self) -> Option<PathBuf> {
        self.walk()
            .find(|e| self.matches_extension(e.path()))
            .map(|e| e.path().to_path_buf())
    }

    fn walk(&self) -> impl Iterator<Item = DirEntry> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !(self.is_pruned(e) || self.should_exclude(e.path())))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
    }

    fn matches_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.extensions.iter().any(|e| e == ext)
    }

    fn is_pruned(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let Some(name) = entry.file_name().to_str() else {
            return false;
        };
        name == VCS_DIR || (!self.include_hidden && name.starts_with('.'))
    }

    fn should_exclude(&self, path: &Path) -> bool {
        if self.exclude_patterns.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        self.exclude_patterns
            .iter()
            .any(|pat| pat.matches(name) || pat.matches_path(relative))
    }
}
