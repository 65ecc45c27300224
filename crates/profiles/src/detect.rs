//! Profile detection from marker files
//!
//! Detection never fails: anything that cannot be read counts as absent.

use crate::profile::{Marker, PROFILES, ProfileId};
use repokit_core::file_scanner::FileScanner;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Read-only view of a project used by marker predicates
pub trait ProjectView {
    /// Whether the project root directly contains a file with this name
    fn has_file(&self, name: &str) -> bool;

    /// Whether the project root directly contains a file with this extension
    fn has_extension(&self, ext: &str) -> bool;

    /// Whether any file below the root has one of these extensions
    fn has_nested_extension(&self, exts: &[&str]) -> bool;
}

/// Evaluate one predicate
pub fn marker_holds(view: &impl ProjectView, marker: &Marker) -> bool {
    match marker {
        Marker::File(name) => view.has_file(name),
        Marker::Extension(ext) => view.has_extension(ext),
        Marker::NestedExtension(exts) => view.has_nested_extension(exts),
    }
}

/// Every profile with at least one matching marker
pub fn detect_profiles(view: &impl ProjectView) -> BTreeSet<ProfileId> {
    PROFILES
        .iter()
        .filter(|spec| spec.markers.iter().any(|m| marker_holds(view, m)))
        .map(|spec| spec.id)
        .collect()
}

/// Project view backed by the real filesystem
///
/// The root listing is read once at construction; the recursive search walks
/// the tree on demand, hidden directories included, skipping `.git` and
/// excluded globs.
#[derive(Debug, Clone)]
pub struct FsProject {
    root: PathBuf,
    files: BTreeSet<String>,
    exclude: Vec<String>,
}

impl FsProject {
    pub fn scan(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let files = list_root_files(&root);
        tracing::trace!(root = %root.display(), count = files.len(), "Read root listing");
        Self {
            root,
            files,
            exclude: Vec::new(),
        }
    }

    /// Directory globs skipped by [`ProjectView::has_nested_extension`]
    pub fn with_exclude(mut self, patterns: &[String]) -> Self {
        self.exclude = patterns.to_vec();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn list_root_files(root: &Path) -> BTreeSet<String> {
    let Ok(entries) = fs::read_dir(root) else {
        return BTreeSet::new();
    };

    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().to_str().map(String::from))
        .collect()
}

fn has_extension_in<'a>(mut names: impl Iterator<Item = &'a str>, ext: &str) -> bool {
    names.any(|name| {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == ext)
    })
}

impl ProjectView for FsProject {
    fn has_file(&self, name: &str) -> bool {
        self.files.contains(name)
    }

    fn has_extension(&self, ext: &str) -> bool {
        has_extension_in(self.files.iter().map(String::as_str), ext)
    }

    fn has_nested_extension(&self, exts: &[&str]) -> bool {
        let found = FileScanner::new(&self.root)
            .with_extensions(exts)
            .include_hidden(true)
            .exclude(&self.exclude)
            .find_first();
        if let Some(path) = &found {
            tracing::debug!(path = %path.display(), "Nested marker found");
        }
        found.is_some()
    }
}

/// In-memory project listing of `/`-separated relative file paths
#[derive(Debug, Clone, Default)]
pub struct StaticProject {
    paths: Vec<String>,
}

impl StaticProject {
    pub fn new<S: AsRef<str>>(paths: &[S]) -> Self {
        Self {
            paths: paths.iter().map(|p| p.as_ref().to_string()).collect(),
        }
    }

    fn root_files(&self) -> impl Iterator<Item = &str> {
        self.paths
            .iter()
            .map(String::as_str)
            .filter(|p| !p.contains('/'))
    }
}

impl ProjectView for StaticProject {
    fn has_file(&self, name: &str) -> bool {
        self.root_files().any(|p| p == name)
    }

    fn has_extension(&self, ext: &str) -> bool {
        has_extension_in(self.root_files(), ext)
    }

    fn has_nested_extension(&self, exts: &[&str]) -> bool {
        exts.iter()
            .any(|ext| has_extension_in(self.paths.iter().map(String::as_str), ext))
    }
}
