use std::{
    collections::{HashSet, VecDeque},
    fs,
    path::{Path, PathBuf},
};

use crate::{NamedObject, Registry};

/// Options for scanning a directory tree with [`Registry::load_from_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Only files whose name ends with this suffix are parsed.
    pub extension: String,
    /// Descend into symbolically linked directories. Linked files are read
    /// either way.
    pub follow_links: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            extension: ".cfg".into(),
            follow_links: true,
        }
    }
}

impl LoadOptions {
    /// Sets the file name suffix to look for.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets whether linked directories are descended into.
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }
}

/// Lazily yields the objects found in a file or a directory tree.
///
/// Files are parsed one at a time, as the iterator is advanced. A directory
/// is scanned top-down: its matching files first, then each subdirectory,
/// with entries visited in name order. Unreadable directories and files are
/// logged and skipped. A directory reached twice through links is only
/// scanned once.
#[derive(Debug)]
pub struct ObjectIter<'r> {
    registry: &'r Registry,
    tag: String,
    options: LoadOptions,
    dirs: Vec<PathBuf>,
    files: VecDeque<PathBuf>,
    visited: HashSet<PathBuf>,
    pending: std::vec::IntoIter<NamedObject>,
}

impl<'r> ObjectIter<'r> {
    pub(crate) fn new(registry: &'r Registry, path: &Path, tag: String, options: LoadOptions) -> Self {
        let mut iter = ObjectIter {
            registry,
            tag,
            options,
            dirs: Vec::new(),
            files: VecDeque::new(),
            visited: HashSet::new(),
            pending: Vec::new().into_iter(),
        };
        if path.is_file() {
            iter.files.push_back(path.to_path_buf());
        } else if path.is_dir() {
            iter.dirs.push(path.to_path_buf());
        } else {
            tracing::warn!(path = %path.display(), "No such file or directory");
        }
        iter
    }

    fn scan(&mut self, dir: &Path) {
        if let Ok(canonical) = fs::canonicalize(dir) {
            if !self.visited.insert(canonical) {
                tracing::debug!(path = %dir.display(), "Directory already scanned");
                return;
            }
        }
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(path = %dir.display(), error = %err, "Unable to read directory");
                return;
            }
        };
        let mut entries = entries.filter_map(Result::ok).collect::<Vec<_>>();
        entries.sort_by_key(|entry| entry.file_name());

        let mut subdirs = Vec::new();
        for entry in entries {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let (is_dir, is_file) = if file_type.is_symlink() {
                match fs::metadata(&path) {
                    Ok(meta) => (meta.is_dir() && self.options.follow_links, meta.is_file()),
                    Err(_) => (false, false),
                }
            } else {
                (file_type.is_dir(), file_type.is_file())
            };
            if is_dir {
                subdirs.push(path);
            } else if is_file
                && entry
                    .file_name()
                    .to_string_lossy()
                    .ends_with(self.options.extension.as_str())
            {
                self.files.push_back(path);
            }
        }
        self.dirs.extend(subdirs.into_iter().rev());
    }
}

impl Iterator for ObjectIter<'_> {
    type Item = NamedObject;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(obj) = self.pending.next() {
                return Some(obj);
            }
            if let Some(file) = self.files.pop_front() {
                self.pending = self.registry.load_from_file(&file, &self.tag).into_iter();
                continue;
            }
            let dir = self.dirs.pop()?;
            self.scan(&dir);
        }
    }
}
