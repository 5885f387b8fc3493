// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    /// A regular file and whether its execute bit is set.
    File { executable: bool },
    Dir(Vec<String>), // List of child names
    /// Points at another path; `canonicalize` resolves through it.
    Link(PathBuf),
}

/// In-memory filesystem for discovery tests.
///
/// Paths are used as given; tests should stick to absolute paths.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an executable file, creating parent directories implicitly.
    pub fn add_executable(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File { executable: true });
    }

    /// Add a non-executable regular file.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File { executable: false });
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        ensure_dir_entry(&mut entries, path.as_ref());
    }

    /// Add a symlink at `path` pointing to `target`.
    pub fn add_link(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Link(target.as_ref().to_path_buf()));
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(parent) = path.parent() {
            ensure_dir_entry(&mut entries, parent);
            add_child(&mut entries, parent, path);
        }
        entries.insert(path.to_path_buf(), entry);
    }

    fn resolve(&self, path: &Path) -> Option<(PathBuf, MockEntry)> {
        let entries = self.entries.lock().unwrap();
        let mut current = path.to_path_buf();
        // Bounded so a link cycle cannot hang a test.
        for _ in 0..16 {
            match entries.get(&current) {
                Some(MockEntry::Link(target)) => current = target.clone(),
                Some(entry) => return Some((current, entry.clone())),
                None => return None,
            }
        }
        None
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    if let Some(parent) = path.parent() {
        if parent != path && !parent.as_os_str().is_empty() {
            ensure_dir_entry(entries, parent);
            add_child(entries, parent, path);
        }
    }
}

fn add_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        self.resolve(path)
            .map(|(resolved, _)| resolved)
            .ok_or_else(|| anyhow!("No such file or directory: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        match self.resolve(path) {
            Some((resolved, MockEntry::Dir(children))) => {
                Ok(children.iter().map(|name| resolved.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some((_, MockEntry::File { .. })))
    }

    fn is_executable(&self, path: &Path) -> bool {
        matches!(
            self.resolve(path),
            Some((_, MockEntry::File { executable: true }))
        )
    }
}
