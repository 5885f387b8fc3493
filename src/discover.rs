// src/discover.rs

//! Plugin discovery.
//!
//! Walks every directory of a search-path string (`PATH` in production) and
//! collects executables whose file name starts with the plugin prefix.
//! Unreadable or missing directories are skipped silently; only a missing
//! search path aborts the run.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::errors::{CtxError, Result};
use crate::fs::FileSystem;

/// A discovered plugin executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute path inside a canonical search-path directory.
    pub path: PathBuf,
    /// File name, e.g. `ctx-git`.
    pub name: String,
    pub executable: bool,
}

/// Inputs to one discovery pass.
#[derive(Debug, Clone)]
pub struct DiscoveryRequest<'a> {
    /// Platform path-list string (`PATH`). `None` or empty is fatal.
    pub search_path: Option<&'a OsStr>,
    pub prefix: &'a str,
    /// The running orchestrator; never returned as a candidate.
    pub self_path: Option<&'a Path>,
}

/// Find every executable matching the prefix on the search path.
///
/// Candidates come back in search-path order, sorted by file name within a
/// directory. That order is what the aggregator uses to break name ties.
pub fn discover(fs: &dyn FileSystem, req: &DiscoveryRequest<'_>) -> Result<Vec<Candidate>> {
    let search_path = match req.search_path {
        Some(p) if !p.is_empty() => p,
        _ => return Err(CtxError::SearchPathUnset),
    };

    let self_canon = req.self_path.and_then(|p| fs.canonicalize(p).ok());

    let mut scanned: HashSet<PathBuf> = HashSet::new();
    let mut found = Vec::new();

    for dir in std::env::split_paths(search_path) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let dir = match fs.canonicalize(&dir) {
            Ok(d) => d,
            Err(err) => {
                trace!(dir = ?dir, error = %err, "skipping unresolvable search path entry");
                continue;
            }
        };
        if !scanned.insert(dir.clone()) {
            trace!(dir = ?dir, "search path entry already scanned");
            continue;
        }

        let mut entries = match fs.read_dir(&dir) {
            Ok(e) => e,
            Err(err) => {
                trace!(dir = ?dir, error = %err, "skipping unreadable directory");
                continue;
            }
        };
        entries.sort();

        for path in entries {
            if let Some(candidate) = inspect_entry(fs, &path, req.prefix, self_canon.as_deref()) {
                debug!(path = ?candidate.path, "discovered plugin");
                found.push(candidate);
            }
        }
    }

    Ok(found)
}

fn inspect_entry(
    fs: &dyn FileSystem,
    path: &Path,
    prefix: &str,
    self_canon: Option<&Path>,
) -> Option<Candidate> {
    let name = path.file_name()?.to_str()?;
    if !name.starts_with(prefix) || !fs.is_file(path) {
        return None;
    }
    if !fs.is_executable(path) {
        trace!(path = ?path, "prefix matches but file is not executable");
        return None;
    }
    if let Some(own) = self_canon {
        if fs.canonicalize(path).ok().as_deref() == Some(own) {
            debug!(path = ?path, "skipping own executable");
            return None;
        }
    }

    Some(Candidate {
        path: path.to_path_buf(),
        name: name.to_string(),
        executable: true,
    })
}
