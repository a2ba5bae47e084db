// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The load manifest: every completed inclusion, in completion order.
//!
//! Append-only and never deduplicated. The same file may appear several
//! times, into different namespaces or the same one; tooling that builds
//! reverse source maps or dependency graphs wants the full trace.

#[cfg(test)]
mod manifest_test;

use std::fmt;
use std::path::{Path, PathBuf};
use std::slice;
use std::string::String;
use std::vec::Vec;

use serde::Serialize;

/// One completed inclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Qualified name of the namespace the unit was loaded into.
    pub namespace: String,
    /// Resolved absolute path of the unit.
    pub path: PathBuf,
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.namespace, self.path.display())
    }
}

/// Ordered record of completed inclusions.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct LoadManifest {
    entries: Vec<ManifestEntry>,
}

impl LoadManifest {
    /// An empty manifest.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry.
    pub fn record(&mut self, namespace: &str, path: &Path) {
        self.entries.push(ManifestEntry {
            namespace: String::from(namespace),
            path: path.to_path_buf(),
        });
    }

    /// Number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read-only view of the entries recorded so far, oldest first.
    pub fn snapshot(&self) -> slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }

    /// The most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&ManifestEntry> {
        self.entries.last()
    }

    /// Files loaded into `namespace`, in load order, repeats included.
    #[must_use]
    pub fn files_for(&self, namespace: &str) -> Vec<&Path> {
        self.entries
            .iter()
            .filter(|e| e.namespace == namespace)
            .map(|e| e.path.as_path())
            .collect()
    }

    /// Namespaces `path` was loaded into, in load order, repeats included.
    #[must_use]
    pub fn namespaces_for(&self, path: &Path) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.path == path)
            .map(|e| e.namespace.as_str())
            .collect()
    }
}

impl<'a> IntoIterator for &'a LoadManifest {
    type Item = &'a ManifestEntry;
    type IntoIter = slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshot()
    }
}
