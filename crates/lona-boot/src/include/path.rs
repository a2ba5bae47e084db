// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Lexical path operations used to resolve inclusions.
//!
//! None of these touch the filesystem: symlinks are not followed and `..`
//! simply removes the preceding component.

use std::path::{Component, Path, PathBuf};

/// Directory part of `path`. The root's directory is the root itself.
#[must_use]
pub fn dirname(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.to_path_buf(),
        None if path.has_root() => path.to_path_buf(),
        None => PathBuf::new(),
    }
}

/// Append `rel` to `base`. An absolute `rel` replaces `base`.
#[must_use]
pub fn join(base: &Path, rel: &Path) -> PathBuf {
    base.join(rel)
}

/// Remove `.` components and fold `..` into the preceding component.
///
/// `..` directly below the root is dropped; leading `..` components of a
/// relative path are kept. An empty relative result becomes `.`.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(part) => out.push(part),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// `normalize(join(base, rel))`.
#[must_use]
pub fn resolve(base: &Path, rel: &Path) -> PathBuf {
    normalize(&join(base, rel))
}
