// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for lexical path resolution.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};

use proptest::prelude::*;

use super::path::*;

fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}

// =============================================================================
// dirname
// =============================================================================

#[test]
fn dirname_of_file() {
    assert_eq!(dirname(Path::new("/x/a.src")), p("/x"));
    assert_eq!(dirname(Path::new("/a.src")), p("/"));
}

#[test]
fn dirname_of_root_is_root() {
    assert_eq!(dirname(Path::new("/")), p("/"));
}

#[test]
fn dirname_of_bare_name_is_empty() {
    assert_eq!(dirname(Path::new("a.src")), p(""));
}

// =============================================================================
// normalize
// =============================================================================

#[test]
fn normalize_removes_dots() {
    assert_eq!(normalize(Path::new("/x/./y/../z")), p("/x/z"));
    assert_eq!(normalize(Path::new("/x/y/../../z")), p("/z"));
}

#[test]
fn normalize_stops_at_root() {
    assert_eq!(normalize(Path::new("/../../a")), p("/a"));
}

#[test]
fn normalize_keeps_leading_parent_of_relative_path() {
    assert_eq!(normalize(Path::new("../a/../b")), p("../b"));
    assert_eq!(normalize(Path::new("a/..")), p("."));
}

// =============================================================================
// resolve
// =============================================================================

#[test]
fn resolve_relative_against_base() {
    assert_eq!(resolve(Path::new("/x"), Path::new("b.src")), p("/x/b.src"));
    assert_eq!(
        resolve(Path::new("/lona/lib/numbers"), Path::new("../io/path.lona")),
        p("/lona/lib/io/path.lona")
    );
}

#[test]
fn resolve_absolute_ignores_base() {
    assert_eq!(resolve(Path::new("/x"), Path::new("/y/./c.src")), p("/y/c.src"));
}

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z]{1,6}",
        1 => Just(String::from(".")),
        1 => Just(String::from("..")),
    ]
}

proptest! {
    #[test]
    fn resolve_is_normalized_join(
        base in prop::collection::vec(segment(), 0..5),
        rel in prop::collection::vec(segment(), 1..5),
    ) {
        let base = PathBuf::from(format!("/{}", base.join("/")));
        let rel = PathBuf::from(rel.join("/"));
        prop_assert_eq!(resolve(&base, &rel), normalize(&join(&base, &rel)));
    }

    #[test]
    fn normalize_is_idempotent(parts in prop::collection::vec(segment(), 0..8)) {
        let once = normalize(Path::new(&format!("/{}", parts.join("/"))));
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(once.has_root());
        prop_assert!(once.components().all(|c| !matches!(
            c,
            std::path::Component::CurDir | std::path::Component::ParentDir
        )));
    }
}
