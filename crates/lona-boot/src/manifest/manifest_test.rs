// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the load manifest.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use proptest::prelude::*;

use super::*;

#[test]
fn starts_empty() {
    let m = LoadManifest::new();
    assert!(m.is_empty());
    assert!(m.last().is_none());
    assert_eq!(m.snapshot().count(), 0);
}

#[test]
fn duplicates_are_kept() {
    let mut m = LoadManifest::new();
    m.record("lona.core", Path::new("/lib/a.lona"));
    m.record("lona.core", Path::new("/lib/a.lona"));
    m.record("lona.core.Sort", Path::new("/lib/a.lona"));
    assert_eq!(m.len(), 3);
    assert_eq!(
        m.namespaces_for(Path::new("/lib/a.lona")),
        ["lona.core", "lona.core", "lona.core.Sort"]
    );
    assert_eq!(m.files_for("lona.core").len(), 2);
}

#[test]
fn reverse_maps() {
    let mut m = LoadManifest::new();
    m.record("a", Path::new("/x/1.lona"));
    m.record("b", Path::new("/x/2.lona"));
    m.record("a", Path::new("/x/3.lona"));
    assert_eq!(
        m.files_for("a"),
        [Path::new("/x/1.lona"), Path::new("/x/3.lona")]
    );
    assert!(m.files_for("c").is_empty());
    assert_eq!(m.namespaces_for(Path::new("/x/2.lona")), ["b"]);
}

#[test]
fn snapshot_reflects_state_at_call_time() {
    let mut m = LoadManifest::new();
    m.record("a", Path::new("/1"));
    let before: Vec<_> = m.snapshot().cloned().collect();
    m.record("a", Path::new("/2"));
    assert_eq!(before.len(), 1);
    assert_eq!(m.snapshot().count(), 2);
}

#[test]
fn entries_serialize_as_json_array() {
    let mut m = LoadManifest::new();
    m.record("lona.core", Path::new("/lona/lib/core/operators.lona"));
    let json = serde_json::to_string(&m).unwrap();
    assert_eq!(
        json,
        r#"[{"namespace":"lona.core","path":"/lona/lib/core/operators.lona"}]"#
    );
}

#[test]
fn entry_text_form_is_tab_separated() {
    let mut m = LoadManifest::new();
    m.record("lona.core", Path::new("/lib/a.lona"));
    assert_eq!(m.last().unwrap().to_string(), "lona.core\t/lib/a.lona");
}

proptest! {
    #[test]
    fn record_preserves_order_and_count(
        entries in proptest::collection::vec(("[a-c]", "/[a-c]{1,3}"), 0..40)
    ) {
        let mut m = LoadManifest::new();
        for (ns, path) in &entries {
            m.record(ns, Path::new(path));
        }
        prop_assert_eq!(m.len(), entries.len());
        for (entry, (ns, path)) in m.snapshot().zip(&entries) {
            prop_assert_eq!(&entry.namespace, ns);
            prop_assert_eq!(&entry.path, Path::new(path));
        }
    }
}
