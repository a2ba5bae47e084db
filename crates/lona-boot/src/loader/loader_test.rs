// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the loader module.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

#[test]
fn embedded_archive_loads() {
    let source = TarSource::embedded().expect("embedded archive should load");
    assert!(!source.is_empty(), "archive should contain files");
}

#[test]
fn embedded_archive_has_every_boot_unit() {
    let source = TarSource::embedded().unwrap();
    for path in crate::sequence::unit_paths() {
        assert!(source.find(path).is_some(), "missing {path}");
    }
}

#[test]
fn names_are_archive_relative() {
    let source = TarSource::embedded().unwrap();
    assert!(source.paths().all(|p| !p.starts_with("./") && !p.ends_with('/')));
    assert!(source.find("core/operators.lona").is_some());
}

#[test]
fn end_marker_alone_is_an_empty_archive() {
    // Two zero blocks terminate a tar archive
    for data in [&[0u8; 1024][..], &[0u8; 512][..], &[][..]] {
        let source = TarSource::new(data).unwrap();
        assert!(source.is_empty());
        assert_eq!(source.len(), 0);
    }
}

#[test]
fn truncated_archive_is_corrupt() {
    assert!(matches!(
        TarSource::new(&[0u8; 100]),
        Err(ArchiveError::Corrupt(_))
    ));
    assert!(matches!(
        TarSource::new(&[1u8; 700]),
        Err(ArchiveError::Corrupt(_))
    ));
}
