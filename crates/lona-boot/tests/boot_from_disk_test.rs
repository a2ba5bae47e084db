// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Integration tests booting the workspace `lib/` directory from disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use lona_boot::error::BootError;
use lona_boot::platform::OsPlatform;
use lona_boot::sequence::{BOOT_SEQUENCE, Step, audit};
use lona_boot::{BootOptions, Instantiation, Runtime, Stage, boot};

fn lib_dir() -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../lib");
    std::fs::canonicalize(dir).unwrap()
}

/// Secondary instantiations leave the process environment alone, so these
/// tests can share one process.
fn options() -> BootOptions {
    BootOptions {
        warm_up: true,
        instantiation: Instantiation::Secondary,
    }
}

#[test]
fn library_boots_from_disk() {
    let lib = lib_dir();
    let mut rt = Runtime::new(OsPlatform::with_working_dir(&lib));
    let report = boot(&mut rt, &options()).unwrap();

    assert_eq!(report.stage, Some(Stage::Final));
    assert_eq!(report.warm_up.unwrap().failed, 0);
    let first = rt.manifest().snapshot().next().unwrap();
    assert_eq!(first.namespace, "lona.core");
    assert_eq!(first.path, lib.join("core/operators.lona"));
    assert_eq!(
        rt.manifest().last().unwrap().path,
        lib.join("client.lona")
    );
    assert_eq!(
        rt.eval_str("(sort [3 1 2])").unwrap().to_string(),
        "[1 2 3]"
    );
}

#[test]
fn disk_library_passes_the_order_audit() {
    let report = audit(&OsPlatform::with_working_dir(lib_dir()), BOOT_SEQUENCE);
    assert!(report.is_clean(), "{report:#?}");
    assert!(report.units.len() > BOOT_SEQUENCE.len() - 2);
}

#[test]
fn incomplete_library_stops_at_first_missing_unit() {
    let lib = lib_dir();
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir(tmp.path().join("core")).unwrap();
    std::fs::copy(
        lib.join("core/operators.lona"),
        tmp.path().join("core/operators.lona"),
    )
    .unwrap();

    let mut rt = Runtime::new(OsPlatform::with_working_dir(tmp.path()));
    let failure = boot(&mut rt, &options()).unwrap_err();

    assert_eq!(failure.index, 1);
    assert!(matches!(failure.step, Step::Unit { path: "core/scalars.lona", .. }));
    assert!(matches!(failure.error, BootError::UnreadableSource { .. }));
    assert_eq!(failure.manifest_len, 1);
    assert_eq!(rt.manifest().len(), 1);
    assert_eq!(rt.stage(), Some(Stage::Primitive));
}
