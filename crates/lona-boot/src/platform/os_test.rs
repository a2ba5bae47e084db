// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the host platform.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io;

use super::*;

#[test]
fn reads_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unit.lona");
    std::fs::write(&path, "(def x 1)").unwrap();

    let platform = OsPlatform::with_working_dir(dir.path());
    assert_eq!(platform.read_file(&path).unwrap(), b"(def x 1)");
    assert_eq!(platform.working_dir(), dir.path());
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let platform = OsPlatform::with_working_dir(dir.path());
    let err = platform.read_file(&dir.path().join("absent.lona")).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}

#[test]
fn reports_at_least_one_thread() {
    let platform = OsPlatform::with_working_dir("/");
    assert!(platform.cpu_threads() >= 1);
}

#[test]
fn clock_does_not_go_backwards() {
    let platform = OsPlatform::with_working_dir("/");
    let a = platform.now_ns();
    let b = platform.now_ns();
    assert!(b >= a);
}

#[test]
fn setenv_rejects_invalid_name_before_touching_environment() {
    let mut platform = OsPlatform::with_working_dir("/");
    assert!(platform.setenv("LONA_BOOT=TEST", "1").is_err());
}

#[cfg(unix)]
#[test]
fn standard_streams_have_descriptors() {
    let platform = OsPlatform::with_working_dir("/");
    for stream in StdStream::ALL {
        assert_eq!(platform.stdio_handle(stream), Some(stream.default_fd()));
    }
}
