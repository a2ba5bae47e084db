// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Packs the workspace `lib/` directory into `lonalib.tar`.
//!
//! The archive is embedded with `include_bytes!` and served by
//! `ArchivePlatform`, so the binary boots without a checkout.

use std::path::PathBuf;
use std::process::Command;

fn main() {
    if let Err(e) = pack_library() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn pack_library() -> Result<(), String> {
    let out_dir = std::env::var("OUT_DIR").map_err(|_| "OUT_DIR not set")?;
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").map_err(|_| "CARGO_MANIFEST_DIR not set")?;
    let lib_dir = PathBuf::from(manifest_dir).join("../../lib");
    let archive = PathBuf::from(out_dir).join("lonalib.tar");

    // tar-no-std only reads plain USTAR headers
    let status = Command::new("tar")
        .arg("--format=ustar")
        .arg("-cf")
        .arg(&archive)
        .arg("-C")
        .arg(&lib_dir)
        .arg(".")
        .status()
        .map_err(|e| format!("running tar: {e}"))?;
    if !status.success() {
        return Err(format!("tar exited with {status} packing {}", lib_dir.display()));
    }

    println!("cargo::rerun-if-changed={}", lib_dir.display());
    Ok(())
}
