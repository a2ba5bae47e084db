// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # Lona boot
//!
//! Staged bootstrap loader for the Lonala standard library.
//!
//! This crate provides:
//! - Reader and tree-walking evaluator for library units
//! - The inclusion primitive in its three stages, behind a single slot
//! - The load manifest of completed inclusions
//! - The fixed bootstrap sequence, its warm-up and a static order audit
//! - Process-wide initialization run once the library is live
//! - Platform bridges for the host OS, an embedded tar archive and tests
//!
//! Everything runs on one thread. Inclusion is not reentrant across
//! threads and the stage-two current-path cell assumes sequential loading.

pub mod bridge;
pub mod error;
pub mod eval;
pub mod include;
pub mod init;
pub mod intrinsics;
pub mod loader;
pub mod manifest;
pub mod platform;
pub mod reader;
pub mod runtime;
pub mod sequence;
pub mod value;

// Re-export commonly used types at crate root
pub use error::{BootError, StageError};
pub use include::{Mapper, Stage};
pub use init::{InitOutcome, Instantiation};
pub use manifest::{LoadManifest, ManifestEntry};
pub use runtime::{PRIMARY_NAMESPACE, Runtime};
pub use sequence::{BOOT_SEQUENCE, BootFailure, BootOptions, BootReport, boot};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
