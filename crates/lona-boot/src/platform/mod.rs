// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Platform abstraction for the bootstrap.
//!
//! The loader only touches the outside world through [`Platform`], so the
//! whole bootstrap can run against the in-memory [`MockPlatform`] in tests.

#[cfg(test)]
mod os_test;

mod archive;
mod mock;
mod os;
mod traits;

pub use archive::{ArchivePlatform, DEFAULT_MOUNT};
pub use mock::MockPlatform;
pub use os::OsPlatform;
pub use traits::{EnvError, Platform, StdStream};
