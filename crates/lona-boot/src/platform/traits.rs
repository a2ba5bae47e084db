// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The host primitives the bootstrap is built on.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::string::String;
use std::vec::Vec;

/// One of the three standard process streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StdStream {
    /// Standard input.
    Stdin,
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl StdStream {
    /// All streams, in descriptor order.
    pub const ALL: [Self; 3] = [Self::Stdin, Self::Stdout, Self::Stderr];

    /// Conventional descriptor number.
    #[inline]
    #[must_use]
    pub const fn default_fd(self) -> i64 {
        match self {
            Self::Stdin => 0,
            Self::Stdout => 1,
            Self::Stderr => 2,
        }
    }

    /// Name of the Lonala binding that holds this stream (`*stdout*` etc).
    #[must_use]
    pub const fn binding(self) -> &'static str {
        match self {
            Self::Stdin => "*stdin*",
            Self::Stdout => "*stdout*",
            Self::Stderr => "*stderr*",
        }
    }
}

/// Rejected environment update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// Names must be non-empty and contain neither `=` nor NUL.
    InvalidName(String),
    /// Values must not contain NUL.
    InvalidValue(String),
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "invalid environment variable name: {name:?}"),
            Self::InvalidValue(name) => write!(f, "invalid value for environment variable {name}"),
        }
    }
}

impl std::error::Error for EnvError {}

/// Native operations available before any library code has been loaded.
///
/// Everything is synchronous. Only `read_file` is expected to fail in
/// normal operation; `setenv` rejects malformed names.
pub trait Platform {
    /// Read the full contents of a file.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be opened or read.
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Directory top-level inclusions resolve against.
    fn working_dir(&self) -> PathBuf;

    /// Monotonic time in nanoseconds.
    fn now_ns(&self) -> u64;

    /// Read an environment variable.
    fn getenv(&self, name: &str) -> Option<String>;

    /// Set an environment variable.
    ///
    /// # Errors
    ///
    /// Returns `EnvError` if the name or value cannot be stored.
    fn setenv(&mut self, name: &str, value: &str) -> Result<(), EnvError>;

    /// Number of hardware threads available to the process.
    fn cpu_threads(&self) -> usize;

    /// Descriptor of a standard stream in the current process, if open.
    fn stdio_handle(&self, stream: StdStream) -> Option<i64>;

    /// Write one line to the diagnostic stream and flush it.
    fn diagnostic(&mut self, line: &str);
}

/// Validate an environment variable name and value.
pub(crate) fn check_env(name: &str, value: &str) -> Result<(), EnvError> {
    if name.is_empty() || name.contains(['=', '\0']) {
        return Err(EnvError::InvalidName(String::from(name)));
    }
    if value.contains('\0') {
        return Err(EnvError::InvalidValue(String::from(name)));
    }
    Ok(())
}
