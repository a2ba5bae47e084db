// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Platform that serves the embedded standard library.

use std::io;
use std::path::{Path, PathBuf};
use std::string::String;
use std::vec::Vec;

use super::os::OsPlatform;
use super::traits::{EnvError, Platform, StdStream};
use crate::loader::TarSource;

/// Virtual directory the embedded archive is mounted at.
pub const DEFAULT_MOUNT: &str = "/lona/lib";

/// Reads below the mount point come from a `TarSource`; everything else,
/// including the environment, time and diagnostics, goes to the host.
#[derive(Debug)]
pub struct ArchivePlatform {
    archive: TarSource,
    mount: PathBuf,
    host: OsPlatform,
}

impl ArchivePlatform {
    /// Mount `archive` at [`DEFAULT_MOUNT`].
    #[must_use]
    pub fn new(archive: TarSource, host: OsPlatform) -> Self {
        Self::with_mount(archive, DEFAULT_MOUNT, host)
    }

    /// Mount `archive` at `mount`.
    #[must_use]
    pub fn with_mount(archive: TarSource, mount: impl Into<PathBuf>, host: OsPlatform) -> Self {
        Self {
            archive,
            mount: mount.into(),
            host,
        }
    }

    /// The mount point. Also the working directory for top-level inclusions.
    #[must_use]
    pub fn mount(&self) -> &Path {
        &self.mount
    }

    fn archive_key(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.mount).ok()?;
        let parts: Vec<&str> = rel
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

impl Platform for ArchivePlatform {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.archive_key(path) {
            Some(key) => self.archive.find(&key).map(<[u8]>::to_vec).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{key} is not in the embedded library"),
                )
            }),
            None => self.host.read_file(path),
        }
    }

    fn working_dir(&self) -> PathBuf {
        self.mount.clone()
    }

    fn now_ns(&self) -> u64 {
        self.host.now_ns()
    }

    fn getenv(&self, name: &str) -> Option<String> {
        self.host.getenv(name)
    }

    fn setenv(&mut self, name: &str, value: &str) -> Result<(), EnvError> {
        self.host.setenv(name, value)
    }

    fn cpu_threads(&self) -> usize {
        self.host.cpu_threads()
    }

    fn stdio_handle(&self, stream: StdStream) -> Option<i64> {
        self.host.stdio_handle(stream)
    }

    fn diagnostic(&mut self, line: &str) {
        self.host.diagnostic(line);
    }
}
