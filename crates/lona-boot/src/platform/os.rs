// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Platform backed by the host operating system.

use std::io::{self, Write};
use std::num::NonZero;
use std::path::{Path, PathBuf};
use std::string::String;
use std::time::Instant;
use std::vec::Vec;

use super::traits::{EnvError, Platform, StdStream, check_env};

/// Real filesystem, process environment and stderr diagnostics.
#[derive(Debug)]
pub struct OsPlatform {
    workdir: PathBuf,
    epoch: Instant,
}

impl OsPlatform {
    /// Use the process working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn new() -> io::Result<Self> {
        Ok(Self::with_working_dir(std::env::current_dir()?))
    }

    /// Resolve top-level inclusions against `dir` instead of the process
    /// working directory.
    #[must_use]
    pub fn with_working_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: dir.into(),
            epoch: Instant::now(),
        }
    }
}

impl Platform for OsPlatform {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn working_dir(&self) -> PathBuf {
        self.workdir.clone()
    }

    fn now_ns(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn getenv(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn setenv(&mut self, name: &str, value: &str) -> Result<(), EnvError> {
        check_env(name, value)?;
        // SAFETY: the bootstrap runs on a single thread during process
        // startup; no other thread reads or writes the environment.
        unsafe { std::env::set_var(name, value) };
        Ok(())
    }

    fn cpu_threads(&self) -> usize {
        std::thread::available_parallelism().map_or(1, NonZero::get)
    }

    #[cfg(unix)]
    fn stdio_handle(&self, stream: StdStream) -> Option<i64> {
        use std::os::fd::AsRawFd;
        let fd = match stream {
            StdStream::Stdin => io::stdin().as_raw_fd(),
            StdStream::Stdout => io::stdout().as_raw_fd(),
            StdStream::Stderr => io::stderr().as_raw_fd(),
        };
        Some(i64::from(fd))
    }

    #[cfg(not(unix))]
    fn stdio_handle(&self, stream: StdStream) -> Option<i64> {
        Some(stream.default_fd())
    }

    fn diagnostic(&mut self, line: &str) {
        let mut err = io::stderr().lock();
        // Nowhere left to report a failing stderr
        let _ = writeln!(err, "{line}");
        let _ = err.flush();
    }
}
