// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Mock platform implementation for testing.
//!
//! Files live in memory, the environment is a private map, the clock only
//! moves when told to, and diagnostic lines are captured instead of
//! written anywhere.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::string::String;
use std::vec::Vec;

use super::traits::{EnvError, Platform, StdStream, check_env};

/// An in-memory platform.
#[derive(Debug)]
pub struct MockPlatform {
    files: BTreeMap<PathBuf, Vec<u8>>,
    env: BTreeMap<String, String>,
    workdir: PathBuf,
    clock: Cell<u64>,
    tick: u64,
    cpu_threads: usize,
    streams: BTreeMap<StdStream, i64>,
    diagnostics: Vec<String>,
    reads: RefCell<Vec<PathBuf>>,
    setenv_calls: Vec<(String, String)>,
}

impl MockPlatform {
    /// Create an empty platform with working directory `/`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
            env: BTreeMap::new(),
            workdir: PathBuf::from("/"),
            clock: Cell::new(0),
            tick: 1_000,
            cpu_threads: 4,
            streams: StdStream::ALL
                .into_iter()
                .map(|s| (s, s.default_fd()))
                .collect(),
            diagnostics: Vec::new(),
            reads: RefCell::new(Vec::new()),
            setenv_calls: Vec::new(),
        }
    }

    /// Add (or replace) a file.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, contents: &str) -> &mut Self {
        self.files.insert(path.into(), contents.as_bytes().to_vec());
        self
    }

    /// Add a file with raw bytes.
    pub fn add_bytes(&mut self, path: impl Into<PathBuf>, contents: &[u8]) -> &mut Self {
        self.files.insert(path.into(), contents.to_vec());
        self
    }

    /// Remove a file so later reads fail.
    pub fn remove_file(&mut self, path: &Path) {
        self.files.remove(path);
    }

    /// Set the working directory.
    pub fn set_working_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.workdir = dir.into();
        self
    }

    /// Seed an environment variable without recording a `setenv` call.
    pub fn set_env(&mut self, name: &str, value: &str) -> &mut Self {
        self.env.insert(String::from(name), String::from(value));
        self
    }

    /// Set the reported hardware thread count.
    pub const fn set_cpu_threads(&mut self, n: usize) -> &mut Self {
        self.cpu_threads = n;
        self
    }

    /// Mark a standard stream as closed (or reopen it with `Some(fd)`).
    pub fn set_stream(&mut self, stream: StdStream, fd: Option<i64>) -> &mut Self {
        match fd {
            Some(fd) => self.streams.insert(stream, fd),
            None => self.streams.remove(&stream),
        };
        self
    }

    /// Advance the clock by this many nanoseconds on every `now_ns` call.
    pub const fn set_tick(&mut self, ns: u64) -> &mut Self {
        self.tick = ns;
        self
    }

    /// Captured diagnostic lines.
    #[must_use]
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Every path passed to `read_file`, in call order.
    #[must_use]
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.borrow().clone()
    }

    /// Every successful `setenv` call, in call order.
    #[must_use]
    pub fn setenv_calls(&self) -> &[(String, String)] {
        &self.setenv_calls
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for MockPlatform {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.reads.borrow_mut().push(path.to_path_buf());
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn working_dir(&self) -> PathBuf {
        self.workdir.clone()
    }

    fn now_ns(&self) -> u64 {
        let now = self.clock.get().saturating_add(self.tick);
        self.clock.set(now);
        now
    }

    fn getenv(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn setenv(&mut self, name: &str, value: &str) -> Result<(), EnvError> {
        check_env(name, value)?;
        self.env.insert(String::from(name), String::from(value));
        self.setenv_calls
            .push((String::from(name), String::from(value)));
        Ok(())
    }

    fn cpu_threads(&self) -> usize {
        self.cpu_threads
    }

    fn stdio_handle(&self, stream: StdStream) -> Option<i64> {
        self.streams.get(&stream).copied()
    }

    fn diagnostic(&mut self, line: &str) {
        self.diagnostics.push(String::from(line));
    }
}
