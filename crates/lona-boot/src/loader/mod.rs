// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Access to the standard library packed into the binary.
//!
//! The build script packs the workspace `lib/` directory into a USTAR
//! archive that is embedded with `include_bytes!`. `TarSource` indexes it
//! once by archive-relative path.

#[cfg(test)]
mod loader_test;

use std::collections::BTreeMap;
use std::fmt;
use std::string::String;
use std::vec::Vec;

use tar_no_std::TarArchiveRef;

/// The standard library archive produced by `build.rs`.
static EMBEDDED_LIB: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/lonalib.tar"));

/// Failure to open an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    /// The archive header or an entry is malformed.
    Corrupt(String),
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupt(detail) => write!(f, "corrupt library archive: {detail}"),
        }
    }
}

impl std::error::Error for ArchiveError {}

/// Size of a tar block.
const BLOCK_SIZE: usize = 512;

/// An indexed, read-only view of a tar archive of source units.
#[derive(Debug, Clone, Default)]
pub struct TarSource {
    files: BTreeMap<String, Vec<u8>>,
}

impl TarSource {
    /// Index an archive.
    ///
    /// Entries whose names are not valid UTF-8 and directory entries are
    /// skipped. A leading `./` is stripped from every name. Data made of
    /// zero blocks only, the end-of-archive marker without entries, is an
    /// empty archive.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::Corrupt` if the archive cannot be parsed.
    pub fn new(data: &[u8]) -> Result<Self, ArchiveError> {
        if data.len() % BLOCK_SIZE == 0 && data.iter().all(|&b| b == 0) {
            return Ok(Self::default());
        }
        let archive =
            TarArchiveRef::new(data).map_err(|e| ArchiveError::Corrupt(format!("{e:?}")))?;
        let mut files = BTreeMap::new();
        for entry in archive.entries() {
            let filename = entry.filename();
            let Ok(name) = filename.as_str() else {
                continue;
            };
            let name = name.strip_prefix("./").unwrap_or(name);
            if name.is_empty() || name.ends_with('/') {
                continue;
            }
            files.insert(String::from(name), entry.data().to_vec());
        }
        Ok(Self { files })
    }

    /// The archive embedded at build time.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::Corrupt` if the embedded archive is malformed.
    pub fn embedded() -> Result<Self, ArchiveError> {
        Self::new(EMBEDDED_LIB)
    }

    /// Contents of the entry at an archive-relative path.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Archive-relative paths of every file, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of files in the archive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the archive has no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
