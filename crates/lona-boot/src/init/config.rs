// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Environment configuration read by initialization.

use std::string::String;
use std::vec::Vec;

use crate::platform::Platform;

/// Code-search path override, colon separated.
pub const LOAD_PATH_VAR: &str = "LONA_LOAD_PATH";

/// Precompile limit override.
pub const MAX_PRECOMPILE_FILES_VAR: &str = "LONA_MAX_PRECOMPILE_FILES";

/// Code-search path when no override is set.
pub const DEFAULT_LOAD_PATH: [&str; 3] = ["@", "@lona", "@stdlib"];

/// Precompile limit when no override is set.
pub const DEFAULT_MAX_PRECOMPILE_FILES: u32 = 10;

/// Configuration from the environment, with defaults for anything unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitConfig {
    /// Code-search path entries.
    pub load_path: Vec<String>,
    /// Maximum number of files precompiled per load.
    pub max_precompile_files: u32,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            load_path: DEFAULT_LOAD_PATH.iter().map(|&s| String::from(s)).collect(),
            max_precompile_files: DEFAULT_MAX_PRECOMPILE_FILES,
        }
    }
}

impl InitConfig {
    /// Read the overrides through `platform`.
    ///
    /// An empty `LONA_LOAD_PATH` counts as unset. Empty entries inside it
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns a message if `LONA_MAX_PRECOMPILE_FILES` is not a positive
    /// integer.
    pub fn from_platform<P: Platform>(platform: &P) -> Result<Self, String> {
        let mut config = Self::default();
        if let Some(raw) = platform.getenv(LOAD_PATH_VAR) {
            let entries: Vec<String> = raw
                .split(':')
                .filter(|entry| !entry.is_empty())
                .map(String::from)
                .collect();
            if !entries.is_empty() {
                config.load_path = entries;
            }
        }
        if let Some(raw) = platform.getenv(MAX_PRECOMPILE_FILES_VAR) {
            config.max_precompile_files = match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(format!(
                        "{MAX_PRECOMPILE_FILES_VAR} must be a positive integer, got {raw:?}"
                    ));
                }
            };
        }
        Ok(config)
    }
}
