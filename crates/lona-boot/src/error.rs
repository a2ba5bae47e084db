// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Bootstrap error types.
//!
//! Both inclusion failures are fatal to the bootstrap: the sequence driver
//! stops at the first `BootError` and surfaces it together with the partial
//! load manifest.

use std::fmt;
use std::path::PathBuf;
use std::string::String;

use crate::include::Stage;

/// A fatal bootstrap error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootError {
    /// The source unit could not be opened or read.
    UnreadableSource {
        /// Resolved absolute path of the unit.
        path: PathBuf,
        /// Why the read failed.
        reason: String,
    },
    /// The source unit failed to parse, or a top-level form raised.
    EvaluationFailure {
        /// Resolved absolute path of the unit.
        path: PathBuf,
        /// Line of the failing top-level form (1-based, 0 if unknown).
        line: u32,
        /// Rendered cause.
        reason: String,
    },
    /// The inclusion primitive could not be used or swapped.
    Stage(StageError),
}

impl BootError {
    /// Path of the unit the error belongs to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::UnreadableSource { path, .. } | Self::EvaluationFailure { path, .. } => {
                Some(path)
            }
            Self::Stage(_) => None,
        }
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnreadableSource { path, reason } => {
                write!(f, "unreadable source {}: {reason}", path.display())
            }
            Self::EvaluationFailure { path, line, reason } => {
                write!(f, "evaluation failure in {}:{line}: {reason}", path.display())
            }
            Self::Stage(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BootError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StageError> for BootError {
    fn from(e: StageError) -> Self {
        Self::Stage(e)
    }
}

/// Misuse of the inclusion primitive's registration point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// `include` was called before any stage was installed.
    NoActivePrimitive,
    /// A stage at or below the active one was requested.
    Regression {
        /// The active stage.
        current: Stage,
        /// The stage that was requested.
        requested: Stage,
    },
    /// The active definition is still running an inclusion.
    IncludeInProgress {
        /// The active stage.
        current: Stage,
    },
    /// A binding the stage depends on is not defined yet.
    MissingCapability {
        /// The stage that was requested.
        stage: Stage,
        /// Name of the missing binding.
        capability: &'static str,
    },
    /// A mapping function was given to a stage that does not take one.
    MapperUnsupported {
        /// The active stage.
        stage: Stage,
    },
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActivePrimitive => write!(f, "no inclusion primitive installed"),
            Self::Regression { current, requested } => write!(
                f,
                "cannot install {requested} inclusion: {current} is already active"
            ),
            Self::IncludeInProgress { current } => write!(
                f,
                "cannot replace {current} inclusion while it is running"
            ),
            Self::MissingCapability { stage, capability } => write!(
                f,
                "cannot install {stage} inclusion: `{capability}` is not defined"
            ),
            Self::MapperUnsupported { stage } => {
                write!(f, "{stage} inclusion does not accept a mapping function")
            }
        }
    }
}

impl std::error::Error for StageError {}
