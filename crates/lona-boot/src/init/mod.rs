// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Process-wide initialization.
//!
//! Runs once per loaded image after the last unit of the bootstrap
//! sequence, for the primary instantiation only. Each step is best effort:
//! a failing step is reported and the remaining steps still run.


mod config;

pub use config::{
    DEFAULT_LOAD_PATH, DEFAULT_MAX_PRECOMPILE_FILES, InitConfig, LOAD_PATH_VAR,
    MAX_PRECOMPILE_FILES_VAR,
};

use std::fmt;
use std::string::{String, ToString};
use std::vec::Vec;

use tracing::{debug, warn};

use crate::platform::{Platform, StdStream};
use crate::value::{NamespaceRef, Value};

/// Thread-count variable of the linked numeric library.
pub const BLAS_THREADS_VAR: &str = "OPENBLAS_NUM_THREADS";

/// Generic thread-count variable that also counts as explicit
/// configuration.
pub const OMP_THREADS_VAR: &str = "OMP_NUM_THREADS";

/// Upper bound for the computed thread hint.
pub const MAX_THREAD_HINT: usize = 8;

/// Binding holding the interactive display.
pub const DISPLAY_BINDING: &str = "*display*";

/// Binding holding the code-search path.
pub const LOAD_PATH_BINDING: &str = "*load-path*";

/// Binding holding the precompile limit.
pub const MAX_PRECOMPILE_BINDING: &str = "*max-precompile-files*";

/// Binding holding the namespaces present when initialization ran.
pub const FROZEN_BINDING: &str = "*frozen-namespaces*";

/// Which instantiation of the library is starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Instantiation {
    /// The process's own library image. Runs initialization.
    #[default]
    Primary,
    /// An embedded or nested image. Skips initialization.
    Secondary,
}

/// The initialization steps, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitStep {
    /// Thread-count hints for the numeric library.
    ThreadHints,
    /// Standard stream bindings.
    Streams,
    /// Interactive display.
    Display,
    /// Code-search path and precompile limit.
    LoadPath,
    /// Snapshot of loaded namespaces.
    FrozenNamespaces,
}

impl InitStep {
    /// All steps, in order.
    pub const ALL: [Self; 5] = [
        Self::ThreadHints,
        Self::Streams,
        Self::Display,
        Self::LoadPath,
        Self::FrozenNamespaces,
    ];

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ThreadHints => "thread-hints",
            Self::Streams => "streams",
            Self::Display => "display",
            Self::LoadPath => "load-path",
            Self::FrozenNamespaces => "frozen-namespaces",
        }
    }
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a step did.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    /// The step changed state.
    Applied,
    /// Nothing needed changing, e.g. a variable was already set.
    Unchanged,
    /// The step failed; later steps still ran.
    Failed(String),
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StepReport {
    /// The step.
    pub step: InitStep,
    /// What it did.
    pub status: StepStatus,
}

/// Values read and written by initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct InitState {
    /// Value given to the thread hint variable, if this run set it.
    pub thread_hint: Option<usize>,
    /// Handles bound for each standard stream.
    pub streams: Vec<(StdStream, i64)>,
    /// Code-search path.
    pub load_path: Vec<String>,
    /// Precompile limit.
    pub max_precompile_files: Option<u32>,
    /// Namespaces present when initialization ran.
    pub frozen_namespaces: Vec<String>,
    /// Per-step outcomes, in order.
    pub steps: Vec<StepReport>,
}

impl InitState {
    /// Number of failed steps.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.steps
            .iter()
            .filter(|r| matches!(r.status, StepStatus::Failed(_)))
            .count()
    }

    /// Status of `step`, if it ran.
    #[must_use]
    pub fn status(&self, step: InitStep) -> Option<&StepStatus> {
        self.steps
            .iter()
            .find(|r| r.step == step)
            .map(|r| &r.status)
    }
}

/// Result of [`ProcessInit::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Initialization ran; `failed` steps reported errors.
    Completed {
        /// Number of failed steps.
        failed: usize,
    },
    /// Initialization had already run in this image. Nothing was done.
    AlreadyRan,
    /// Secondary instantiation. Nothing was done.
    Skipped,
}

/// The one-shot guard plus what the run recorded.
#[derive(Debug, Default)]
pub struct ProcessInit {
    has_run: bool,
    state: InitState,
}

impl ProcessInit {
    /// A routine that has not run yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the routine has run in this image.
    #[inline]
    #[must_use]
    pub const fn has_run(&self) -> bool {
        self.has_run
    }

    /// What the run recorded. Empty until it has run.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &InitState {
        &self.state
    }

    /// Run every step against `platform`, binding results in `primary`.
    ///
    /// The guard is set before the first step, so even a run in which
    /// every step fails is not repeated.
    pub fn run<P: Platform>(
        &mut self,
        platform: &mut P,
        primary: &NamespaceRef,
        instantiation: Instantiation,
    ) -> InitOutcome {
        if instantiation == Instantiation::Secondary {
            debug!("secondary instantiation, skipping process initialization");
            return InitOutcome::Skipped;
        }
        if self.has_run {
            debug!("process initialization already ran");
            return InitOutcome::AlreadyRan;
        }
        self.has_run = true;

        let mut state = InitState::default();
        for step in InitStep::ALL {
            let result = match step {
                InitStep::ThreadHints => thread_hints(platform, &mut state),
                InitStep::Streams => streams(platform, primary, &mut state),
                InitStep::Display => display(primary),
                InitStep::LoadPath => load_path(platform, primary, &mut state),
                InitStep::FrozenNamespaces => frozen_namespaces(primary, &mut state),
            };
            let status = match result {
                Ok(true) => StepStatus::Applied,
                Ok(false) => StepStatus::Unchanged,
                Err(reason) => {
                    warn!(%step, %reason, "initialization step failed");
                    StepStatus::Failed(reason)
                }
            };
            state.steps.push(StepReport { step, status });
        }

        let failed = state.failures();
        self.state = state;
        InitOutcome::Completed { failed }
    }
}

type StepResult = Result<bool, String>;

fn thread_hints<P: Platform>(platform: &mut P, state: &mut InitState) -> StepResult {
    if platform.getenv(BLAS_THREADS_VAR).is_some() || platform.getenv(OMP_THREADS_VAR).is_some() {
        return Ok(false);
    }
    let hint = platform.cpu_threads().clamp(1, MAX_THREAD_HINT);
    platform
        .setenv(BLAS_THREADS_VAR, &hint.to_string())
        .map_err(|e| e.to_string())?;
    state.thread_hint = Some(hint);
    Ok(true)
}

fn stream_value(fd: i64) -> Value {
    Value::tuple(vec![Value::keyword("stream"), Value::int(fd)])
}

fn streams<P: Platform>(platform: &P, primary: &NamespaceRef, state: &mut InitState) -> StepResult {
    let mut missing = Vec::new();
    for stream in StdStream::ALL {
        match platform.stdio_handle(stream) {
            Some(fd) => {
                primary.define(stream.binding(), stream_value(fd));
                state.streams.push((stream, fd));
            }
            None => missing.push(stream.binding()),
        }
    }
    if missing.is_empty() {
        Ok(true)
    } else {
        Err(format!("no handle for {}", missing.join(", ")))
    }
}

fn display(primary: &NamespaceRef) -> StepResult {
    let stdout = primary
        .get(StdStream::Stdout.binding())
        .ok_or_else(|| String::from("*stdout* is not bound"))?;
    primary.define(
        DISPLAY_BINDING,
        Value::tuple(vec![Value::keyword("text-display"), stdout]),
    );
    Ok(true)
}

fn load_path<P: Platform>(
    platform: &P,
    primary: &NamespaceRef,
    state: &mut InitState,
) -> StepResult {
    let config = InitConfig::from_platform(platform)?;
    primary.define(
        LOAD_PATH_BINDING,
        Value::tuple(config.load_path.iter().map(|p| Value::string(p)).collect()),
    );
    primary.define(
        MAX_PRECOMPILE_BINDING,
        Value::int(i64::from(config.max_precompile_files)),
    );
    state.load_path = config.load_path;
    state.max_precompile_files = Some(config.max_precompile_files);
    Ok(true)
}

fn frozen_namespaces(primary: &NamespaceRef, state: &mut InitState) -> StepResult {
    let names: Vec<String> = primary
        .walk()
        .iter()
        .map(|ns| String::from(ns.name()))
        .collect();
    primary.define(
        FROZEN_BINDING,
        Value::tuple(names.iter().map(|n| Value::string(n)).collect()),
    );
    state.frozen_namespaces = names;
    Ok(true)
}
