// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The bootstrap sequence: which units load, in which order, and when the
//! inclusion primitive is upgraded.
//!
//! The order is the dependency graph. Nothing is computed at runtime; a
//! unit that uses a name defined by a later unit fails to load, and the
//! fix is to reorder the table. [`audit`] re-derives the dependencies
//! statically so such mistakes are caught by tests instead of at boot.


pub mod audit;
mod warmup;

pub use audit::{AuditReport, CapabilityGap, OrderViolation, PhaseRegression, audit};
pub use warmup::{WARM_UP_CALLS, WarmUpReport, warm_up, warm_up_with};

use std::fmt;
use std::rc::Rc;
use std::vec::Vec;

use tracing::{error, info};

use crate::error::BootError;
use crate::include::Stage;
use crate::init::{InitOutcome, Instantiation};
use crate::platform::Platform;
use crate::runtime::Runtime;

/// Logical partition of the sequence. Units may only use what earlier
/// phases define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Scalar and operator definitions.
    Core,
    /// Tuples and sequence abstractions.
    Containers,
    /// Integers and rationals.
    Numbers,
    /// Strings, paths and streams.
    Io,
    /// Locks and channels.
    Concurrency,
    /// Process environment.
    Os,
    /// Sorting and reductions.
    Algorithms,
    /// Arbitrary precision integers.
    BigNumbers,
    /// Introspection and documentation.
    Meta,
    /// Code loading and caching.
    Loading,
    /// Old names kept for compatibility.
    Deprecated,
    /// Entry points for hosts and tools.
    Client,
}

impl Phase {
    /// All phases, in order.
    pub const ALL: [Self; 12] = [
        Self::Core,
        Self::Containers,
        Self::Numbers,
        Self::Io,
        Self::Concurrency,
        Self::Os,
        Self::Algorithms,
        Self::BigNumbers,
        Self::Meta,
        Self::Loading,
        Self::Deprecated,
        Self::Client,
    ];

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Containers => "containers",
            Self::Numbers => "numbers",
            Self::Io => "io",
            Self::Concurrency => "concurrency",
            Self::Os => "os",
            Self::Algorithms => "algorithms",
            Self::BigNumbers => "big-numbers",
            Self::Meta => "meta",
            Self::Loading => "loading",
            Self::Deprecated => "deprecated",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One step of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Include a unit into the primary namespace. `path` is relative to
    /// the working directory.
    Unit {
        /// Unit path.
        path: &'static str,
        /// Phase the unit belongs to.
        phase: Phase,
    },
    /// Upgrade the inclusion primitive.
    Install(Stage),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit { path, phase } => write!(f, "include {path} ({phase})"),
            Self::Install(stage) => write!(f, "install {stage} inclusion"),
        }
    }
}

const fn unit(path: &'static str, phase: Phase) -> Step {
    Step::Unit { path, phase }
}

/// The standard library, in load order.
///
/// The primitive stage is installed by the driver before the first step.
pub const BOOT_SEQUENCE: &[Step] = &[
    unit("core/operators.lona", Phase::Core),
    unit("core/scalars.lona", Phase::Core),
    unit("coll/tuple.lona", Phase::Containers),
    unit("coll/abstract.lona", Phase::Containers),
    unit("numbers/numbers.lona", Phase::Numbers),
    unit("io/string.lona", Phase::Io),
    unit("io/path.lona", Phase::Io),
    unit("io/stream.lona", Phase::Io),
    Step::Install(Stage::RelativePath),
    unit("concurrency/concurrency.lona", Phase::Concurrency),
    unit("os/env.lona", Phase::Os),
    unit("coll/sort.lona", Phase::Algorithms),
    unit("coll/reduce.lona", Phase::Algorithms),
    unit("numbers/bigint.lona", Phase::BigNumbers),
    unit("meta/introspect.lona", Phase::Meta),
    unit("meta/docs.lona", Phase::Meta),
    unit("loading/loading.lona", Phase::Loading),
    unit("deprecated.lona", Phase::Deprecated),
    unit("client.lona", Phase::Client),
    Step::Install(Stage::Final),
];

/// Paths of the top-level units in [`BOOT_SEQUENCE`].
pub fn unit_paths() -> impl Iterator<Item = &'static str> {
    BOOT_SEQUENCE.iter().filter_map(|step| match step {
        Step::Unit { path, .. } => Some(*path),
        Step::Install(_) => None,
    })
}

/// Time spent in one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PhaseTiming {
    /// The phase.
    pub phase: Phase,
    /// Top-level units loaded.
    pub units: usize,
    /// Wall time, from the platform clock.
    pub elapsed_ns: u64,
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BootReport {
    /// Per-phase timing, in phase order.
    pub phases: Vec<PhaseTiming>,
    /// Top-level units loaded.
    pub units: usize,
    /// Manifest length at the end of the sequence, nested units included.
    pub manifest_len: usize,
    /// Stage active at the end.
    pub stage: Option<Stage>,
    /// Warm-up result, if it ran.
    pub warm_up: Option<WarmUpReport>,
    /// Initialization result, if it ran.
    pub init: Option<InitOutcome>,
}

/// A fatal bootstrap error.
///
/// Nothing after `index` ran. The manifest is left as it was for
/// postmortem inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootFailure {
    /// Index of the failing step.
    pub index: usize,
    /// The failing step.
    pub step: Step,
    /// Why it failed.
    pub error: BootError,
    /// Manifest length when the sequence stopped.
    pub manifest_len: usize,
}

impl fmt::Display for BootFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bootstrap failed at step {} ({}): {}",
            self.index, self.step, self.error
        )
    }
}

impl std::error::Error for BootFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Options for [`boot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootOptions {
    /// Run the warm-up calls after the sequence.
    pub warm_up: bool,
    /// Which instantiation is starting.
    pub instantiation: Instantiation,
}

impl Default for BootOptions {
    fn default() -> Self {
        Self {
            warm_up: true,
            instantiation: Instantiation::Primary,
        }
    }
}

/// Execute `steps` in order, stopping at the first error.
///
/// Installs the primitive stage first if no stage is active.
///
/// # Errors
///
/// Returns a [`BootFailure`] naming the first step that failed.
pub fn run_sequence<P: Platform>(
    rt: &mut Runtime<P>,
    steps: &[Step],
) -> Result<BootReport, BootFailure> {
    let fail = |rt: &Runtime<P>, index: usize, step: Step, error: BootError| {
        let failure = BootFailure {
            index,
            step,
            error,
            manifest_len: rt.manifest().len(),
        };
        error!(
            index,
            step = %failure.step,
            error = %failure.error,
            manifest = failure.manifest_len,
            "bootstrap aborted"
        );
        failure
    };

    if rt.stage().is_none() {
        rt.install(Stage::Primitive)
            .map_err(|e| fail(rt, 0, Step::Install(Stage::Primitive), e.into()))?;
    }

    let primary = Rc::clone(rt.primary());
    let mut report = BootReport::default();
    for (index, step) in steps.iter().enumerate() {
        match *step {
            Step::Unit { path, phase } => {
                let started = rt.platform().now_ns();
                rt.include(&primary, path)
                    .map_err(|e| fail(rt, index, *step, e))?;
                let elapsed_ns = rt.platform().now_ns().saturating_sub(started);
                report.units += 1;
                match report.phases.last_mut() {
                    Some(timing) if timing.phase == phase => {
                        timing.units += 1;
                        timing.elapsed_ns = timing.elapsed_ns.saturating_add(elapsed_ns);
                    }
                    _ => report.phases.push(PhaseTiming {
                        phase,
                        units: 1,
                        elapsed_ns,
                    }),
                }
            }
            Step::Install(stage) => {
                rt.install(stage)
                    .map_err(|e| fail(rt, index, *step, e.into()))?;
            }
        }
    }

    for timing in &report.phases {
        info!(
            phase = %timing.phase,
            units = timing.units,
            elapsed_ns = timing.elapsed_ns,
            "phase loaded"
        );
    }
    report.manifest_len = rt.manifest().len();
    report.stage = rt.stage();
    Ok(report)
}

/// Load the standard library, warm it up and run initialization.
///
/// # Errors
///
/// Returns the [`BootFailure`] of the sequence. Warm-up and
/// initialization failures are reported in the [`BootReport`] instead.
pub fn boot<P: Platform>(
    rt: &mut Runtime<P>,
    options: &BootOptions,
) -> Result<BootReport, BootFailure> {
    let started = rt.platform().now_ns();
    let mut report = run_sequence(rt, BOOT_SEQUENCE)?;
    if options.warm_up {
        report.warm_up = Some(warm_up(rt));
    }
    report.init = Some(rt.initialize(options.instantiation));
    info!(
        units = report.units,
        manifest = report.manifest_len,
        bindings = rt.primary().len(),
        elapsed_ns = rt.platform().now_ns().saturating_sub(started),
        "standard library is live"
    );
    Ok(report)
}
