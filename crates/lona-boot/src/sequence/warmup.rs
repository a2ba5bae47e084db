// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Warm-up calls run after the sequence.
//!
//! They exercise the common container and string paths that tooling hits
//! first. Nothing depends on them succeeding.

use tracing::{debug, warn};

use crate::platform::Platform;
use crate::runtime::Runtime;

/// The fixed warm-up call list.
pub const WARM_UP_CALLS: &[&str] = &[
    "(sort [5 3 9 1 4 1 8])",
    "(map inc (range 16))",
    "(filter even? (range 16))",
    "(reduce + 0 (range 32))",
    r#"(string-join ", " ["alpha" "beta" "gamma"])"#,
    r#"(joinpath "/lona" "lib" "core.lona")"#,
    r#"(parse-int "4096")"#,
    "(BigInt/to-string (BigInt/factorial 20))",
];

/// Result of a warm-up run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct WarmUpReport {
    /// Calls attempted.
    pub attempted: usize,
    /// Calls that raised. Logged and otherwise ignored.
    pub failed: usize,
}

/// Run [`WARM_UP_CALLS`].
pub fn warm_up<P: Platform>(rt: &mut Runtime<P>) -> WarmUpReport {
    warm_up_with(rt, WARM_UP_CALLS)
}

/// Run `calls` in the primary namespace, swallowing every failure.
pub fn warm_up_with<P: Platform>(rt: &mut Runtime<P>, calls: &[&str]) -> WarmUpReport {
    let mut report = WarmUpReport::default();
    for &call in calls {
        report.attempted += 1;
        match rt.eval_str(call) {
            Ok(value) => debug!(call, %value, "warm-up call"),
            Err(e) => {
                report.failed += 1;
                warn!(call, error = %e, "warm-up call failed");
            }
        }
    }
    report
}
