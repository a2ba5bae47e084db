// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The runtime that hosts a bootstrap: platform, primary namespace,
//! inclusion slot, load manifest and process-wide initialization state.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::string::{String, ToString};

use tracing::debug;

use crate::error::{BootError, StageError};
use crate::eval::{self, EvalError, MAX_CALL_DEPTH};
use crate::include::{self, IncludeHost, IncludeSlot, Mapper, SourceStack, Stage};
use crate::init::{InitOutcome, Instantiation, ProcessInit};
use crate::intrinsics;
use crate::manifest::LoadManifest;
use crate::platform::Platform;
use crate::reader::Parser;
use crate::value::{Env, Namespace, NamespaceRef, Value};

/// Name of the namespace the standard library is loaded into.
pub const PRIMARY_NAMESPACE: &str = "lona.core";

/// Maximum nesting of units loading other units.
pub const MAX_INCLUDE_DEPTH: usize = 32;

/// One loaded image of the standard library.
pub struct Runtime<P: Platform> {
    platform: P,
    primary: NamespaceRef,
    manifest: LoadManifest,
    slot: IncludeSlot,
    sources: SourceStack,
    init: ProcessInit,
    call_depth: usize,
    include_depth: usize,
}

impl<P: Platform> Runtime<P> {
    /// Create a runtime whose primary namespace holds only the intrinsics.
    ///
    /// No inclusion stage is installed yet.
    #[must_use]
    pub fn new(platform: P) -> Self {
        let primary = Namespace::new_root(PRIMARY_NAMESPACE);
        intrinsics::seed(&primary);
        Self {
            platform,
            primary,
            manifest: LoadManifest::new(),
            slot: IncludeSlot::new(),
            sources: SourceStack::new(),
            init: ProcessInit::new(),
            call_depth: 0,
            include_depth: 0,
        }
    }

    /// The platform.
    #[inline]
    #[must_use]
    pub const fn platform(&self) -> &P {
        &self.platform
    }

    /// The platform, mutably.
    #[inline]
    pub const fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// The namespace the standard library is loaded into.
    #[inline]
    #[must_use]
    pub const fn primary(&self) -> &NamespaceRef {
        &self.primary
    }

    /// Completed inclusions so far.
    #[inline]
    #[must_use]
    pub const fn manifest(&self) -> &LoadManifest {
        &self.manifest
    }

    /// The active inclusion stage.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        self.slot.stage()
    }

    /// Every stage installed so far, in order.
    #[must_use]
    pub fn stage_history(&self) -> &[Stage] {
        self.slot.history()
    }

    /// The process-wide initialization state.
    #[must_use]
    pub const fn process_init(&self) -> &ProcessInit {
        &self.init
    }

    /// Install the definition of `stage` as the inclusion primitive.
    ///
    /// # Errors
    ///
    /// `Regression` or `IncludeInProgress` from the slot, or
    /// `MissingCapability` if a binding the stage needs is not defined in
    /// the primary namespace yet.
    pub fn install(&mut self, stage: Stage) -> Result<(), StageError> {
        self.slot.check(stage)?;
        if let Some(&capability) = stage
            .required_capabilities()
            .iter()
            .find(|name| !self.primary.contains(name))
        {
            return Err(StageError::MissingCapability { stage, capability });
        }
        let installed = self
            .slot
            .install(include::definition(stage, &self.sources))?;
        debug!(stage = %installed, "installed inclusion primitive");
        Ok(())
    }

    /// Include `path` into `namespace` with the two-argument form.
    ///
    /// # Errors
    ///
    /// See [`Runtime::include_with`].
    pub fn include(&mut self, namespace: &NamespaceRef, path: &str) -> Result<PathBuf, BootError> {
        self.include_with(namespace, path, Mapper::Identity)
    }

    /// Include `path` into `namespace` through the active definition,
    /// rewriting its text with `mapper` first.
    ///
    /// Returns the resolved path.
    ///
    /// # Errors
    ///
    /// `Stage(NoActivePrimitive)` before any stage is installed,
    /// `Stage(MapperUnsupported)` for a mapper before the final stage, and
    /// `UnreadableSource` or `EvaluationFailure` from the unit itself or
    /// any unit it includes.
    pub fn include_with(
        &mut self,
        namespace: &NamespaceRef,
        path: &str,
        mapper: Mapper,
    ) -> Result<PathBuf, BootError> {
        let active = self.slot.active().ok_or(StageError::NoActivePrimitive)?;
        let stage = active.stage();
        let started = self.platform.now_ns();
        let result = active.include_with(self, namespace, path, &mapper);
        drop(active);
        let elapsed_ns = self.platform.now_ns().saturating_sub(started);
        match &result {
            Ok(resolved) => debug!(
                namespace = namespace.name(),
                path = %resolved.display(),
                %stage,
                elapsed_ns,
                "included"
            ),
            Err(e) => debug!(
                namespace = namespace.name(),
                path,
                %stage,
                error = %e,
                "inclusion failed"
            ),
        }
        result
    }

    /// The unit currently being loaded, as tracked by the active stage.
    #[must_use]
    pub fn current_source(&self) -> Option<PathBuf> {
        self.slot.current_path()
    }

    /// Evaluate every form in `src` in the primary namespace, returning the
    /// value of the last one.
    ///
    /// # Errors
    ///
    /// Returns the first read or evaluation error.
    pub fn eval_str(&mut self, src: &str) -> Result<Value, EvalError> {
        let namespace = Rc::clone(&self.primary);
        self.eval_in(&namespace, src)
    }

    /// Evaluate every form in `src` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns the first read or evaluation error.
    pub fn eval_in(&mut self, namespace: &NamespaceRef, src: &str) -> Result<Value, EvalError> {
        let mut parser = Parser::new(src);
        let mut last = Value::Nil;
        while let Some(form) = parser.read()? {
            last = eval::eval(self, namespace, &Env::empty(), &form)?;
        }
        Ok(last)
    }

    /// Run the process-wide initialization routine.
    ///
    /// Runs at most once per runtime; see [`ProcessInit::run`].
    pub fn initialize(&mut self, instantiation: Instantiation) -> InitOutcome {
        self.init
            .run(&mut self.platform, &self.primary, instantiation)
    }

    pub(crate) const fn enter_call(&mut self) -> Result<(), EvalError> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(EvalError::TooDeep);
        }
        self.call_depth += 1;
        Ok(())
    }

    pub(crate) const fn leave_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    fn apply_mapper(
        &mut self,
        mapper: &Mapper,
        path: &Path,
        text: String,
    ) -> Result<String, BootError> {
        match mapper {
            Mapper::Identity => Ok(text),
            Mapper::Native(rewrite) => rewrite(path, &text).map_err(|reason| {
                BootError::EvaluationFailure {
                    path: path.to_path_buf(),
                    line: 0,
                    reason: format!("mapper: {reason}"),
                }
            }),
            Mapper::Callable(f) => {
                let out = eval::apply(self, f, vec![Value::string(&text)])
                    .map_err(|e| unit_failure(path, 0, e))?;
                match out.as_str() {
                    Some(s) => Ok(String::from(s)),
                    None => Err(BootError::EvaluationFailure {
                        path: path.to_path_buf(),
                        line: 0,
                        reason: format!("mapper returned {}, not a string", out.type_name()),
                    }),
                }
            }
        }
    }

    fn load_forms(
        &mut self,
        namespace: &NamespaceRef,
        path: &Path,
        mapper: &Mapper,
    ) -> Result<(), BootError> {
        let bytes = self
            .platform
            .read_file(path)
            .map_err(|e| BootError::UnreadableSource {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let text = String::from_utf8(bytes).map_err(|e| BootError::EvaluationFailure {
            path: path.to_path_buf(),
            line: 0,
            reason: format!("source is not valid UTF-8: {e}"),
        })?;
        let text = self.apply_mapper(mapper, path, text)?;

        let mut parser = Parser::new(&text);
        loop {
            let form = match parser.read() {
                Ok(Some(form)) => form,
                Ok(None) => return Ok(()),
                Err(e) => return Err(unit_failure(path, parser.line(), e.into())),
            };
            eval::eval(self, namespace, &Env::empty(), &form)
                .map_err(|e| unit_failure(path, parser.line(), e))?;
        }
    }
}

/// Turn an evaluation error inside `path` into the inclusion error.
///
/// A failed nested inclusion keeps its own error, which names the unit
/// that actually failed.
fn unit_failure(path: &Path, line: u32, error: EvalError) -> BootError {
    match error {
        EvalError::Include(inner) => *inner,
        other => BootError::EvaluationFailure {
            path: path.to_path_buf(),
            line,
            reason: other.to_string(),
        },
    }
}

impl<P: Platform> IncludeHost for Runtime<P> {
    fn working_dir(&self) -> PathBuf {
        self.platform.working_dir()
    }

    fn diagnostic(&mut self, line: &str) {
        self.platform.diagnostic(line);
    }

    fn load_unit(
        &mut self,
        namespace: &NamespaceRef,
        path: &Path,
        mapper: &Mapper,
    ) -> Result<(), BootError> {
        // Cycles and runaway nesting end here instead of on the Rust stack
        if self.include_depth >= MAX_INCLUDE_DEPTH {
            return Err(BootError::EvaluationFailure {
                path: path.to_path_buf(),
                line: 0,
                reason: format!("inclusions nested deeper than {MAX_INCLUDE_DEPTH}"),
            });
        }
        self.include_depth += 1;
        let result = self.load_forms(namespace, path, mapper);
        self.include_depth -= 1;
        result
    }

    fn record(&mut self, namespace: &NamespaceRef, path: &Path) {
        self.manifest.record(namespace.name(), path);
    }
}

impl<P: Platform> core::fmt::Debug for Runtime<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Runtime")
            .field("primary", &self.primary.name())
            .field("stage", &self.stage())
            .field("manifest", &self.manifest.len())
            .finish_non_exhaustive()
    }
}
