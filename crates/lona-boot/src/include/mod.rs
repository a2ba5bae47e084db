// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The inclusion primitive: `include(namespace, path)`.
//!
//! Every library unit is loaded through this one operation. Its definition
//! is replaced twice during bootstrap as more of the library becomes
//! available:
//!
//! | Stage          | Resolves against                  | Tracks current unit in |
//! |----------------|-----------------------------------|------------------------|
//! | `Primitive`    | working directory                 | nothing                |
//! | `RelativePath` | directory of the including unit   | a cell owned by stage  |
//! | `Final`        | directory of the including unit   | the runtime's stack    |
//!
//! Exactly one definition is live at a time. [`IncludeSlot`] is the only
//! place a definition can be installed, and it only ever moves forward.

#[cfg(test)]
mod path_test;
#[cfg(test)]
mod stages_test;

mod context;
mod final_form;
pub mod path;
mod primordial;
mod relative;
mod slot;

pub use context::{SourceFrame, SourceStack};
pub use final_form::FinalInclude;
pub use primordial::PrimitiveInclude;
pub use relative::RelativeInclude;
pub use slot::IncludeSlot;

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::string::String;

use crate::error::{BootError, StageError};
use crate::value::{NamespaceRef, Value};

/// Which definition of the inclusion primitive is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Resolves against the working directory only.
    Primitive,
    /// Resolves against the including unit, tracked by the stage itself.
    RelativePath,
    /// Resolves against the including unit, tracked by the source stack.
    /// Accepts a mapping function.
    Final,
}

impl Stage {
    /// All stages, in installation order.
    pub const ALL: [Self; 3] = [Self::Primitive, Self::RelativePath, Self::Final];

    /// Bindings that must exist in the primary namespace before this stage
    /// may be installed.
    #[must_use]
    pub const fn required_capabilities(self) -> &'static [&'static str] {
        match self {
            Self::Primitive => &[],
            Self::RelativePath => &["dirname", "joinpath", "normpath", "string-join"],
            Self::Final => &["Loading"],
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::RelativePath => "relative-path",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust-side source rewriter.
pub type NativeMapper = Rc<dyn Fn(&Path, &str) -> Result<String, String>>;

/// Transformation applied to a unit's text before it is evaluated.
#[derive(Clone, Default)]
pub enum Mapper {
    /// Evaluate the text unchanged. What the two-argument form means.
    #[default]
    Identity,
    /// Rewrite in Rust (coverage instrumentation and similar tooling).
    Native(NativeMapper),
    /// Rewrite with a Lonala function taking and returning a string.
    Callable(Value),
}

impl Mapper {
    /// Whether this mapper leaves the text unchanged.
    #[inline]
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Native(_) => f.write_str("Native(..)"),
            Self::Callable(v) => f.debug_tuple("Callable").field(v).finish(),
        }
    }
}

/// What a stage needs from the runtime that hosts it.
pub trait IncludeHost {
    /// Base directory for inclusions made outside any unit.
    fn working_dir(&self) -> PathBuf;

    /// Write a line to the diagnostic stream, flushed.
    fn diagnostic(&mut self, line: &str);

    /// Read `path`, apply `mapper` and evaluate every top-level form into
    /// `namespace`.
    ///
    /// # Errors
    ///
    /// `UnreadableSource` if the file cannot be read, `EvaluationFailure`
    /// if the text does not parse or a form raises. Errors from nested
    /// inclusions are passed through unchanged.
    fn load_unit(
        &mut self,
        namespace: &NamespaceRef,
        path: &Path,
        mapper: &Mapper,
    ) -> Result<(), BootError>;

    /// Append a completed inclusion to the load manifest.
    fn record(&mut self, namespace: &NamespaceRef, path: &Path);
}

/// One definition of the inclusion primitive.
pub trait IncludePrimitive {
    /// Which stage this definition implements.
    fn stage(&self) -> Stage;

    /// Load `path` into `namespace`, returning the resolved path.
    ///
    /// # Errors
    ///
    /// Propagates the host's `BootError`s. Stages without mapper support
    /// return `StageError::MapperUnsupported` for anything but
    /// `Mapper::Identity`.
    fn include_with(
        &self,
        host: &mut dyn IncludeHost,
        namespace: &NamespaceRef,
        path: &str,
        mapper: &Mapper,
    ) -> Result<PathBuf, BootError>;

    /// The unit this definition is currently loading, if any.
    fn current_path(&self) -> Option<PathBuf>;

    /// The two-argument form: `include_with` with `Mapper::Identity`.
    ///
    /// # Errors
    ///
    /// See [`IncludePrimitive::include_with`].
    fn include(
        &self,
        host: &mut dyn IncludeHost,
        namespace: &NamespaceRef,
        path: &str,
    ) -> Result<PathBuf, BootError> {
        self.include_with(host, namespace, path, &Mapper::Identity)
    }
}

/// Reject a mapper on a stage that only has the two-argument form.
fn identity_only(stage: Stage, mapper: &Mapper) -> Result<(), BootError> {
    if mapper.is_identity() {
        Ok(())
    } else {
        Err(StageError::MapperUnsupported { stage }.into())
    }
}

/// Build the definition for `stage`.
///
/// `sources` is the runtime's source stack, used by the final stage.
#[must_use]
pub fn definition(stage: Stage, sources: &SourceStack) -> Rc<dyn IncludePrimitive> {
    match stage {
        Stage::Primitive => Rc::new(PrimitiveInclude),
        Stage::RelativePath => Rc::new(RelativeInclude::new()),
        Stage::Final => Rc::new(FinalInclude::new(sources.clone())),
    }
}
