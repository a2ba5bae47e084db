// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! First-stage inclusion.

use std::path::{Path, PathBuf};

use super::path::resolve;
use super::{IncludeHost, IncludePrimitive, Mapper, Stage, identity_only};
use crate::error::BootError;
use crate::value::NamespaceRef;

/// Resolves every path against the working directory.
///
/// Before loading, the resolved path is written to the diagnostic stream
/// and flushed, so a crash mid-bootstrap leaves the last attempted unit
/// visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveInclude;

impl IncludePrimitive for PrimitiveInclude {
    fn stage(&self) -> Stage {
        Stage::Primitive
    }

    fn include_with(
        &self,
        host: &mut dyn IncludeHost,
        namespace: &NamespaceRef,
        path: &str,
        mapper: &Mapper,
    ) -> Result<PathBuf, BootError> {
        identity_only(Stage::Primitive, mapper)?;
        let resolved = resolve(&host.working_dir(), Path::new(path));
        host.diagnostic(&resolved.to_string_lossy());
        host.load_unit(namespace, &resolved, mapper)?;
        host.record(namespace, &resolved);
        Ok(resolved)
    }

    fn current_path(&self) -> Option<PathBuf> {
        None
    }
}
