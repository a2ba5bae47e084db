// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Second-stage inclusion.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use super::path::{dirname, resolve};
use super::{IncludeHost, IncludePrimitive, Mapper, Stage, identity_only};
use crate::error::BootError;
use crate::value::NamespaceRef;

/// Resolves paths against the directory of the unit being loaded.
///
/// The current unit lives in a single cell owned by this definition. Each
/// inclusion swaps its own path in and restores the previous one when it
/// returns, whether it succeeded or not. Nothing guards the cell against a
/// second thread: inclusion must stay sequential while this stage is
/// active.
#[derive(Debug, Default)]
pub struct RelativeInclude {
    current: RefCell<Option<PathBuf>>,
}

impl RelativeInclude {
    /// A definition with no unit loading.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IncludePrimitive for RelativeInclude {
    fn stage(&self) -> Stage {
        Stage::RelativePath
    }

    fn include_with(
        &self,
        host: &mut dyn IncludeHost,
        namespace: &NamespaceRef,
        path: &str,
        mapper: &Mapper,
    ) -> Result<PathBuf, BootError> {
        identity_only(Stage::RelativePath, mapper)?;
        let base = self
            .current
            .borrow()
            .as_deref()
            .map_or_else(|| host.working_dir(), dirname);
        let resolved = resolve(&base, Path::new(path));
        {
            let _scope = ScopedPath::enter(&self.current, resolved.clone());
            host.load_unit(namespace, &resolved, mapper)?;
        }
        host.record(namespace, &resolved);
        Ok(resolved)
    }

    fn current_path(&self) -> Option<PathBuf> {
        self.current.borrow().clone()
    }
}

/// Restores the previous current path on drop.
struct ScopedPath<'a> {
    cell: &'a RefCell<Option<PathBuf>>,
    saved: Option<PathBuf>,
}

impl<'a> ScopedPath<'a> {
    fn enter(cell: &'a RefCell<Option<PathBuf>>, path: PathBuf) -> Self {
        let saved = cell.replace(Some(path));
        Self { cell, saved }
    }
}

impl Drop for ScopedPath<'_> {
    fn drop(&mut self) {
        self.cell.replace(self.saved.take());
    }
}
