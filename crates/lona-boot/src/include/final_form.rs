// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Final inclusion, used for the rest of the image's life.

use std::path::{Path, PathBuf};

use super::path::{dirname, resolve};
use super::{IncludeHost, IncludePrimitive, Mapper, SourceStack, Stage};
use crate::error::BootError;
use crate::value::NamespaceRef;

/// Resolves like [`super::RelativeInclude`] but keeps the current unit on
/// the runtime's [`SourceStack`], where other code can see it, and accepts
/// a mapping function.
#[derive(Debug)]
pub struct FinalInclude {
    sources: SourceStack,
}

impl FinalInclude {
    /// A definition tracking units on `sources`.
    #[must_use]
    pub const fn new(sources: SourceStack) -> Self {
        Self { sources }
    }
}

impl IncludePrimitive for FinalInclude {
    fn stage(&self) -> Stage {
        Stage::Final
    }

    fn include_with(
        &self,
        host: &mut dyn IncludeHost,
        namespace: &NamespaceRef,
        path: &str,
        mapper: &Mapper,
    ) -> Result<PathBuf, BootError> {
        let base = self
            .sources
            .current()
            .map_or_else(|| host.working_dir(), |current| dirname(&current));
        let resolved = resolve(&base, Path::new(path));
        {
            let _frame = self.sources.push(resolved.clone());
            host.load_unit(namespace, &resolved, mapper)?;
        }
        host.record(namespace, &resolved);
        Ok(resolved)
    }

    fn current_path(&self) -> Option<PathBuf> {
        self.sources.current()
    }
}
