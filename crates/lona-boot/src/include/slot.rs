// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The single registration point for the inclusion primitive.

use std::path::PathBuf;
use std::rc::Rc;
use std::vec::Vec;

use tracing::debug;

use super::{IncludePrimitive, Stage};
use crate::error::StageError;

/// Holds the one live definition of the inclusion primitive.
///
/// Stages only advance: installing a stage at or below the active one is
/// rejected, so once `Final` is installed nothing can bring back an
/// earlier definition.
#[derive(Default)]
pub struct IncludeSlot {
    active: Option<Rc<dyn IncludePrimitive>>,
    history: Vec<Stage>,
}

impl IncludeSlot {
    /// An empty slot. `include` fails until a stage is installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active stage.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        self.active.as_ref().map(|p| p.stage())
    }

    /// A handle to the active definition.
    ///
    /// While any handle other than the slot's own is alive the slot
    /// considers an inclusion in progress and refuses to swap.
    #[must_use]
    pub fn active(&self) -> Option<Rc<dyn IncludePrimitive>> {
        self.active.clone()
    }

    /// The unit the active definition is currently loading.
    #[must_use]
    pub fn current_path(&self) -> Option<PathBuf> {
        self.active.as_ref().and_then(|p| p.current_path())
    }

    /// Every stage installed so far, in order.
    #[must_use]
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Check that `requested` could be installed now.
    ///
    /// # Errors
    ///
    /// `Regression` if `requested` does not advance past the active stage,
    /// `IncludeInProgress` if the active definition is still in use.
    pub fn check(&self, requested: Stage) -> Result<(), StageError> {
        let Some(active) = &self.active else {
            return Ok(());
        };
        let current = active.stage();
        if requested <= current {
            return Err(StageError::Regression { current, requested });
        }
        if Rc::strong_count(active) > 1 {
            return Err(StageError::IncludeInProgress { current });
        }
        Ok(())
    }

    /// Replace the active definition with `primitive`.
    ///
    /// The previous definition is removed before the new one is stored.
    ///
    /// # Errors
    ///
    /// See [`IncludeSlot::check`].
    pub fn install(&mut self, primitive: Rc<dyn IncludePrimitive>) -> Result<Stage, StageError> {
        let stage = primitive.stage();
        self.check(stage)?;
        if let Some(previous) = self.active.take() {
            debug!(from = %previous.stage(), to = %stage, "removing inclusion primitive");
        }
        debug_assert!(self.active.is_none());
        self.active = Some(primitive);
        self.history.push(stage);
        Ok(stage)
    }
}

impl core::fmt::Debug for IncludeSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IncludeSlot")
            .field("stage", &self.stage())
            .field("history", &self.history)
            .finish()
    }
}
