// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The stack of source units currently being loaded.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::vec::Vec;

/// Paths of the units being loaded, innermost last.
///
/// Handles are cheap clones sharing one stack. Frames are pushed with
/// [`SourceStack::push`] and popped when the returned guard drops, so an
/// inclusion that fails still restores its caller's context.
///
/// Not thread safe: the bootstrap is single threaded.
#[derive(Debug, Clone, Default)]
pub struct SourceStack(Rc<RefCell<Vec<PathBuf>>>);

impl SourceStack {
    /// An empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The unit currently being loaded.
    #[must_use]
    pub fn current(&self) -> Option<PathBuf> {
        self.0.borrow().last().cloned()
    }

    /// Number of nested units being loaded.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.borrow().len()
    }

    /// Make `path` the current unit until the returned frame drops.
    #[must_use = "the frame pops as soon as it is dropped"]
    pub fn push(&self, path: PathBuf) -> SourceFrame {
        let mut stack = self.0.borrow_mut();
        let depth = stack.len();
        stack.push(path);
        SourceFrame {
            stack: self.clone(),
            depth,
        }
    }
}

/// Guard returned by [`SourceStack::push`].
#[derive(Debug)]
pub struct SourceFrame {
    stack: SourceStack,
    depth: usize,
}

impl Drop for SourceFrame {
    fn drop(&mut self) {
        self.stack.0.borrow_mut().truncate(self.depth);
    }
}
