// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Closures and their lexical environments.

use std::fmt;
use std::rc::{Rc, Weak};
use std::vec::Vec;

use super::{Namespace, NamespaceRef, Value};

/// One binding in a lexical environment.
struct Frame {
    name: Rc<str>,
    value: Value,
    parent: Env,
}

/// Persistent lexical environment (local bindings from `fn` and `let`).
///
/// Extending an environment never mutates it, so closures can capture
/// the environment they were created in by cloning the handle.
#[derive(Clone, Default)]
pub struct Env(Option<Rc<Frame>>);

impl Env {
    /// The empty environment used for top-level forms.
    #[must_use]
    pub const fn empty() -> Self {
        Self(None)
    }

    /// Return a new environment with `name` bound to `value`.
    #[must_use]
    pub fn bind(&self, name: Rc<str>, value: Value) -> Self {
        Self(Some(Rc::new(Frame {
            name,
            value,
            parent: self.clone(),
        })))
    }

    /// Look up the innermost binding of `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut current = self.0.as_ref();
        while let Some(frame) = current {
            if &*frame.name == name {
                return Some(frame.value.clone());
            }
            current = frame.parent.0.as_ref();
        }
        None
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        let mut current = self.0.as_ref();
        while let Some(frame) = current {
            names.push(&*frame.name);
            current = frame.parent.0.as_ref();
        }
        f.debug_tuple("Env").field(&names).finish()
    }
}

/// A function defined in Lonala source with `fn`.
pub struct Closure {
    /// Optional self-name, bound inside the body for recursion.
    pub name: Option<Rc<str>>,
    /// Fixed positional parameters.
    pub params: Vec<Rc<str>>,
    /// Rest parameter collecting extra arguments into a tuple (`& more`).
    pub rest: Option<Rc<str>>,
    /// Body forms, evaluated in order.
    pub body: Rc<[Value]>,
    /// Captured lexical environment.
    pub env: Env,
    /// Namespace the function was defined in.
    ///
    /// Weak so that a closure bound inside its own namespace does not keep
    /// that namespace alive.
    pub namespace: Weak<Namespace>,
}

impl Closure {
    /// The defining namespace, if it is still alive.
    #[must_use]
    pub fn namespace(&self) -> Option<NamespaceRef> {
        self.namespace.upgrade()
    }

    /// Whether `argc` arguments satisfy this closure's parameter list.
    #[must_use]
    pub fn accepts(&self, argc: usize) -> bool {
        if self.rest.is_some() {
            argc >= self.params.len()
        } else {
            argc == self.params.len()
        }
    }

    /// Display name for errors and printing.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("fn")
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("rest", &self.rest)
            .finish_non_exhaustive()
    }
}
