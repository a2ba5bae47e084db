// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Namespaces: named, mutable containers of symbol bindings.
//!
//! The primary namespace owns its bindings. A nested namespace is owned by
//! the binding that created it (a `Value::Namespace` stored in its parent);
//! the parent additionally keeps a weak reference for introspection, and the
//! child keeps a weak back-reference for symbol resolution.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::string::String;
use std::vec::Vec;

use super::Value;

/// Shared handle to a namespace.
pub type NamespaceRef = Rc<Namespace>;

/// A named container of bindings.
pub struct Namespace {
    /// Fully qualified, dot-separated name (e.g. `lona.core.Sort`).
    name: Rc<str>,
    bindings: RefCell<BTreeMap<Rc<str>, Value>>,
    parent: Option<Weak<Namespace>>,
    children: RefCell<Vec<Weak<Namespace>>>,
}

impl Namespace {
    /// Create a root namespace with no parent.
    #[must_use]
    pub fn new_root(name: &str) -> NamespaceRef {
        Rc::new(Self {
            name: Rc::from(name),
            bindings: RefCell::new(BTreeMap::new()),
            parent: None,
            children: RefCell::new(Vec::new()),
        })
    }

    /// Create a namespace nested inside `parent`.
    ///
    /// The parent only records a weak reference. The caller is expected to
    /// bind the returned handle somewhere, otherwise the namespace is dropped
    /// as soon as the handle goes out of scope.
    #[must_use]
    pub fn new_child(parent: &NamespaceRef, short_name: &str) -> NamespaceRef {
        let name = format!("{}.{short_name}", parent.name);
        let child = Rc::new(Self {
            name: Rc::from(name.as_str()),
            bindings: RefCell::new(BTreeMap::new()),
            parent: Some(Rc::downgrade(parent)),
            children: RefCell::new(Vec::new()),
        });
        let mut children = parent.children.borrow_mut();
        children.retain(|w| w.strong_count() > 0);
        children.push(Rc::downgrade(&child));
        drop(children);
        child
    }

    /// Fully qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last segment of the qualified name.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or("")
    }

    /// Bind `name` to `value`, returning the previous binding if any.
    ///
    /// Rebinding overwrites: the last definition wins.
    pub fn define(&self, name: &str, value: Value) -> Option<Value> {
        self.bindings.borrow_mut().insert(Rc::from(name), value)
    }

    /// Look up a binding in this namespace only.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.borrow().get(name).cloned()
    }

    /// Check whether this namespace binds `name` directly.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    /// Look up a binding here, then in each enclosing namespace.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.get(name) {
            return Some(value);
        }
        let mut current = self.parent();
        while let Some(ns) = current {
            if let Some(value) = ns.get(name) {
                return Some(value);
            }
            current = ns.parent();
        }
        None
    }

    /// Names bound directly in this namespace, in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.bindings
            .borrow()
            .keys()
            .map(|k| String::from(&**k))
            .collect()
    }

    /// Number of direct bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    /// Whether the namespace has no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }

    /// The enclosing namespace, if it is still alive.
    #[must_use]
    pub fn parent(&self) -> Option<NamespaceRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Entries in the child list, dead ones included.
    #[cfg(test)]
    #[must_use]
    pub(super) fn child_slots(&self) -> usize {
        self.children.borrow().len()
    }

    /// Live nested namespaces, in creation order.
    #[must_use]
    pub fn children(&self) -> Vec<NamespaceRef> {
        self.children
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// Find a live nested namespace by its short name.
    #[must_use]
    pub fn child(&self, short_name: &str) -> Option<NamespaceRef> {
        self.children()
            .into_iter()
            .find(|ns| ns.short_name() == short_name)
    }

    /// This namespace followed by every live descendant, depth first.
    #[must_use]
    pub fn walk(self: &Rc<Self>) -> Vec<NamespaceRef> {
        let mut out = Vec::new();
        let mut pending = std::vec![Rc::clone(self)];
        while let Some(ns) = pending.pop() {
            let mut children = ns.children();
            children.reverse();
            out.push(ns);
            pending.extend(children);
        }
        out
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("name", &self.name)
            .field("bindings", &self.len())
            .finish_non_exhaustive()
    }
}
