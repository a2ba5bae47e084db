// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for namespaces.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::rc::Rc;

use super::{Namespace, Value};

#[test]
fn define_and_get() {
    let ns = Namespace::new_root("lona.core");
    assert!(ns.is_empty());
    assert_eq!(ns.define("x", Value::int(1)), None);
    assert_eq!(ns.get("x"), Some(Value::int(1)));
    assert!(ns.contains("x"));
    assert_eq!(ns.len(), 1);
}

#[test]
fn redefinition_last_write_wins() {
    let ns = Namespace::new_root("lona.core");
    ns.define("x", Value::int(1));
    assert_eq!(ns.define("x", Value::int(2)), Some(Value::int(1)));
    assert_eq!(ns.get("x"), Some(Value::int(2)));
    assert_eq!(ns.len(), 1);
}

#[test]
fn child_names_are_qualified() {
    let root = Namespace::new_root("lona.core");
    let child = Namespace::new_child(&root, "Sort");
    assert_eq!(child.name(), "lona.core.Sort");
    assert_eq!(child.short_name(), "Sort");
    assert_eq!(root.short_name(), "core");
}

#[test]
fn resolve_walks_parent_chain() {
    let root = Namespace::new_root("lona.core");
    root.define("inc", Value::native_fn(0));
    let child = Namespace::new_child(&root, "Sort");
    root.define("Sort", Value::namespace(Rc::clone(&child)));
    child.define("local", Value::int(7));

    assert_eq!(child.resolve("local"), Some(Value::int(7)));
    assert_eq!(child.resolve("inc"), Some(Value::native_fn(0)));
    assert_eq!(root.resolve("local"), None);
}

#[test]
fn child_lifetime_belongs_to_binding() {
    let root = Namespace::new_root("lona.core");
    let child = Namespace::new_child(&root, "Tmp");
    assert_eq!(root.children().len(), 1);
    drop(child);
    assert!(root.children().is_empty());
    assert!(root.child("Tmp").is_none());
}

#[test]
fn recreated_children_do_not_accumulate() {
    let root = Namespace::new_root("lona.core");
    let kept = Namespace::new_child(&root, "Kept");
    for _ in 0..10 {
        drop(Namespace::new_child(&root, "Tmp"));
    }
    assert_eq!(root.child_slots(), 2);
    assert_eq!(root.children().len(), 1);
    assert_eq!(root.children()[0].name(), kept.name());
}

#[test]
fn bound_child_stays_alive() {
    let root = Namespace::new_root("lona.core");
    let child = Namespace::new_child(&root, "Kept");
    root.define("Kept", Value::namespace(child));
    let found = root.child("Kept").unwrap();
    assert_eq!(found.parent().unwrap().name(), "lona.core");
}

#[test]
fn walk_is_depth_first_in_creation_order() {
    let root = Namespace::new_root("r");
    let a = Namespace::new_child(&root, "a");
    let a1 = Namespace::new_child(&a, "x");
    let b = Namespace::new_child(&root, "b");
    let names: Vec<_> = root.walk().iter().map(|ns| ns.name().to_owned()).collect();
    assert_eq!(names, ["r", "r.a", "r.a.x", "r.b"]);
    drop((a, a1, b));
}

#[test]
fn names_are_sorted() {
    let ns = Namespace::new_root("n");
    ns.define("b", Value::nil());
    ns.define("a", Value::nil());
    assert_eq!(ns.names(), ["a", "b"]);
}
