// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the evaluator and its special forms.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::platform::MockPlatform;
use crate::value::Namespace;

fn rt() -> Runtime<MockPlatform> {
    Runtime::new(MockPlatform::new())
}

fn eval_ok(src: &str) -> String {
    rt().eval_str(src).unwrap().to_string()
}

fn eval_err(src: &str) -> EvalError {
    rt().eval_str(src).unwrap_err()
}

// =============================================================================
// Literals and symbols
// =============================================================================

#[test]
fn literals_evaluate_to_themselves() {
    assert_eq!(eval_ok("42"), "42");
    assert_eq!(eval_ok(r#""hi""#), r#""hi""#);
    assert_eq!(eval_ok(":key"), ":key");
    assert_eq!(eval_ok("nil"), "nil");
    assert_eq!(eval_ok("()"), "()");
}

#[test]
fn tuples_evaluate_their_items() {
    assert_eq!(eval_ok("[(+ 1 1) :k [3]]"), "[2 :k [3]]");
}

#[test]
fn empty_source_is_nil() {
    assert_eq!(eval_ok(""), "nil");
    assert_eq!(eval_ok("; only a comment"), "nil");
}

#[test]
fn unbound_symbol() {
    assert_eq!(
        eval_err("no-such-thing"),
        EvalError::UnboundSymbol(String::from("no-such-thing"))
    );
}

#[test]
fn qualified_symbol_resolves_through_namespace_binding() {
    assert_eq!(eval_ok("(defns M (def x 7)) M/x"), "7");
    assert!(matches!(eval_err("(defns M) M/y"), EvalError::UnboundSymbol(_)));
    assert!(matches!(eval_err("(def n 1) n/x"), EvalError::UnboundSymbol(_)));
}

#[test]
fn bare_slash_is_not_qualified() {
    assert_eq!(split_qualified("/"), None);
    assert_eq!(split_qualified("a/"), None);
    assert_eq!(split_qualified("Sort/sort-by"), Some(("Sort", "sort-by")));
}

// =============================================================================
// Special forms
// =============================================================================

#[test]
fn def_binds_and_returns_value() {
    assert_eq!(eval_ok("(def a 1)"), "1");
    assert_eq!(eval_ok("(def a 1) (def b (+ a 1)) b"), "2");
}

#[test]
fn redefinition_replaces_binding() {
    assert_eq!(eval_ok("(def a 1) (def a 2) a"), "2");
}

#[test]
fn def_names_anonymous_functions() {
    assert_eq!(eval_ok("(def twice (fn [x] (* 2 x))) twice"), "#<fn twice>");
    assert_eq!(eval_ok("(def f (fn inner [x] x)) f"), "#<fn inner>");
}

#[test]
fn def_rejects_bad_names() {
    assert!(matches!(
        eval_err("(def a/b 1)"),
        EvalError::InvalidSyntax { form: "def", .. }
    ));
    assert!(matches!(
        eval_err("(def 1 1)"),
        EvalError::InvalidSyntax { form: "def", .. }
    ));
}

#[test]
fn quote_returns_form_unevaluated() {
    assert_eq!(eval_ok("(quote (a b [c]))"), "(a b [c])");
}

#[test]
fn if_truthiness() {
    assert_eq!(eval_ok("(if nil 1 2)"), "2");
    assert_eq!(eval_ok("(if false 1 2)"), "2");
    assert_eq!(eval_ok("(if 0 1 2)"), "1");
    assert_eq!(eval_ok(r#"(if "" 1 2)"#), "1");
    assert_eq!(eval_ok("(if false 1)"), "nil");
}

#[test]
fn do_returns_last() {
    assert_eq!(eval_ok("(do (def a 1) (def b 2) (+ a b))"), "3");
    assert_eq!(eval_ok("(do)"), "nil");
}

#[test]
fn let_binds_in_order() {
    assert_eq!(eval_ok("(let [a 1 b (+ a 1)] (* a b))"), "2");
    assert!(matches!(
        eval_err("(let [a] a)"),
        EvalError::InvalidSyntax { form: "let", .. }
    ));
}

#[test]
fn special_form_names_are_reserved() {
    assert_eq!(eval_ok("(def if 5) (if true 1 2)"), "1");
}

// =============================================================================
// Functions
// =============================================================================

#[test]
fn closures_capture_environment() {
    assert_eq!(
        eval_ok("(def adder (fn [n] (fn [x] (+ x n)))) ((adder 2) 3)"),
        "5"
    );
}

#[test]
fn rest_parameters_collect_extra_arguments() {
    assert_eq!(eval_ok("((fn [a & more] more) 1 2 3)"), "[2 3]");
    assert_eq!(eval_ok("((fn [a & more] more) 1)"), "[]");
}

#[test]
fn arity_is_checked() {
    let err = eval_err("(def f (fn [a b] a)) (f 1)");
    assert_eq!(
        err,
        EvalError::Arity {
            name: String::from("f"),
            expected: String::from("2"),
            got: 1,
        }
    );
    assert_eq!(err.to_string(), "f expects 2 arguments, got 1");
    let err = eval_err("((fn [a & r] a))");
    assert!(matches!(err, EvalError::Arity { ref expected, .. } if expected == "1+"));
}

#[test]
fn calling_a_non_function() {
    assert_eq!(eval_err("(1 2)"), EvalError::NotCallable("integer"));
}

#[test]
fn named_fn_can_recurse_without_a_binding() {
    assert_eq!(
        eval_ok("((fn fact [n] (if (= n 0) 1 (* n (fact (- n 1))))) 10)"),
        "3628800"
    );
}

#[test]
fn tail_calls_run_in_constant_stack() {
    let src = "(def count-down (fn [n acc] (if (= n 0) acc (count-down (- n 1) (+ acc 1)))))
               (count-down 100000 0)";
    assert_eq!(eval_ok(src), "100000");
}

#[test]
fn mutual_tail_calls_through_let_and_do() {
    let src = "(def ev? (fn [n] (if (= n 0) true (do (odd? (- n 1))))))
               (def odd? (fn [n] (if (= n 0) false (let [m (- n 1)] (ev? m)))))
               (ev? 5001)";
    assert_eq!(eval_ok(src), "false");
}

#[test]
fn deep_non_tail_recursion_is_bounded() {
    // Generous stack so the limit, not the thread, stops the recursion
    let handle = std::thread::Builder::new()
        .stack_size(256 << 20)
        .spawn(|| {
            let mut rt = rt();
            rt.eval_str("(def deep (fn [n] (+ 1 (deep n))))").unwrap();
            let err = rt.eval_str("(deep 0)").unwrap_err();
            let after = rt.eval_str("(+ 1 2)").unwrap().to_string();
            (err, after)
        })
        .unwrap();
    let (err, after) = handle.join().unwrap();
    assert_eq!(err, EvalError::TooDeep);
    assert_eq!(after, "3");
}

#[test]
fn closure_outliving_its_namespace() {
    let mut rt = rt();
    let scratch = Namespace::new_root("scratch");
    let f = rt.eval_in(&scratch, "(fn [] 1)").unwrap();
    drop(scratch);
    assert!(matches!(
        apply(&mut rt, &f, Vec::new()),
        Err(EvalError::NamespaceGone(_))
    ));
}

// =============================================================================
// Nested namespaces
// =============================================================================

#[test]
fn defns_creates_child_namespace() {
    let mut rt = rt();
    rt.eval_str("(defns Geo (def origin [0 0]) (def twice (fn [x] (+ x x))))")
        .unwrap();
    let geo = rt.primary().child("Geo").unwrap();
    assert_eq!(geo.name(), "lona.core.Geo");
    assert!(geo.contains("origin"));
    assert!(!rt.primary().contains("origin"));
    assert_eq!(rt.eval_str("(Geo/twice 4)").unwrap().to_string(), "8");
}

#[test]
fn defns_reopens_existing_child() {
    assert_eq!(
        eval_ok("(defns M (def x 1)) (defns M (def y 2)) [M/x M/y]"),
        "[1 2]"
    );
}

#[test]
fn child_sees_parent_bindings_but_not_siblings() {
    assert_eq!(eval_ok("(def base 10) (defns M (def x (+ base 1))) M/x"), "11");
    assert!(matches!(
        eval_err("(defns A (def a 1)) (defns B (def b a))"),
        EvalError::UnboundSymbol(_)
    ));
}

#[test]
fn functions_resolve_in_their_defining_namespace() {
    let src = "(defns M (def secret 42) (def reveal (fn [] secret))) (M/reveal)";
    assert_eq!(eval_ok(src), "42");
}

#[test]
fn defns_rejects_dotted_names() {
    assert!(matches!(
        eval_err("(defns a.b)"),
        EvalError::InvalidSyntax { form: "defns", .. }
    ));
}

// =============================================================================
// include outside a unit
// =============================================================================

#[test]
fn include_without_stage_is_an_include_error() {
    let err = eval_err(r#"(include "x.lona")"#);
    assert_eq!(
        err,
        EvalError::Include(Box::new(BootError::Stage(
            crate::error::StageError::NoActivePrimitive
        )))
    );
}

#[test]
fn include_path_must_be_a_string() {
    assert!(matches!(
        eval_err("(include 1)"),
        EvalError::InvalidSyntax { form: "include", .. }
    ));
    assert!(matches!(
        eval_err(r#"(include 1 "x")"#),
        EvalError::InvalidSyntax { form: "include", .. }
    ));
}
