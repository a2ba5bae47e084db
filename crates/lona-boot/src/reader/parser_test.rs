// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the Lonala parser.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::{MAX_NESTING, ParseError, Parser, ReadError, read, read_all};
use crate::value::Value;

#[test]
fn read_empty_input() {
    assert_eq!(read("").unwrap(), None);
    assert_eq!(read("  ; only a comment").unwrap(), None);
}

#[test]
fn read_scalars() {
    assert_eq!(read("42").unwrap(), Some(Value::int(42)));
    assert_eq!(read("\"s\"").unwrap(), Some(Value::string("s")));
    assert_eq!(read(":k").unwrap(), Some(Value::keyword("k")));
    assert_eq!(read("sym").unwrap(), Some(Value::symbol("sym")));
}

#[test]
fn read_nested_collections() {
    let v = read("(def x [1 (f) []])").unwrap().unwrap();
    assert_eq!(
        v,
        Value::list(vec![
            Value::symbol("def"),
            Value::symbol("x"),
            Value::tuple(vec![
                Value::int(1),
                Value::list(vec![Value::symbol("f")]),
                Value::tuple(vec![]),
            ]),
        ])
    );
}

#[test]
fn read_quote_shorthand() {
    assert_eq!(
        read("'(a b)").unwrap().unwrap(),
        Value::list(vec![
            Value::symbol("quote"),
            Value::list(vec![Value::symbol("a"), Value::symbol("b")]),
        ])
    );
}

#[test]
fn read_errors() {
    assert_eq!(read("(1 2"), Err(ReadError::Parse(ParseError::UnexpectedEof)));
    assert_eq!(read(")"), Err(ReadError::Parse(ParseError::UnmatchedRParen)));
    assert_eq!(read("]"), Err(ReadError::Parse(ParseError::UnmatchedRBracket)));
    assert_eq!(read("(1 ]"), Err(ReadError::Parse(ParseError::UnmatchedRBracket)));
    assert_eq!(read("'"), Err(ReadError::Parse(ParseError::UnexpectedEof)));
}

#[test]
fn read_all_forms() {
    let forms = read_all("(def a 1)\n(def b 2) 3").unwrap();
    assert_eq!(forms.len(), 3);
    assert_eq!(forms[2], Value::int(3));
}

#[test]
fn parser_reports_form_start_line() {
    let src = "; unit header\n(def a 1)\n\n(def b\n  2)\n(oops";
    let mut parser = Parser::new(src);
    parser.read().unwrap();
    assert_eq!(parser.line(), 2);
    parser.read().unwrap();
    assert_eq!(parser.line(), 4);
    assert!(parser.read().is_err());
    assert_eq!(parser.line(), 6);
}

#[test]
fn nesting_is_bounded() {
    let nested = |depth: usize| format!("{}{}", "[".repeat(depth), "]".repeat(depth));
    assert!(read(&nested(MAX_NESTING)).unwrap().is_some());
    assert_eq!(
        read(&nested(MAX_NESTING + 1)),
        Err(ReadError::Parse(ParseError::TooDeep))
    );
    // Fails at the limit without walking the rest of the input
    let runaway = format!("(def x {}1", "[".repeat(200_000));
    assert_eq!(read(&runaway), Err(ReadError::Parse(ParseError::TooDeep)));
    let quotes = format!("{}x", "'".repeat(MAX_NESTING + 1));
    assert_eq!(read(&quotes), Err(ReadError::Parse(ParseError::TooDeep)));
}
