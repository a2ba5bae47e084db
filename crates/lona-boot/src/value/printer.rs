// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Printer for Lonala values.
//!
//! Converts values back to their string representation. Readable values
//! (nil, booleans, integers, strings, symbols, keywords, lists, tuples)
//! print in a form the reader accepts again.

use std::fmt;

use super::Value;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(true) => f.write_str("true"),
            Self::Bool(false) => f.write_str("false"),
            Self::Int(n) => write!(f, "{n}"),
            Self::String(s) => {
                f.write_str("\"")?;
                write_escaped(s, f)?;
                f.write_str("\"")
            }
            Self::Symbol(s) => f.write_str(s),
            Self::Keyword(s) => write!(f, ":{s}"),
            Self::List(items) => write_seq(f, "(", items, ")"),
            Self::Tuple(items) => write_seq(f, "[", items, "]"),
            Self::NativeFn(id) => match crate::intrinsics::intrinsic_name(*id) {
                Some(name) => write!(f, "#<native-fn {name}>"),
                None => write!(f, "#<native-fn {id}>"),
            },
            Self::Closure(c) => write!(f, "#<fn {}>", c.display_name()),
            Self::Namespace(ns) => write!(f, "#<namespace {}>", ns.name()),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(close)
}

fn write_escaped(s: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for c in s.chars() {
        match c {
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            _ => write!(f, "{c}")?,
        }
    }
    Ok(())
}
