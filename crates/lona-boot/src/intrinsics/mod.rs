// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Built-in functions implemented in Rust.
//!
//! These are seeded into the primary namespace before the first inclusion
//! and are everything the earliest library units can build on. Names with
//! a `%` prefix are thin shims over the [`Platform`] and the string bridge;
//! library code wraps them in friendlier functions.


mod arithmetic;
mod collection;
mod host;

use std::fmt;
use std::vec::Vec;

use crate::bridge::BridgeError;
use crate::eval::EvalError;
use crate::platform::{EnvError, Platform};
use crate::runtime::Runtime;
use crate::value::{NamespaceRef, Value};

/// Intrinsic function IDs.
///
/// These match the order of the name table.
pub mod id {
    /// `(+ n*)`
    pub const ADD: u16 = 0;
    /// `(- n+)`
    pub const SUB: u16 = 1;
    /// `(* n*)`
    pub const MUL: u16 = 2;
    /// `(/ n n+)`, truncating
    pub const DIV: u16 = 3;
    /// `(mod a b)`, sign of the divisor
    pub const MOD: u16 = 4;
    /// `(= x y*)`
    pub const EQ: u16 = 5;
    /// `(< n n*)`
    pub const LT: u16 = 6;
    /// `(> n n*)`
    pub const GT: u16 = 7;
    /// `(<= n n*)`
    pub const LE: u16 = 8;
    /// `(>= n n*)`
    pub const GE: u16 = 9;
    /// `(not x)`
    pub const NOT: u16 = 10;
    /// `(nil? x)`
    pub const IS_NIL: u16 = 11;
    /// `(integer? x)`
    pub const IS_INT: u16 = 12;
    /// `(string? x)`
    pub const IS_STR: u16 = 13;
    /// `(keyword? x)`
    pub const IS_KEYWORD: u16 = 14;
    /// `(symbol? x)`
    pub const IS_SYMBOL: u16 = 15;
    /// `(tuple? x)`
    pub const IS_TUPLE: u16 = 16;
    /// `(fn? x)`
    pub const IS_FN: u16 = 17;
    /// `(namespace? x)`
    pub const IS_NAMESPACE: u16 = 18;
    /// `(str x*)`: strings verbatim, nil as empty, everything else printed
    pub const STR: u16 = 19;
    /// `(tuple x*)`
    pub const TUPLE: u16 = 20;
    /// `(count coll)`
    pub const COUNT: u16 = 21;
    /// `(nth coll i default?)`
    pub const NTH: u16 = 22;
    /// `(conj coll x*)`
    pub const CONJ: u16 = 23;
    /// `(slice coll start end?)`
    pub const SLICE: u16 = 24;
    /// `(ns-name ns)`
    pub const NS_NAME: u16 = 25;
    /// `(ns-names ns)`
    pub const NS_NAMES: u16 = 26;
    /// `(source-path)`: unit currently being loaded, or nil
    pub const SOURCE_PATH: u16 = 27;
    /// `(apply f x* coll)`
    pub const APPLY: u16 = 28;
    /// `(%type x)`: type name as a keyword
    pub const TYPE: u16 = 29;
    /// `(%getenv name)`
    pub const GETENV: u16 = 30;
    /// `(%setenv name value)`
    pub const SETENV: u16 = 31;
    /// `(%now-ns)`
    pub const NOW_NS: u16 = 32;
    /// `(%cpu-threads)`
    pub const CPU_THREADS: u16 = 33;
    /// `(%working-dir)`
    pub const WORKING_DIR: u16 = 34;
    /// `(%path-dirname p)`
    pub const PATH_DIRNAME: u16 = 35;
    /// `(%path-join p p*)`
    pub const PATH_JOIN: u16 = 36;
    /// `(%path-normalize p)`
    pub const PATH_NORMALIZE: u16 = 37;
    /// `(%concat s*)`
    pub const CONCAT: u16 = 38;
    /// `(%alloc-string n)`
    pub const ALLOC_STRING: u16 = 39;
    /// `(%split s sep)`
    pub const SPLIT: u16 = 40;
    /// `(%parse-int s)`: integer or nil
    pub const PARSE_INT: u16 = 41;
    /// `(%diagnostic s)`
    pub const DIAGNOSTIC: u16 = 42;
}

/// Number of defined intrinsics.
pub const INTRINSIC_COUNT: usize = 43;

/// Intrinsic name lookup table.
const INTRINSIC_NAMES: [&str; INTRINSIC_COUNT] = [
    "+",               // 0: ADD
    "-",               // 1: SUB
    "*",               // 2: MUL
    "/",               // 3: DIV
    "mod",             // 4: MOD
    "=",               // 5: EQ
    "<",               // 6: LT
    ">",               // 7: GT
    "<=",              // 8: LE
    ">=",              // 9: GE
    "not",             // 10: NOT
    "nil?",            // 11: IS_NIL
    "integer?",        // 12: IS_INT
    "string?",         // 13: IS_STR
    "keyword?",        // 14: IS_KEYWORD
    "symbol?",         // 15: IS_SYMBOL
    "tuple?",          // 16: IS_TUPLE
    "fn?",             // 17: IS_FN
    "namespace?",      // 18: IS_NAMESPACE
    "str",             // 19: STR
    "tuple",           // 20: TUPLE
    "count",           // 21: COUNT
    "nth",             // 22: NTH
    "conj",            // 23: CONJ
    "slice",           // 24: SLICE
    "ns-name",         // 25: NS_NAME
    "ns-names",        // 26: NS_NAMES
    "source-path",     // 27: SOURCE_PATH
    "apply",           // 28: APPLY
    "%type",           // 29: TYPE
    "%getenv",         // 30: GETENV
    "%setenv",         // 31: SETENV
    "%now-ns",         // 32: NOW_NS
    "%cpu-threads",    // 33: CPU_THREADS
    "%working-dir",    // 34: WORKING_DIR
    "%path-dirname",   // 35: PATH_DIRNAME
    "%path-join",      // 36: PATH_JOIN
    "%path-normalize", // 37: PATH_NORMALIZE
    "%concat",         // 38: CONCAT
    "%alloc-string",   // 39: ALLOC_STRING
    "%split",          // 40: SPLIT
    "%parse-int",      // 41: PARSE_INT
    "%diagnostic",     // 42: DIAGNOSTIC
];

/// Look up an intrinsic ID by name.
#[must_use]
pub fn lookup_intrinsic(name: &str) -> Option<u16> {
    INTRINSIC_NAMES
        .iter()
        .position(|&n| n == name)
        .map(|i| i as u16)
}

/// Get the name of an intrinsic by ID.
#[must_use]
pub fn intrinsic_name(id: u16) -> Option<&'static str> {
    INTRINSIC_NAMES.get(id as usize).copied()
}

/// Every intrinsic name, in ID order.
#[must_use]
pub const fn names() -> &'static [&'static str] {
    &INTRINSIC_NAMES
}

/// Bind every intrinsic in `namespace`.
pub fn seed(namespace: &NamespaceRef) {
    for (id, name) in INTRINSIC_NAMES.iter().enumerate() {
        namespace.define(name, Value::native_fn(id as u16));
    }
}

/// Runtime error from intrinsic execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntrinsicError {
    /// Type error: expected a specific type.
    TypeError {
        /// Which intrinsic was called.
        intrinsic: u16,
        /// Which argument (0-indexed).
        arg: usize,
        /// What type was expected.
        expected: &'static str,
    },
    /// Wrong number of arguments.
    Arity {
        /// Which intrinsic was called.
        intrinsic: u16,
        /// How many arguments were given.
        got: usize,
    },
    /// Division by zero.
    DivisionByZero,
    /// Integer overflow.
    Overflow,
    /// Index outside a collection.
    IndexOutOfBounds {
        /// Requested index.
        index: i64,
        /// Collection length.
        len: usize,
    },
    /// Unknown intrinsic ID.
    UnknownIntrinsic(u16),
    /// String shim refused an allocation.
    Bridge(BridgeError),
    /// Environment update rejected by the platform.
    Env(EnvError),
}

impl fmt::Display for IntrinsicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |id: &u16| intrinsic_name(*id).unwrap_or("?");
        match self {
            Self::TypeError {
                intrinsic,
                arg,
                expected,
            } => write!(
                f,
                "{}: argument {} must be {expected}",
                name(intrinsic),
                arg + 1
            ),
            Self::Arity { intrinsic, got } => {
                write!(f, "{}: wrong number of arguments ({got})", name(intrinsic))
            }
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::Overflow => write!(f, "integer overflow"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::UnknownIntrinsic(id) => write!(f, "unknown intrinsic {id}"),
            Self::Bridge(e) => write!(f, "{e}"),
            Self::Env(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for IntrinsicError {}

/// Execute an intrinsic function.
///
/// # Errors
///
/// Returns an error if the intrinsic fails (type error, division by zero,
/// etc.) or, for `apply`, if the applied function fails.
pub fn call<P: Platform>(
    rt: &mut Runtime<P>,
    intrinsic_id: u16,
    args: Vec<Value>,
) -> Result<Value, EvalError> {
    let value = match intrinsic_id {
        id::ADD => arithmetic::add(&args)?,
        id::SUB => arithmetic::sub(&args)?,
        id::MUL => arithmetic::mul(&args)?,
        id::DIV => arithmetic::div(&args)?,
        id::MOD => arithmetic::modulo(&args)?,
        id::EQ => {
            expect_min(intrinsic_id, &args, 1)?;
            Value::bool(args.windows(2).all(|w| w[0] == w[1]))
        }
        id::LT => arithmetic::compare(intrinsic_id, &args, |a, b| a < b)?,
        id::GT => arithmetic::compare(intrinsic_id, &args, |a, b| a > b)?,
        id::LE => arithmetic::compare(intrinsic_id, &args, |a, b| a <= b)?,
        id::GE => arithmetic::compare(intrinsic_id, &args, |a, b| a >= b)?,
        id::NOT => Value::bool(!single(intrinsic_id, &args)?.is_truthy()),
        id::IS_NIL => Value::bool(single(intrinsic_id, &args)?.is_nil()),
        id::IS_INT => Value::bool(matches!(single(intrinsic_id, &args)?, Value::Int(_))),
        id::IS_STR => Value::bool(matches!(single(intrinsic_id, &args)?, Value::String(_))),
        id::IS_KEYWORD => Value::bool(matches!(single(intrinsic_id, &args)?, Value::Keyword(_))),
        id::IS_SYMBOL => Value::bool(matches!(single(intrinsic_id, &args)?, Value::Symbol(_))),
        id::IS_TUPLE => Value::bool(matches!(single(intrinsic_id, &args)?, Value::Tuple(_))),
        id::IS_FN => Value::bool(single(intrinsic_id, &args)?.is_callable()),
        id::IS_NAMESPACE => Value::bool(matches!(
            single(intrinsic_id, &args)?,
            Value::Namespace(_)
        )),
        id::STR => collection::str(&args)?,
        id::TUPLE => Value::tuple(args),
        id::COUNT => collection::count(&args)?,
        id::NTH => collection::nth(&args)?,
        id::CONJ => collection::conj(args)?,
        id::SLICE => collection::slice(&args)?,
        id::NS_NAME => {
            let ns = expect_namespace(intrinsic_id, &args, 0)?;
            expect_exact(intrinsic_id, &args, 1)?;
            Value::string(ns.name())
        }
        id::NS_NAMES => {
            let ns = expect_namespace(intrinsic_id, &args, 0)?;
            expect_exact(intrinsic_id, &args, 1)?;
            Value::tuple(ns.names().iter().map(|n| Value::string(n)).collect())
        }
        id::SOURCE_PATH => {
            expect_exact(intrinsic_id, &args, 0)?;
            rt.current_source()
                .map_or(Value::Nil, |p| Value::string(&p.to_string_lossy()))
        }
        id::APPLY => return apply_spread(rt, args),
        id::TYPE => Value::keyword(single(intrinsic_id, &args)?.type_name()),
        _ => host::call(rt, intrinsic_id, &args)?,
    };
    Ok(value)
}

/// `(apply f x* coll)`: call `f` with `x*` followed by the items of `coll`.
fn apply_spread<P: Platform>(
    rt: &mut Runtime<P>,
    mut args: Vec<Value>,
) -> Result<Value, EvalError> {
    expect_min(id::APPLY, &args, 2)?;
    let spread = args.pop().unwrap_or_default();
    let tail = match &spread {
        Value::Nil => &[][..],
        other => other.as_seq().ok_or(IntrinsicError::TypeError {
            intrinsic: id::APPLY,
            arg: args.len(),
            expected: "a tuple or list",
        })?,
    };
    let f = args.remove(0);
    args.extend(tail.iter().cloned());
    crate::eval::apply(rt, &f, args)
}

// --- Argument helpers ---

pub(crate) const fn expect_exact(
    intrinsic: u16,
    args: &[Value],
    n: usize,
) -> Result<(), IntrinsicError> {
    if args.len() == n {
        Ok(())
    } else {
        Err(IntrinsicError::Arity {
            intrinsic,
            got: args.len(),
        })
    }
}

pub(crate) const fn expect_min(
    intrinsic: u16,
    args: &[Value],
    n: usize,
) -> Result<(), IntrinsicError> {
    if args.len() >= n {
        Ok(())
    } else {
        Err(IntrinsicError::Arity {
            intrinsic,
            got: args.len(),
        })
    }
}

pub(crate) const fn expect_range(
    intrinsic: u16,
    args: &[Value],
    min: usize,
    max: usize,
) -> Result<(), IntrinsicError> {
    if args.len() >= min && args.len() <= max {
        Ok(())
    } else {
        Err(IntrinsicError::Arity {
            intrinsic,
            got: args.len(),
        })
    }
}

fn single(intrinsic: u16, args: &[Value]) -> Result<&Value, IntrinsicError> {
    expect_exact(intrinsic, args, 1)?;
    Ok(&args[0])
}

pub(crate) fn expect_int(
    intrinsic: u16,
    args: &[Value],
    arg: usize,
) -> Result<i64, IntrinsicError> {
    match args.get(arg) {
        Some(Value::Int(n)) => Ok(*n),
        Some(_) => Err(IntrinsicError::TypeError {
            intrinsic,
            arg,
            expected: "an integer",
        }),
        None => Err(IntrinsicError::Arity {
            intrinsic,
            got: args.len(),
        }),
    }
}

pub(crate) fn expect_str(
    intrinsic: u16,
    args: &[Value],
    arg: usize,
) -> Result<&str, IntrinsicError> {
    match args.get(arg) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(IntrinsicError::TypeError {
            intrinsic,
            arg,
            expected: "a string",
        }),
        None => Err(IntrinsicError::Arity {
            intrinsic,
            got: args.len(),
        }),
    }
}

fn expect_namespace(
    intrinsic: u16,
    args: &[Value],
    arg: usize,
) -> Result<&NamespaceRef, IntrinsicError> {
    match args.get(arg) {
        Some(Value::Namespace(ns)) => Ok(ns),
        Some(_) => Err(IntrinsicError::TypeError {
            intrinsic,
            arg,
            expected: "a namespace",
        }),
        None => Err(IntrinsicError::Arity {
            intrinsic,
            got: args.len(),
        }),
    }
}
