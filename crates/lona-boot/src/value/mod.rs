// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Value representation for Lonala code evaluated during bootstrap.
//!
//! Immediate values (nil, bool, int, native function ids) are stored inline.
//! Strings, symbols, keywords and sequences are reference counted and
//! immutable. Namespaces and closures compare by identity.

#[cfg(test)]
mod namespace_test;

mod function;
mod namespace;
mod printer;

pub use function::{Closure, Env};
pub use namespace::{Namespace, NamespaceRef};

use std::rc::Rc;
use std::vec::Vec;

/// A Lonala value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The nil value.
    #[default]
    Nil,
    /// Boolean true or false.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// Immutable UTF-8 string.
    String(Rc<str>),
    /// Symbol (identifier), possibly namespace-qualified as `ns/name`.
    Symbol(Rc<str>),
    /// Keyword, stored without the leading `:`.
    Keyword(Rc<str>),
    /// List, the shape of every call form read from source.
    List(Rc<[Value]>),
    /// Tuple, the container type available before any library code runs.
    Tuple(Rc<[Value]>),
    /// Native function (intrinsic id).
    NativeFn(u16),
    /// Function defined in Lonala source.
    Closure(Rc<Closure>),
    /// Namespace reference.
    Namespace(NamespaceRef),
}

impl Value {
    /// Create a nil value.
    #[inline]
    #[must_use]
    pub const fn nil() -> Self {
        Self::Nil
    }

    /// Create a boolean value.
    #[inline]
    #[must_use]
    pub const fn bool(b: bool) -> Self {
        Self::Bool(b)
    }

    /// Create an integer value.
    #[inline]
    #[must_use]
    pub const fn int(n: i64) -> Self {
        Self::Int(n)
    }

    /// Create a string value.
    #[must_use]
    pub fn string(s: &str) -> Self {
        Self::String(Rc::from(s))
    }

    /// Create a symbol value.
    #[must_use]
    pub fn symbol(name: &str) -> Self {
        Self::Symbol(Rc::from(name))
    }

    /// Create a keyword value (without the leading `:`).
    #[must_use]
    pub fn keyword(name: &str) -> Self {
        Self::Keyword(Rc::from(name))
    }

    /// Create a list value.
    #[must_use]
    pub fn list(items: Vec<Self>) -> Self {
        Self::List(Rc::from(items))
    }

    /// Create a tuple value.
    #[must_use]
    pub fn tuple(items: Vec<Self>) -> Self {
        Self::Tuple(Rc::from(items))
    }

    /// Create a native function value from an intrinsic id.
    #[inline]
    #[must_use]
    pub const fn native_fn(id: u16) -> Self {
        Self::NativeFn(id)
    }

    /// Create a namespace value.
    #[must_use]
    pub const fn namespace(ns: NamespaceRef) -> Self {
        Self::Namespace(ns)
    }

    /// Check if this value is nil.
    #[inline]
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Lonala truthiness: only `nil` and `false` are falsey.
    #[inline]
    #[must_use]
    pub const fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil | Self::Bool(false))
    }

    /// Check if this value can be applied to arguments.
    #[inline]
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::NativeFn(_) | Self::Closure(_))
    }

    /// The integer payload, if this is an integer.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match *self {
            Self::Int(n) => Some(n),
            _ => None,
        }
    }

    /// The string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The symbol name, if this is a symbol.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// The elements of a tuple or list.
    #[must_use]
    pub fn as_seq(&self) -> Option<&[Self]> {
        match self {
            Self::Tuple(items) | Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The namespace, if this is a namespace reference.
    #[must_use]
    pub const fn as_namespace(&self) -> Option<&NamespaceRef> {
        match self {
            Self::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    /// Short type name used in error messages and by `%type`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Keyword(_) => "keyword",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::NativeFn(_) | Self::Closure(_) => "fn",
            Self::Namespace(_) => "namespace",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::String(a), Self::String(b))
            | (Self::Symbol(a), Self::Symbol(b))
            | (Self::Keyword(a), Self::Keyword(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::NativeFn(a), Self::NativeFn(b)) => a == b,
            (Self::Closure(a), Self::Closure(b)) => Rc::ptr_eq(a, b),
            (Self::Namespace(a), Self::Namespace(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
