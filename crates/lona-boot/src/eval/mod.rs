// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tree-walking evaluator for library units.
//!
//! Forms are evaluated directly from reader output. Calls in tail position
//! of a closure body (through `if`, `do` and `let`) reuse the caller's
//! Rust frame, so self-recursive library functions written with an
//! accumulator run in constant stack.

#[cfg(test)]
mod eval_test;

mod special;

use std::fmt;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use crate::error::BootError;
use crate::intrinsics::{self, IntrinsicError};
use crate::platform::Platform;
use crate::reader::ReadError;
use crate::runtime::Runtime;
use crate::value::{Closure, Env, NamespaceRef, Value};

/// Maximum nesting of non-tail calls.
pub const MAX_CALL_DEPTH: usize = 256;

/// Error raised while evaluating a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Symbol not bound locally or in any enclosing namespace.
    UnboundSymbol(String),
    /// Malformed special form.
    InvalidSyntax {
        /// The special form.
        form: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// Attempt to call a value that is not a function.
    NotCallable(&'static str),
    /// Wrong number of arguments to a closure.
    Arity {
        /// Function name.
        name: String,
        /// Accepted argument count, e.g. `2` or `1+`.
        expected: String,
        /// Given argument count.
        got: usize,
    },
    /// An intrinsic failed.
    Intrinsic(IntrinsicError),
    /// A closure outlived the namespace it was defined in.
    NamespaceGone(String),
    /// A nested inclusion failed. Carries the inner error unchanged.
    Include(Box<BootError>),
    /// Source text passed to `eval_str` did not parse.
    Read(ReadError),
    /// Non-tail calls nested deeper than [`MAX_CALL_DEPTH`].
    TooDeep,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundSymbol(name) => write!(f, "unbound symbol: {name}"),
            Self::InvalidSyntax { form, reason } => write!(f, "invalid {form}: {reason}"),
            Self::NotCallable(type_name) => write!(f, "cannot call a value of type {type_name}"),
            Self::Arity {
                name,
                expected,
                got,
            } => write!(f, "{name} expects {expected} arguments, got {got}"),
            Self::Intrinsic(e) => write!(f, "{e}"),
            Self::NamespaceGone(name) => {
                write!(f, "namespace of {name} no longer exists")
            }
            Self::Include(e) => write!(f, "{e}"),
            Self::Read(e) => write!(f, "read error: {e}"),
            Self::TooDeep => write!(f, "call depth exceeds {MAX_CALL_DEPTH}"),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<IntrinsicError> for EvalError {
    fn from(e: IntrinsicError) -> Self {
        Self::Intrinsic(e)
    }
}

impl From<ReadError> for EvalError {
    fn from(e: ReadError) -> Self {
        Self::Read(e)
    }
}

/// Result of evaluating a form in tail position.
enum Tail {
    /// Fully evaluated.
    Done(Value),
    /// A call the caller still has to make.
    Call(Value, Vec<Value>),
}

/// Evaluate `form` in `namespace` with local bindings `env`.
///
/// # Errors
///
/// Returns `EvalError` if any part of the form fails to evaluate.
pub fn eval<P: Platform>(
    rt: &mut Runtime<P>,
    namespace: &NamespaceRef,
    env: &Env,
    form: &Value,
) -> Result<Value, EvalError> {
    match eval_tail(rt, namespace, env, form)? {
        Tail::Done(value) => Ok(value),
        Tail::Call(f, args) => apply(rt, &f, args),
    }
}

/// Call `f` with `args`.
///
/// # Errors
///
/// Returns `EvalError` if `f` is not callable, the argument count does not
/// match, or the body fails.
pub fn apply<P: Platform>(
    rt: &mut Runtime<P>,
    f: &Value,
    args: Vec<Value>,
) -> Result<Value, EvalError> {
    rt.enter_call()?;
    let result = apply_loop(rt, f.clone(), args);
    rt.leave_call();
    result
}

fn apply_loop<P: Platform>(
    rt: &mut Runtime<P>,
    mut f: Value,
    mut args: Vec<Value>,
) -> Result<Value, EvalError> {
    loop {
        let closure = match f {
            Value::NativeFn(id) => return intrinsics::call(rt, id, args),
            Value::Closure(c) => c,
            other => return Err(EvalError::NotCallable(other.type_name())),
        };
        let (namespace, env) = bind_arguments(&closure, args)?;
        let Some((last, init)) = closure.body.split_last() else {
            return Ok(Value::Nil);
        };
        for form in init {
            eval(rt, &namespace, &env, form)?;
        }
        match eval_tail(rt, &namespace, &env, last)? {
            Tail::Done(value) => return Ok(value),
            Tail::Call(next, next_args) => {
                f = next;
                args = next_args;
            }
        }
    }
}

/// Build the environment a closure body runs in.
fn bind_arguments(
    closure: &Rc<Closure>,
    mut args: Vec<Value>,
) -> Result<(NamespaceRef, Env), EvalError> {
    if !closure.accepts(args.len()) {
        let expected = if closure.rest.is_some() {
            format!("{}+", closure.params.len())
        } else {
            format!("{}", closure.params.len())
        };
        return Err(EvalError::Arity {
            name: String::from(closure.display_name()),
            expected,
            got: args.len(),
        });
    }
    let namespace = closure
        .namespace()
        .ok_or_else(|| EvalError::NamespaceGone(String::from(closure.display_name())))?;

    let mut env = closure.env.clone();
    if let Some(name) = &closure.name {
        env = env.bind(Rc::clone(name), Value::Closure(Rc::clone(closure)));
    }
    let rest = args.split_off(closure.params.len());
    for (param, arg) in closure.params.iter().zip(args) {
        env = env.bind(Rc::clone(param), arg);
    }
    if let Some(rest_name) = &closure.rest {
        env = env.bind(Rc::clone(rest_name), Value::tuple(rest));
    }
    Ok((namespace, env))
}

fn eval_tail<P: Platform>(
    rt: &mut Runtime<P>,
    namespace: &NamespaceRef,
    env: &Env,
    form: &Value,
) -> Result<Tail, EvalError> {
    match form {
        Value::Symbol(name) => resolve_symbol(namespace, env, name).map(Tail::Done),
        Value::List(items) => {
            let Some((head, rest)) = items.split_first() else {
                return Ok(Tail::Done(form.clone()));
            };
            if let Some(special) = head.as_symbol().and_then(special::SpecialForm::lookup) {
                return special.eval(rt, namespace, env, rest);
            }
            let f = eval(rt, namespace, env, head)?;
            let args = eval_all(rt, namespace, env, rest)?;
            Ok(Tail::Call(f, args))
        }
        Value::Tuple(items) => Ok(Tail::Done(Value::tuple(eval_all(
            rt, namespace, env, items,
        )?))),
        other => Ok(Tail::Done(other.clone())),
    }
}

fn eval_all<P: Platform>(
    rt: &mut Runtime<P>,
    namespace: &NamespaceRef,
    env: &Env,
    forms: &[Value],
) -> Result<Vec<Value>, EvalError> {
    forms
        .iter()
        .map(|form| eval(rt, namespace, env, form))
        .collect()
}

/// Look a symbol up: locals, then the namespace chain, then `ns/name`.
///
/// # Errors
///
/// Returns `EvalError::UnboundSymbol` if nothing binds `name`.
pub fn resolve_symbol(namespace: &NamespaceRef, env: &Env, name: &str) -> Result<Value, EvalError> {
    if let Some(value) = env.lookup(name) {
        return Ok(value);
    }
    if let Some(value) = namespace.resolve(name) {
        return Ok(value);
    }
    if let Some((qualifier, local)) = split_qualified(name) {
        let target = env
            .lookup(qualifier)
            .or_else(|| namespace.resolve(qualifier));
        if let Some(Value::Namespace(target)) = target {
            if let Some(value) = target.get(local) {
                return Ok(value);
            }
        }
    }
    Err(EvalError::UnboundSymbol(String::from(name)))
}

/// Split `ns/name` into its parts. Plain `/` is not qualified.
#[must_use]
pub fn split_qualified(name: &str) -> Option<(&str, &str)> {
    name.split_once('/')
        .filter(|(qualifier, local)| !qualifier.is_empty() && !local.is_empty())
}
