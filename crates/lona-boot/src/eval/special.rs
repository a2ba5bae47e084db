// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Special forms.
//!
//! These names are reserved: a list whose head is one of them is never
//! treated as a call, whatever the symbol is bound to.

use std::rc::Rc;
use std::vec::Vec;

use super::{EvalError, Tail, eval};
use crate::include::Mapper;
use crate::platform::Platform;
use crate::runtime::Runtime;
use crate::value::{Closure, Env, Namespace, NamespaceRef, Value};

/// The special forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialForm {
    Def,
    Quote,
    Do,
    If,
    Fn,
    Let,
    Defns,
    Include,
}

impl SpecialForm {
    /// Every special form with its name.
    pub const ALL: [(&'static str, Self); 8] = [
        ("def", Self::Def),
        ("quote", Self::Quote),
        ("do", Self::Do),
        ("if", Self::If),
        ("fn", Self::Fn),
        ("let", Self::Let),
        ("defns", Self::Defns),
        ("include", Self::Include),
    ];

    /// Find a special form by name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, form)| form)
    }

    pub(super) fn eval<P: Platform>(
        self,
        rt: &mut Runtime<P>,
        namespace: &NamespaceRef,
        env: &Env,
        args: &[Value],
    ) -> Result<Tail, EvalError> {
        match self {
            Self::Def => eval_def(rt, namespace, env, args).map(Tail::Done),
            Self::Quote => match args {
                [form] => Ok(Tail::Done(form.clone())),
                _ => Err(syntax("quote", "expected exactly one form")),
            },
            Self::Do => eval_body(rt, namespace, env, args),
            Self::If => eval_if(rt, namespace, env, args),
            Self::Fn => make_fn(namespace, env, args).map(Tail::Done),
            Self::Let => eval_let(rt, namespace, env, args),
            Self::Defns => eval_defns(rt, namespace, env, args).map(Tail::Done),
            Self::Include => eval_include(rt, namespace, env, args).map(Tail::Done),
        }
    }
}

const fn syntax(form: &'static str, reason: &'static str) -> EvalError {
    EvalError::InvalidSyntax { form, reason }
}

/// Evaluate forms in order; the last one in tail position.
fn eval_body<P: Platform>(
    rt: &mut Runtime<P>,
    namespace: &NamespaceRef,
    env: &Env,
    forms: &[Value],
) -> Result<Tail, EvalError> {
    let Some((last, init)) = forms.split_last() else {
        return Ok(Tail::Done(Value::Nil));
    };
    for form in init {
        eval(rt, namespace, env, form)?;
    }
    super::eval_tail(rt, namespace, env, last)
}

/// `(def name expr)`
fn eval_def<P: Platform>(
    rt: &mut Runtime<P>,
    namespace: &NamespaceRef,
    env: &Env,
    args: &[Value],
) -> Result<Value, EvalError> {
    let [name, expr] = args else {
        return Err(syntax("def", "expected a name and a value"));
    };
    let Some(name) = name.as_symbol() else {
        return Err(syntax("def", "name must be a symbol"));
    };
    if super::split_qualified(name).is_some() {
        return Err(syntax("def", "name must not be qualified"));
    }
    let value = match eval(rt, namespace, env, expr)? {
        Value::Closure(c) if c.name.is_none() => Value::Closure(Rc::new(Closure {
            name: Some(Rc::from(name)),
            params: c.params.clone(),
            rest: c.rest.clone(),
            body: Rc::clone(&c.body),
            env: c.env.clone(),
            namespace: c.namespace.clone(),
        })),
        other => other,
    };
    namespace.define(name, value.clone());
    Ok(value)
}

/// `(if test then else?)`
fn eval_if<P: Platform>(
    rt: &mut Runtime<P>,
    namespace: &NamespaceRef,
    env: &Env,
    args: &[Value],
) -> Result<Tail, EvalError> {
    let (test, then, otherwise) = match args {
        [test, then] => (test, then, None),
        [test, then, otherwise] => (test, then, Some(otherwise)),
        _ => return Err(syntax("if", "expected test, then and optional else")),
    };
    if eval(rt, namespace, env, test)?.is_truthy() {
        super::eval_tail(rt, namespace, env, then)
    } else if let Some(otherwise) = otherwise {
        super::eval_tail(rt, namespace, env, otherwise)
    } else {
        Ok(Tail::Done(Value::Nil))
    }
}

/// `(fn name? [params* (& rest)?] body*)`
fn make_fn(namespace: &NamespaceRef, env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let (name, rest_args) = match args {
        [Value::Symbol(name), rest @ ..] => (Some(Rc::clone(name)), rest),
        _ => (None, args),
    };
    let Some((Value::Tuple(param_forms), body)) = rest_args.split_first() else {
        return Err(syntax("fn", "expected a parameter tuple"));
    };

    let mut params = Vec::new();
    let mut rest = None;
    let mut iter = param_forms.iter();
    while let Some(param) = iter.next() {
        let Value::Symbol(param) = param else {
            return Err(syntax("fn", "parameters must be symbols"));
        };
        if &**param == "&" {
            let (Some(Value::Symbol(rest_name)), None) = (iter.next(), iter.next()) else {
                return Err(syntax("fn", "& must be followed by exactly one symbol"));
            };
            rest = Some(Rc::clone(rest_name));
            break;
        }
        params.push(Rc::clone(param));
    }

    Ok(Value::Closure(Rc::new(Closure {
        name,
        params,
        rest,
        body: Rc::from(body),
        env: env.clone(),
        namespace: Rc::downgrade(namespace),
    })))
}

/// `(let [name value ...] body*)`, bindings made in order.
fn eval_let<P: Platform>(
    rt: &mut Runtime<P>,
    namespace: &NamespaceRef,
    env: &Env,
    args: &[Value],
) -> Result<Tail, EvalError> {
    let Some((Value::Tuple(bindings), body)) = args.split_first() else {
        return Err(syntax("let", "expected a binding tuple"));
    };
    if bindings.len() % 2 != 0 {
        return Err(syntax("let", "bindings must come in name/value pairs"));
    }
    let mut local = env.clone();
    for pair in bindings.chunks_exact(2) {
        let Value::Symbol(name) = &pair[0] else {
            return Err(syntax("let", "binding names must be symbols"));
        };
        let value = eval(rt, namespace, &local, &pair[1])?;
        local = local.bind(Rc::clone(name), value);
    }
    eval_body(rt, namespace, &local, body)
}

/// `(defns Name body*)`: evaluate `body` inside the nested namespace
/// `Name`, creating it on first use.
fn eval_defns<P: Platform>(
    rt: &mut Runtime<P>,
    namespace: &NamespaceRef,
    env: &Env,
    args: &[Value],
) -> Result<Value, EvalError> {
    let Some((Value::Symbol(name), body)) = args.split_first() else {
        return Err(syntax("defns", "expected a namespace name"));
    };
    if name.contains(['/', '.']) {
        return Err(syntax("defns", "name must be a plain symbol"));
    }
    let child = match namespace.get(name) {
        Some(Value::Namespace(existing))
            if existing
                .parent()
                .is_some_and(|parent| Rc::ptr_eq(&parent, namespace)) =>
        {
            existing
        }
        _ => {
            let child = Namespace::new_child(namespace, name);
            namespace.define(name, Value::namespace(Rc::clone(&child)));
            child
        }
    };
    for form in body {
        eval(rt, &child, env, form)?;
    }
    Ok(Value::namespace(child))
}

/// `(include "path")` or `(include mapper "path")`, into the current
/// namespace.
fn eval_include<P: Platform>(
    rt: &mut Runtime<P>,
    namespace: &NamespaceRef,
    env: &Env,
    args: &[Value],
) -> Result<Value, EvalError> {
    let (mapper, path) = match args {
        [path] => (Mapper::Identity, path),
        [mapper, path] => {
            let mapper = eval(rt, namespace, env, mapper)?;
            if !mapper.is_callable() {
                return Err(syntax("include", "mapper must be a function"));
            }
            (Mapper::Callable(mapper), path)
        }
        _ => return Err(syntax("include", "expected an optional mapper and a path")),
    };
    let path = eval(rt, namespace, env, path)?;
    let Some(path) = path.as_str() else {
        return Err(syntax("include", "path must be a string"));
    };
    rt.include_with(namespace, path, mapper)
        .map_err(|e| EvalError::Include(Box::new(e)))?;
    Ok(Value::Nil)
}
