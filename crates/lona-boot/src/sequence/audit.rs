// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Static ordering check for a bootstrap sequence.
//!
//! Walks every unit the sequence would load, in load order, following
//! literal `include` forms with the same stage-dependent resolution the
//! runtime uses. Each symbol a unit uses must already be defined when it
//! is needed:
//!
//! - symbols evaluated at load time (top-level forms) must be defined by
//!   an earlier form, unit or phase;
//! - symbols inside function bodies must be defined by the end of the
//!   unit that contains them, so mutual recursion within a unit is fine.
//!
//! Nothing is evaluated. A unit that fails this check would fail to load,
//! or leave behind functions that fail when first called.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::string::{String, ToString};
use std::vec::Vec;

use super::{Phase, Step};
use crate::eval::split_qualified;
use crate::include::{Stage, path};
use crate::intrinsics;
use crate::platform::Platform;
use crate::reader::Parser;
use crate::runtime::PRIMARY_NAMESPACE;
use crate::value::Value;

/// A symbol used before anything defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderViolation {
    /// Unit that uses the symbol.
    pub unit: PathBuf,
    /// Line of the top-level form containing the use.
    pub line: u32,
    /// The symbol.
    pub symbol: String,
    /// Unit that defines it later, if any does.
    pub defined_in: Option<PathBuf>,
}

/// A unit step whose phase is earlier than a preceding unit step's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseRegression {
    /// Index of the step.
    pub index: usize,
    /// The step's phase.
    pub phase: Phase,
    /// Phase of the preceding unit step.
    pub after: Phase,
}

/// An install step whose required binding is not defined yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityGap {
    /// Index of the step.
    pub index: usize,
    /// The stage being installed.
    pub stage: Stage,
    /// The missing binding.
    pub capability: &'static str,
}

/// Findings of [`audit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Every unit visited, in load order, nested units included.
    pub units: Vec<PathBuf>,
    /// Symbols used too early.
    pub violations: Vec<OrderViolation>,
    /// Phase order mistakes in the table.
    pub regressions: Vec<PhaseRegression>,
    /// Stages installed too early.
    pub gaps: Vec<CapabilityGap>,
    /// Units that could not be read or parsed, or that include themselves.
    pub errors: Vec<(PathBuf, String)>,
}

impl AuditReport {
    /// Whether nothing was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
            && self.regressions.is_empty()
            && self.gaps.is_empty()
            && self.errors.is_empty()
    }
}

/// Check `steps` against the sources `platform` serves.
pub fn audit<P: Platform>(platform: &P, steps: &[Step]) -> AuditReport {
    let mut auditor = Auditor::new(platform);
    let mut last_phase = None;
    for (index, step) in steps.iter().enumerate() {
        match *step {
            Step::Unit { path, phase } => {
                if let Some(after) = last_phase.filter(|&after| phase < after) {
                    auditor.report.regressions.push(PhaseRegression {
                        index,
                        phase,
                        after,
                    });
                }
                last_phase = Some(phase);
                let resolved = path::resolve(&auditor.working_dir, Path::new(path));
                auditor.unit(PRIMARY_NAMESPACE, resolved);
            }
            Step::Install(stage) => {
                for &capability in stage.required_capabilities() {
                    if !auditor.defined(PRIMARY_NAMESPACE, capability) {
                        auditor.report.gaps.push(CapabilityGap {
                            index,
                            stage,
                            capability,
                        });
                    }
                }
                auditor.stage = stage;
            }
        }
    }
    auditor.finish()
}

/// A symbol use whose check waits for the end of its unit.
struct Use {
    namespace: String,
    symbol: String,
    unit: PathBuf,
    line: u32,
}

struct Auditor<'p, P> {
    platform: &'p P,
    working_dir: PathBuf,
    stage: Stage,
    /// Bindings per namespace, keyed by qualified namespace name.
    scopes: BTreeMap<String, BTreeSet<String>>,
    /// First unit that defines each name.
    origins: BTreeMap<String, PathBuf>,
    /// Units being walked, innermost last.
    stack: Vec<PathBuf>,
    deferred: Vec<Use>,
    report: AuditReport,
}

impl<'p, P: Platform> Auditor<'p, P> {
    fn new(platform: &'p P) -> Self {
        let primary = intrinsics::names()
            .iter()
            .map(|&name| String::from(name))
            .collect();
        let mut scopes = BTreeMap::new();
        scopes.insert(String::from(PRIMARY_NAMESPACE), primary);
        Self {
            platform,
            working_dir: platform.working_dir(),
            stage: Stage::Primitive,
            scopes,
            origins: BTreeMap::new(),
            stack: Vec::new(),
            deferred: Vec::new(),
            report: AuditReport::default(),
        }
    }

    fn finish(mut self) -> AuditReport {
        for violation in &mut self.report.violations {
            let name = split_qualified(&violation.symbol)
                .map_or(violation.symbol.as_str(), |(_, local)| local);
            violation.defined_in = self.origins.get(name).cloned();
        }
        self.report
    }

    fn unit(&mut self, namespace: &str, unit: PathBuf) {
        let text = match self.platform.read_file(&unit) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => {
                    self.report.errors.push((unit, e.to_string()));
                    return;
                }
            },
            Err(e) => {
                self.report.errors.push((unit, e.to_string()));
                return;
            }
        };
        self.report.units.push(unit.clone());
        self.stack.push(unit.clone());
        let mark = self.deferred.len();

        let mut parser = Parser::new(&text);
        loop {
            match parser.read() {
                Ok(Some(form)) => {
                    let line = parser.line();
                    self.form(namespace, &BTreeSet::new(), &form, line, false);
                }
                Ok(None) => break,
                Err(e) => {
                    self.report.errors.push((unit.clone(), e.to_string()));
                    break;
                }
            }
        }

        for pending in self.deferred.split_off(mark) {
            if !self.resolves(&pending.namespace, &pending.symbol) {
                self.violation(pending);
            }
        }
        self.stack.pop();
    }

    fn violation(&mut self, pending: Use) {
        self.report.violations.push(OrderViolation {
            unit: pending.unit,
            line: pending.line,
            symbol: pending.symbol,
            defined_in: None,
        });
    }

    fn define(&mut self, namespace: &str, name: &str) {
        self.scopes
            .entry(String::from(namespace))
            .or_default()
            .insert(String::from(name));
        if let Some(unit) = self.stack.last() {
            self.origins
                .entry(String::from(name))
                .or_insert_with(|| unit.clone());
        }
    }

    fn defined(&self, namespace: &str, name: &str) -> bool {
        self.scopes
            .get(namespace)
            .is_some_and(|names| names.contains(name))
    }

    /// Resolve like the evaluator: the namespace, its ancestors, then
    /// `ns/name` through a namespace binding.
    fn resolves(&self, namespace: &str, symbol: &str) -> bool {
        if ancestors(namespace).any(|ns| self.defined(ns, symbol)) {
            return true;
        }
        let Some((qualifier, local)) = split_qualified(symbol) else {
            return false;
        };
        let Some(owner) = ancestors(namespace).find(|ns| self.defined(ns, qualifier)) else {
            return false;
        };
        let target = format!("{owner}.{qualifier}");
        // A binding that is not a known namespace is left to the runtime
        self.scopes
            .get(&target)
            .is_none_or(|names| names.contains(local))
    }

    fn symbol(
        &mut self,
        namespace: &str,
        locals: &BTreeSet<String>,
        name: &str,
        line: u32,
        deferred: bool,
    ) {
        if locals.contains(name) {
            return;
        }
        let pending = Use {
            namespace: String::from(namespace),
            symbol: String::from(name),
            unit: self.stack.last().cloned().unwrap_or_default(),
            line,
        };
        if deferred {
            self.deferred.push(pending);
        } else if !self.resolves(namespace, name) {
            self.violation(pending);
        }
    }

    fn forms(
        &mut self,
        namespace: &str,
        locals: &BTreeSet<String>,
        forms: &[Value],
        line: u32,
        deferred: bool,
    ) {
        for form in forms {
            self.form(namespace, locals, form, line, deferred);
        }
    }

    fn form(
        &mut self,
        namespace: &str,
        locals: &BTreeSet<String>,
        form: &Value,
        line: u32,
        deferred: bool,
    ) {
        match form {
            Value::Symbol(name) => self.symbol(namespace, locals, name, line, deferred),
            Value::Tuple(items) => self.forms(namespace, locals, items, line, deferred),
            Value::List(items) => {
                let Some((head, args)) = items.split_first() else {
                    return;
                };
                match head.as_symbol() {
                    Some("quote") => {}
                    Some("def") => {
                        if let [Value::Symbol(name), expr] = args {
                            self.form(namespace, locals, expr, line, deferred);
                            self.define(namespace, name);
                        } else {
                            self.forms(namespace, locals, args, line, deferred);
                        }
                    }
                    Some("fn") => self.function(namespace, locals, args, line),
                    Some("let") => self.binding(namespace, locals, args, line, deferred),
                    Some("defns") => {
                        if let Some((Value::Symbol(name), body)) = args.split_first() {
                            self.define(namespace, name);
                            let child = format!("{namespace}.{name}");
                            self.scopes.entry(child.clone()).or_default();
                            self.forms(&child, locals, body, line, deferred);
                        }
                    }
                    Some("include") => self.include(namespace, locals, args, line, deferred),
                    Some("if" | "do") => self.forms(namespace, locals, args, line, deferred),
                    _ => self.forms(namespace, locals, items, line, deferred),
                }
            }
            _ => {}
        }
    }

    fn function(
        &mut self,
        namespace: &str,
        locals: &BTreeSet<String>,
        args: &[Value],
        line: u32,
    ) {
        let mut inner = locals.clone();
        let rest = match args {
            [Value::Symbol(name), rest @ ..] => {
                inner.insert(String::from(&**name));
                rest
            }
            _ => args,
        };
        let Some((Value::Tuple(params), body)) = rest.split_first() else {
            return;
        };
        for param in params.iter() {
            if let Some(name) = param.as_symbol().filter(|&name| name != "&") {
                inner.insert(String::from(name));
            }
        }
        self.forms(namespace, &inner, body, line, true);
    }

    fn binding(
        &mut self,
        namespace: &str,
        locals: &BTreeSet<String>,
        args: &[Value],
        line: u32,
        deferred: bool,
    ) {
        let Some((Value::Tuple(bindings), body)) = args.split_first() else {
            return;
        };
        let mut inner = locals.clone();
        for pair in bindings.chunks(2) {
            if let [Value::Symbol(name), value] = pair {
                self.form(namespace, &inner, value, line, deferred);
                inner.insert(String::from(&**name));
            }
        }
        self.forms(namespace, &inner, body, line, deferred);
    }

    fn include(
        &mut self,
        namespace: &str,
        locals: &BTreeSet<String>,
        args: &[Value],
        line: u32,
        deferred: bool,
    ) {
        let target = match args {
            [target] => target,
            [mapper, target] => {
                self.form(namespace, locals, mapper, line, deferred);
                target
            }
            _ => return,
        };
        // Only literal paths loaded at unit load time can be followed
        let Some(relative) = target.as_str().filter(|_| !deferred) else {
            self.form(namespace, locals, target, line, deferred);
            return;
        };
        let base = match (self.stage, self.stack.last()) {
            (Stage::RelativePath | Stage::Final, Some(current)) => path::dirname(current),
            _ => self.working_dir.clone(),
        };
        let resolved = path::resolve(&base, Path::new(relative));
        if self.stack.contains(&resolved) {
            let reason = format!("included again while loading (line {line})");
            self.report.errors.push((resolved, reason));
            return;
        }
        self.unit(namespace, resolved);
    }
}

/// `a.b.c`, `a.b`, `a`.
fn ancestors(namespace: &str) -> impl Iterator<Item = &str> {
    core::iter::successors(Some(namespace), |ns| ns.rsplit_once('.').map(|(parent, _)| parent))
}
