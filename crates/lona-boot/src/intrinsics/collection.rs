// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tuples, lists and strings.

use std::string::{String, ToString};
use std::vec::Vec;

use super::{IntrinsicError, expect_int, expect_min, expect_range, id};
use crate::bridge;
use crate::value::Value;

pub(super) fn str(args: &[Value]) -> Result<Value, IntrinsicError> {
    let parts: Vec<String> = args
        .iter()
        .map(|v| match v {
            Value::Nil => String::new(),
            Value::String(s) => String::from(&**s),
            other => other.to_string(),
        })
        .collect();
    let joined = bridge::concat(&parts).map_err(IntrinsicError::Bridge)?;
    Ok(Value::string(&joined))
}

fn type_error(intrinsic: u16, arg: usize, expected: &'static str) -> IntrinsicError {
    IntrinsicError::TypeError {
        intrinsic,
        arg,
        expected,
    }
}

pub(super) fn count(args: &[Value]) -> Result<Value, IntrinsicError> {
    expect_range(id::COUNT, args, 1, 1)?;
    let n = match &args[0] {
        Value::Nil => 0,
        Value::String(s) => s.chars().count(),
        other => other
            .as_seq()
            .ok_or_else(|| type_error(id::COUNT, 0, "a collection or string"))?
            .len(),
    };
    i64::try_from(n)
        .map(Value::int)
        .map_err(|_| IntrinsicError::Overflow)
}

/// Convert a Lonala index into a bounds-checked `usize`.
fn index(index: i64, len: usize, inclusive_end: bool) -> Result<usize, IntrinsicError> {
    let limit = if inclusive_end { len } else { len.saturating_sub(1) };
    match usize::try_from(index) {
        Ok(i) if i <= limit && (inclusive_end || len > 0) => Ok(i),
        _ => Err(IntrinsicError::IndexOutOfBounds { index, len }),
    }
}

pub(super) fn nth(args: &[Value]) -> Result<Value, IntrinsicError> {
    expect_range(id::NTH, args, 2, 3)?;
    let items = match &args[0] {
        Value::Nil => &[][..],
        other => other
            .as_seq()
            .ok_or_else(|| type_error(id::NTH, 0, "a tuple or list"))?,
    };
    let i = expect_int(id::NTH, args, 1)?;
    match index(i, items.len(), false) {
        Ok(i) => Ok(items[i].clone()),
        Err(e) => args.get(2).cloned().ok_or(e),
    }
}

pub(super) fn conj(mut args: Vec<Value>) -> Result<Value, IntrinsicError> {
    expect_min(id::CONJ, &args, 1)?;
    let extra = args.split_off(1);
    match &args[0] {
        Value::Nil => Ok(Value::tuple(extra)),
        Value::Tuple(items) => Ok(Value::tuple(items.iter().cloned().chain(extra).collect())),
        Value::List(items) => Ok(Value::list(items.iter().cloned().chain(extra).collect())),
        _ => Err(type_error(id::CONJ, 0, "a tuple or list")),
    }
}

pub(super) fn slice(args: &[Value]) -> Result<Value, IntrinsicError> {
    expect_range(id::SLICE, args, 2, 3)?;
    let start = expect_int(id::SLICE, args, 1)?;
    let end = if args.len() == 3 {
        Some(expect_int(id::SLICE, args, 2)?)
    } else {
        None
    };
    let bounds = |len: usize| -> Result<(usize, usize), IntrinsicError> {
        let end = match end {
            Some(e) => index(e, len, true)?,
            None => len,
        };
        let start = index(start, end, true)?;
        Ok((start, end))
    };
    match &args[0] {
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let (start, end) = bounds(chars.len())?;
            let sub: String = chars[start..end].iter().collect();
            Ok(Value::string(&sub))
        }
        Value::Nil => {
            bounds(0)?;
            Ok(Value::tuple(Vec::new()))
        }
        other => {
            let items = other
                .as_seq()
                .ok_or_else(|| type_error(id::SLICE, 0, "a collection or string"))?;
            let (start, end) = bounds(items.len())?;
            Ok(Value::tuple(items[start..end].to_vec()))
        }
    }
}
