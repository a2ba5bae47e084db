// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Integer arithmetic and comparison. All operations are checked.

use super::{IntrinsicError, expect_exact, expect_int, expect_min, id};
use crate::value::Value;

fn fold(
    intrinsic: u16,
    args: &[Value],
    init: i64,
    op: fn(i64, i64) -> Option<i64>,
) -> Result<i64, IntrinsicError> {
    let mut acc = init;
    for i in 0..args.len() {
        acc = op(acc, expect_int(intrinsic, args, i)?).ok_or(IntrinsicError::Overflow)?;
    }
    Ok(acc)
}

pub(super) fn add(args: &[Value]) -> Result<Value, IntrinsicError> {
    fold(id::ADD, args, 0, i64::checked_add).map(Value::int)
}

pub(super) fn mul(args: &[Value]) -> Result<Value, IntrinsicError> {
    fold(id::MUL, args, 1, i64::checked_mul).map(Value::int)
}

pub(super) fn sub(args: &[Value]) -> Result<Value, IntrinsicError> {
    expect_min(id::SUB, args, 1)?;
    let first = expect_int(id::SUB, args, 0)?;
    if args.len() == 1 {
        return first
            .checked_neg()
            .map(Value::int)
            .ok_or(IntrinsicError::Overflow);
    }
    let mut acc = first;
    for i in 1..args.len() {
        acc = acc
            .checked_sub(expect_int(id::SUB, args, i)?)
            .ok_or(IntrinsicError::Overflow)?;
    }
    Ok(Value::int(acc))
}

pub(super) fn div(args: &[Value]) -> Result<Value, IntrinsicError> {
    expect_min(id::DIV, args, 2)?;
    let mut acc = expect_int(id::DIV, args, 0)?;
    for i in 1..args.len() {
        let d = expect_int(id::DIV, args, i)?;
        if d == 0 {
            return Err(IntrinsicError::DivisionByZero);
        }
        acc = acc.checked_div(d).ok_or(IntrinsicError::Overflow)?;
    }
    Ok(Value::int(acc))
}

pub(super) fn modulo(args: &[Value]) -> Result<Value, IntrinsicError> {
    expect_exact(id::MOD, args, 2)?;
    let a = expect_int(id::MOD, args, 0)?;
    let b = expect_int(id::MOD, args, 1)?;
    if b == 0 {
        return Err(IntrinsicError::DivisionByZero);
    }
    // Result takes the sign of the divisor
    let r = a.checked_rem(b).ok_or(IntrinsicError::Overflow)?;
    Ok(Value::int(if r != 0 && (r < 0) != (b < 0) { r + b } else { r }))
}

pub(super) fn compare(
    intrinsic: u16,
    args: &[Value],
    op: fn(i64, i64) -> bool,
) -> Result<Value, IntrinsicError> {
    expect_min(intrinsic, args, 1)?;
    let mut prev = expect_int(intrinsic, args, 0)?;
    let mut holds = true;
    for i in 1..args.len() {
        let next = expect_int(intrinsic, args, i)?;
        holds &= op(prev, next);
        prev = next;
    }
    Ok(Value::bool(holds))
}
