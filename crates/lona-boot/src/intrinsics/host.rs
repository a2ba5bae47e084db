// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! `%`-prefixed shims over the platform and the string bridge.

use std::path::Path;
use std::vec::Vec;

use super::{IntrinsicError, expect_exact, expect_int, expect_min, expect_str, id};
use crate::bridge;
use crate::include::path;
use crate::platform::Platform;
use crate::runtime::Runtime;
use crate::value::Value;

fn path_value(p: &Path) -> Value {
    Value::string(&p.to_string_lossy())
}

pub(super) fn call<P: Platform>(
    rt: &mut Runtime<P>,
    intrinsic: u16,
    args: &[Value],
) -> Result<Value, IntrinsicError> {
    match intrinsic {
        id::GETENV => {
            expect_exact(intrinsic, args, 1)?;
            let name = expect_str(intrinsic, args, 0)?;
            Ok(rt
                .platform()
                .getenv(name)
                .map_or(Value::Nil, |v| Value::string(&v)))
        }
        id::SETENV => {
            expect_exact(intrinsic, args, 2)?;
            let name = expect_str(intrinsic, args, 0)?;
            let value = expect_str(intrinsic, args, 1)?;
            rt.platform_mut()
                .setenv(name, value)
                .map_err(IntrinsicError::Env)?;
            Ok(Value::Nil)
        }
        id::NOW_NS => {
            expect_exact(intrinsic, args, 0)?;
            let now = rt.platform().now_ns();
            Ok(Value::int(i64::try_from(now).unwrap_or(i64::MAX)))
        }
        id::CPU_THREADS => {
            expect_exact(intrinsic, args, 0)?;
            let n = rt.platform().cpu_threads();
            Ok(Value::int(i64::try_from(n).unwrap_or(i64::MAX)))
        }
        id::WORKING_DIR => {
            expect_exact(intrinsic, args, 0)?;
            Ok(path_value(&rt.platform().working_dir()))
        }
        id::PATH_DIRNAME => {
            expect_exact(intrinsic, args, 1)?;
            let p = expect_str(intrinsic, args, 0)?;
            Ok(path_value(&path::dirname(Path::new(p))))
        }
        id::PATH_JOIN => {
            expect_min(intrinsic, args, 1)?;
            let mut joined = Path::new(expect_str(intrinsic, args, 0)?).to_path_buf();
            for i in 1..args.len() {
                joined = path::join(&joined, Path::new(expect_str(intrinsic, args, i)?));
            }
            Ok(path_value(&joined))
        }
        id::PATH_NORMALIZE => {
            expect_exact(intrinsic, args, 1)?;
            let p = expect_str(intrinsic, args, 0)?;
            Ok(path_value(&path::normalize(Path::new(p))))
        }
        id::CONCAT => {
            let parts = (0..args.len())
                .map(|i| expect_str(intrinsic, args, i))
                .collect::<Result<Vec<_>, _>>()?;
            let joined = bridge::concat(&parts).map_err(IntrinsicError::Bridge)?;
            Ok(Value::string(&joined))
        }
        id::ALLOC_STRING => {
            expect_exact(intrinsic, args, 1)?;
            let n = expect_int(intrinsic, args, 0)?;
            let len = usize::try_from(n).map_err(|_| IntrinsicError::TypeError {
                intrinsic,
                arg: 0,
                expected: "a non-negative integer",
            })?;
            let s = bridge::alloc_string(len).map_err(IntrinsicError::Bridge)?;
            Ok(Value::string(&s))
        }
        id::SPLIT => {
            expect_exact(intrinsic, args, 2)?;
            let s = expect_str(intrinsic, args, 0)?;
            let sep = expect_str(intrinsic, args, 1)?;
            if sep.is_empty() {
                return Err(IntrinsicError::TypeError {
                    intrinsic,
                    arg: 1,
                    expected: "a non-empty string",
                });
            }
            Ok(Value::tuple(s.split(sep).map(Value::string).collect()))
        }
        id::PARSE_INT => {
            expect_exact(intrinsic, args, 1)?;
            let s = expect_str(intrinsic, args, 0)?;
            Ok(s.parse::<i64>().map_or(Value::Nil, Value::int))
        }
        id::DIAGNOSTIC => {
            expect_exact(intrinsic, args, 1)?;
            let line = expect_str(intrinsic, args, 0)?;
            rt.platform_mut().diagnostic(line);
            Ok(Value::Nil)
        }
        other => Err(IntrinsicError::UnknownIntrinsic(other)),
    }
}
