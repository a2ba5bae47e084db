// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! String shims used before any Lonala string facility exists.
//!
//! The earliest library units build strings (diagnostic lines, resolved
//! paths) through `%alloc-string` and `%concat`. Both size their buffer up
//! front and never grow it.

use std::fmt;
use std::string::String;

/// Largest string the shims will allocate, in bytes.
pub const MAX_STRING_LEN: usize = 1 << 24;

/// A rejected allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    /// Requested or combined length exceeds [`MAX_STRING_LEN`].
    TooLong(usize),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong(len) => {
                write!(f, "string of {len} bytes exceeds limit of {MAX_STRING_LEN}")
            }
        }
    }
}

impl std::error::Error for BridgeError {}

/// Allocate a string of `len` bytes, filled with spaces.
///
/// # Errors
///
/// Returns `BridgeError::TooLong` if `len` exceeds [`MAX_STRING_LEN`].
pub fn alloc_string(len: usize) -> Result<String, BridgeError> {
    if len > MAX_STRING_LEN {
        return Err(BridgeError::TooLong(len));
    }
    Ok(" ".repeat(len))
}

/// Concatenate `parts` into one string allocated at its final size.
///
/// # Errors
///
/// Returns `BridgeError::TooLong` if the combined length exceeds
/// [`MAX_STRING_LEN`].
pub fn concat<S: AsRef<str>>(parts: &[S]) -> Result<String, BridgeError> {
    let total = parts
        .iter()
        .try_fold(0usize, |acc, p| acc.checked_add(p.as_ref().len()))
        .unwrap_or(usize::MAX);
    if total > MAX_STRING_LEN {
        return Err(BridgeError::TooLong(total));
    }
    let mut out = String::with_capacity(total);
    for part in parts {
        out.push_str(part.as_ref());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn alloc_string_has_requested_length() {
        assert_eq!(alloc_string(3).unwrap(), "   ");
        assert_eq!(alloc_string(0).unwrap(), "");
        assert_eq!(
            alloc_string(MAX_STRING_LEN + 1),
            Err(BridgeError::TooLong(MAX_STRING_LEN + 1))
        );
    }

    #[test]
    fn concat_preserves_utf8() {
        let s = concat(&["/lona/", "lib/", "größe.lona"]).unwrap();
        assert_eq!(s, "/lona/lib/größe.lona");
        assert_eq!(concat::<&str>(&[]).unwrap(), "");
    }
}
