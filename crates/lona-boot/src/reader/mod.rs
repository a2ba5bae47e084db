// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Reader for Lonala source code.
//!
//! Converts source code strings into Lonala values.

#[cfg(test)]
mod parser_test;

mod lexer;
mod parser;

pub use lexer::{LexError, Lexer, Token};
pub use parser::{MAX_NESTING, ParseError, Parser, ReadError, read, read_all};
