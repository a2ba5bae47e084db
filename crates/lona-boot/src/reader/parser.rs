// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Parser for Lonala source code.
//!
//! Converts a token stream into Lonala values.

use std::fmt;
use std::vec::Vec;

use super::lexer::{LexError, Lexer, Token};
use crate::value::Value;

/// Maximum nesting of lists, tuples and quotes in one form.
pub const MAX_NESTING: usize = 128;

/// Parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unexpected end of input.
    UnexpectedEof,
    /// Unmatched right parenthesis.
    UnmatchedRParen,
    /// Unmatched right bracket.
    UnmatchedRBracket,
    /// Form nested deeper than [`MAX_NESTING`].
    TooDeep,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::UnmatchedRParen => write!(f, "unmatched )"),
            Self::UnmatchedRBracket => write!(f, "unmatched ]"),
            Self::TooDeep => write!(f, "form nested deeper than {MAX_NESTING}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Combined read error (lexer + parser).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// Lexer error.
    Lex(LexError),
    /// Parser error.
    Parse(ParseError),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(e) => write!(f, "{e}"),
            Self::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ReadError {}

impl From<LexError> for ReadError {
    fn from(e: LexError) -> Self {
        Self::Lex(e)
    }
}

impl From<ParseError> for ReadError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

/// Parser state.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Lookahead token.
    lookahead: Option<Token>,
    /// Line on which the most recently started top-level form begins.
    form_line: u32,
    /// Forms currently open.
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
            lookahead: None,
            form_line: 1,
            depth: 0,
        }
    }

    /// Line on which the last form returned by [`Parser::read`] started.
    ///
    /// After a read error this is the line of the form that failed.
    #[inline]
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.form_line
    }

    /// Read one expression.
    ///
    /// Returns `None` if at end of input.
    ///
    /// # Errors
    ///
    /// Returns `ReadError` if the input contains invalid syntax.
    pub fn read(&mut self) -> Result<Option<Value>, ReadError> {
        if self.lookahead.is_none() {
            self.form_line = self.lexer.skip_to_token();
        }
        self.read_form()
    }

    fn read_form(&mut self) -> Result<Option<Value>, ReadError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep.into());
        }
        self.depth += 1;
        let result = self.read_token_form();
        self.depth -= 1;
        result
    }

    fn read_token_form(&mut self) -> Result<Option<Value>, ReadError> {
        let Some(token) = self.take()? else {
            return Ok(None);
        };

        match token {
            Token::Nil => Ok(Some(Value::nil())),
            Token::True => Ok(Some(Value::bool(true))),
            Token::False => Ok(Some(Value::bool(false))),
            Token::Int(n) => Ok(Some(Value::int(n))),
            Token::String(s) => Ok(Some(Value::string(&s))),
            Token::Symbol(s) => Ok(Some(Value::symbol(&s))),
            Token::Keyword(s) => Ok(Some(Value::keyword(&s))),
            Token::Quote => {
                // 'expr => (quote expr)
                let expr = self.read_form()?.ok_or(ParseError::UnexpectedEof)?;
                Ok(Some(Value::list(std::vec![Value::symbol("quote"), expr])))
            }
            Token::LParen => Ok(Some(Value::list(self.read_until(&Token::RParen)?))),
            Token::RParen => Err(ParseError::UnmatchedRParen.into()),
            Token::LBracket => Ok(Some(Value::tuple(self.read_until(&Token::RBracket)?))),
            Token::RBracket => Err(ParseError::UnmatchedRBracket.into()),
        }
    }

    /// Read elements up to (and consuming) `close`.
    fn read_until(&mut self, close: &Token) -> Result<Vec<Value>, ReadError> {
        let mut items = Vec::new();
        loop {
            match self.peek()? {
                None => return Err(ParseError::UnexpectedEof.into()),
                Some(t) if t == close => {
                    self.lookahead = None;
                    return Ok(items);
                }
                Some(_) => {
                    let item = self.read_form()?.ok_or(ParseError::UnexpectedEof)?;
                    items.push(item);
                }
            }
        }
    }

    fn peek(&mut self) -> Result<Option<&Token>, ReadError> {
        if self.lookahead.is_none() {
            self.lookahead = self.lexer.next_token()?;
        }
        Ok(self.lookahead.as_ref())
    }

    fn take(&mut self) -> Result<Option<Token>, ReadError> {
        match self.lookahead.take() {
            Some(t) => Ok(Some(t)),
            None => Ok(self.lexer.next_token()?),
        }
    }
}

/// Read a single expression from a string.
///
/// # Errors
///
/// Returns `ReadError` if the input contains invalid syntax.
pub fn read(input: &str) -> Result<Option<Value>, ReadError> {
    Parser::new(input).read()
}

/// Read every top-level expression in a string.
///
/// # Errors
///
/// Returns `ReadError` on the first form with invalid syntax.
pub fn read_all(input: &str) -> Result<Vec<Value>, ReadError> {
    let mut parser = Parser::new(input);
    let mut forms = Vec::new();
    while let Some(form) = parser.read()? {
        forms.push(form);
    }
    Ok(forms)
}
