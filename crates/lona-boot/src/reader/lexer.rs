// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Lexer for Lonala source code.
//!
//! Converts a string of source code into a stream of tokens, tracking the
//! line each token starts on.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;
use std::string::String;

/// A token in the Lonala language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Left parenthesis `(`
    LParen,
    /// Right parenthesis `)`
    RParen,
    /// Left bracket `[`
    LBracket,
    /// Right bracket `]`
    RBracket,
    /// Quote `'`
    Quote,
    /// The `nil` literal
    Nil,
    /// The `true` literal
    True,
    /// The `false` literal
    False,
    /// Integer literal
    Int(i64),
    /// String literal (contents without quotes, escapes resolved)
    String(String),
    /// Symbol (identifier)
    Symbol(String),
    /// Keyword (without the leading `:`)
    Keyword(String),
}

/// Lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Unterminated string literal.
    UnterminatedString,
    /// Invalid escape sequence in string.
    InvalidEscape(char),
    /// Invalid number format.
    InvalidNumber,
    /// Unexpected character.
    UnexpectedChar(char),
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => write!(f, "unterminated string"),
            Self::InvalidEscape(c) => write!(f, "invalid escape sequence: \\{c}"),
            Self::InvalidNumber => write!(f, "invalid number"),
            Self::UnexpectedChar(c) => write!(f, "unexpected character: {c}"),
        }
    }
}

impl std::error::Error for LexError {}

/// Lexer state.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: u32,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    /// Line of the next unread character (1-based).
    #[inline]
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Skip whitespace and comments, then return the line the next token
    /// starts on.
    pub fn skip_to_token(&mut self) -> u32 {
        self.skip_whitespace();
        self.line
    }

    /// Get the next token.
    ///
    /// # Errors
    ///
    /// Returns `LexError` if the input contains invalid syntax such as
    /// unterminated strings, invalid escape sequences, or unexpected characters.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        let Some(&c) = self.chars.peek() else {
            return Ok(None);
        };

        let punct = match c {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '\'' => Some(Token::Quote),
            _ => None,
        };
        if let Some(token) = punct {
            self.bump();
            return Ok(Some(token));
        }

        match c {
            '"' => self.lex_string(),
            '0'..='9' => self.lex_number(false),
            '-' => {
                // Negative number or the minus symbol
                self.bump();
                if let Some('0'..='9') = self.chars.peek() {
                    self.lex_number(true)
                } else {
                    self.lex_symbol_rest('-')
                }
            }
            ':' => {
                self.bump();
                self.lex_keyword()
            }
            _ if is_symbol_start(c) => {
                self.bump();
                self.lex_symbol_rest(c)
            }
            _ => Err(LexError::UnexpectedChar(c)),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || c == ',' {
                self.bump();
            } else if c == ';' {
                // Comment runs to end of line
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn lex_string(&mut self) -> Result<Option<Token>, LexError> {
        self.bump(); // opening quote
        let mut s = String::new();

        loop {
            match self.bump() {
                Some('"') => return Ok(Some(Token::String(s))),
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some(c) => return Err(LexError::InvalidEscape(c)),
                        None => return Err(LexError::UnterminatedString),
                    };
                    s.push(escaped);
                }
                Some(c) => s.push(c),
                None => return Err(LexError::UnterminatedString),
            }
        }
    }

    fn lex_number(&mut self, negative: bool) -> Result<Option<Token>, LexError> {
        let mut n: i64 = 0;

        while let Some(&c) = self.chars.peek() {
            if let Some(digit) = c.to_digit(10) {
                self.bump();
                let digit = i64::from(digit);
                n = n.checked_mul(10).ok_or(LexError::InvalidNumber)?;
                // Accumulate negatives directly so i64::MIN is readable
                n = if negative {
                    n.checked_sub(digit)
                } else {
                    n.checked_add(digit)
                }
                .ok_or(LexError::InvalidNumber)?;
            } else if is_delimiter(c) {
                break;
            } else {
                return Err(LexError::InvalidNumber);
            }
        }

        Ok(Some(Token::Int(n)))
    }

    /// Consume symbol characters onto `s`.
    fn take_symbol_chars(&mut self, s: &mut String) {
        while let Some(&c) = self.chars.peek().filter(|&&c| is_symbol_continue(c)) {
            self.bump();
            s.push(c);
        }
    }

    fn lex_symbol_rest(&mut self, first: char) -> Result<Option<Token>, LexError> {
        let mut s = String::from(first);
        self.take_symbol_chars(&mut s);
        Ok(Some(match s.as_str() {
            "nil" => Token::Nil,
            "true" => Token::True,
            "false" => Token::False,
            _ => Token::Symbol(s),
        }))
    }

    /// Lex a keyword. The leading `:` is already consumed.
    fn lex_keyword(&mut self) -> Result<Option<Token>, LexError> {
        match self.chars.peek() {
            Some(&c) if is_symbol_start(c) => {
                let mut s = String::new();
                self.take_symbol_chars(&mut s);
                Ok(Some(Token::Keyword(s)))
            }
            Some(&c) => Err(LexError::UnexpectedChar(c)),
            None => Err(LexError::UnexpectedChar(':')),
        }
    }
}

fn is_symbol_start(c: char) -> bool {
    c.is_alphabetic()
        || matches!(
            c,
            '!' | '$'
                | '%'
                | '&'
                | '*'
                | '+'
                | '-'
                | '.'
                | '/'
                | '<'
                | '='
                | '>'
                | '?'
                | '@'
                | '_'
                | '~'
        )
}

fn is_symbol_continue(c: char) -> bool {
    is_symbol_start(c) || c.is_ascii_digit() || c == ':'
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '"' | '\'' | ';' | ',')
}

/// Tokenize an entire string into a vector of tokens.
#[cfg(test)]
pub fn tokenize(input: &str) -> Result<std::vec::Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = std::vec::Vec::new();
    while let Some(tok) = lexer.next_token()? {
        tokens.push(tok);
    }
    Ok(tokens)
}
