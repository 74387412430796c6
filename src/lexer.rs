//! A module implementing lexical analysis (tokenization) of a single input line.

use crate::redirect::{RedirectMode, TargetStream};
use std::fmt;

/// An output redirection operator, kept in the exact form it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectOp {
    /// `>`
    Truncate,
    /// `>>`
    Append,
    /// `1>`
    StdoutTruncate,
    /// `1>>`
    StdoutAppend,
    /// `2>`
    StderrTruncate,
    /// `2>>`
    StderrAppend,
}

impl RedirectOp {
    fn new(fd: Option<char>, append: bool) -> Self {
        match (fd, append) {
            (Some('1'), false) => RedirectOp::StdoutTruncate,
            (Some('1'), true) => RedirectOp::StdoutAppend,
            (Some('2'), false) => RedirectOp::StderrTruncate,
            (Some('2'), true) => RedirectOp::StderrAppend,
            (_, false) => RedirectOp::Truncate,
            (_, true) => RedirectOp::Append,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectOp::Truncate => ">",
            RedirectOp::Append => ">>",
            RedirectOp::StdoutTruncate => "1>",
            RedirectOp::StdoutAppend => "1>>",
            RedirectOp::StderrTruncate => "2>",
            RedirectOp::StderrAppend => "2>>",
        }
    }

    /// Stream diverted by this operator.
    pub fn stream(&self) -> TargetStream {
        match self {
            RedirectOp::StderrTruncate | RedirectOp::StderrAppend => TargetStream::Stderr,
            _ => TargetStream::Stdout,
        }
    }

    /// Whether the target file is truncated or appended to.
    pub fn mode(&self) -> RedirectMode {
        match self {
            RedirectOp::Append | RedirectOp::StdoutAppend | RedirectOp::StderrAppend => {
                RedirectMode::Append
            }
            _ => RedirectMode::Truncate,
        }
    }
}

impl fmt::Display for RedirectOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a token resulting from lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A plain argument with quoting and escapes already removed.
    Word(String),
    /// One of `>`, `>>`, `1>`, `1>>`, `2>`, `2>>` written outside quotes.
    Redirect(RedirectOp),
}

impl Token {
    pub fn as_str(&self) -> &str {
        match self {
            Token::Word(word) => word,
            Token::Redirect(op) => op.as_str(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Token {
    fn from(word: &str) -> Self {
        Token::Word(word.to_string())
    }
}

/// Errors that can occur during the lexical analysis process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexingError {
    /// A closing quote (single or double) was not found.
    #[error("syntax error: unterminated quote")]
    UnfinishedQuote,
    /// The line ended right after an unquoted backslash.
    #[error("syntax error: trailing backslash")]
    TrailingBackslash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Normal,
    InSingle,
    InDouble,
    /// The next character is taken literally; `in_double` tells where to resume.
    Escaped { in_double: bool },
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
    out: Vec<Token>,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Normal,
            buffer: String::new(),
            out: Vec::new(),
        }
    }

    /// Runs the machine over the whole line and returns the produced tokens.
    fn make_tokens(mut self) -> Result<Vec<Token>, LexingError> {
        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Normal => self.handle_normal(ch),
                LexingState::InSingle => self.handle_single_quote(ch),
                LexingState::InDouble => self.handle_double_quote(ch),
                LexingState::Escaped { in_double } => {
                    self.buffer.push(ch);
                    self.state = if in_double {
                        LexingState::InDouble
                    } else {
                        LexingState::Normal
                    };
                }
            }
        }

        match self.state {
            LexingState::InSingle | LexingState::InDouble => {
                return Err(LexingError::UnfinishedQuote);
            }
            LexingState::Escaped { .. } => return Err(LexingError::TrailingBackslash),
            LexingState::Normal => {}
        }

        self.flush_word();
        Ok(self.out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_normal(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::InDouble,
            '\'' => self.state = LexingState::InSingle,
            '\\' => self.state = LexingState::Escaped { in_double: false },
            ' ' | '\t' => self.flush_word(),
            '>' => self.push_redirect(None),
            '1' | '2' if self.peek_char() == Some('>') => {
                self.read_char();
                self.push_redirect(Some(ch));
            }
            c => self.buffer.push(c),
        }
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::Normal,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::Normal,
            '\\' if matches!(self.peek_char(), Some('"' | '\\')) => {
                self.state = LexingState::Escaped { in_double: true };
            }
            c => self.buffer.push(c),
        }
    }

    /// Emits a redirection operator; the leading `>` has already been consumed.
    fn push_redirect(&mut self, fd: Option<char>) {
        self.flush_word();
        let append = self.peek_char() == Some('>');
        if append {
            self.read_char();
        }
        self.out.push(Token::Redirect(RedirectOp::new(fd, append)));
    }

    fn flush_word(&mut self) {
        if !self.buffer.is_empty() {
            self.out.push(Token::Word(std::mem::take(&mut self.buffer)));
        }
    }
}

/// The main entry point function to perform lexical analysis.
///
/// Splits `line` into words and redirection operators. Quotes group characters
/// into a single word, and adjacent quoted or unquoted segments concatenate.
/// Empty words (such as `""`) are not emitted.
pub fn split_into_tokens(line: &str) -> Result<Vec<Token>, LexingError> {
    LexingFSM::new(line).make_tokens()
}
