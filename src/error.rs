use crate::command::ExitCode;
use crate::lexer::LexingError;
use crate::parser::ParsingError;
use crate::redirect::RedirectError;
use std::io;

/// Everything that can stop a single input line from running.
///
/// None of these end the interpreter: the REPL prints the message and reads
/// the next line.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Lexing(#[from] LexingError),
    #[error(transparent)]
    Parsing(#[from] ParsingError),
    #[error(transparent)]
    Redirect(#[from] RedirectError),
    #[error("{0}: command not found")]
    CommandNotFound(String),
    #[error("{name}: {source}")]
    Spawn { name: String, source: io::Error },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Status reported for a line that failed with this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ShellError::Lexing(_) | ShellError::Parsing(_) => 2,
            ShellError::CommandNotFound(_) => 127,
            ShellError::Spawn { .. } => 126,
            ShellError::Redirect(_) | ShellError::Io(_) => 1,
        }
    }
}
