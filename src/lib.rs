//! A line-oriented command interpreter.
//!
//! Each input line is split into shell-style tokens (single and double quotes,
//! backslash escapes, and the output redirection operators `>`, `>>`, `1>`,
//! `1>>`, `2>`, `2>>`), then dispatched either to a built-in command
//! implemented in Rust or to an external program found on `PATH`. The command
//! runs to completion before the next line is read; a redirection diverts its
//! stdout or stderr to a file.
//!
//! The main entry point is [`Interpreter`]. The public modules expose the
//! tokenizer ([`lexer`]), the redirection scanner ([`redirect`]), command
//! construction ([`parser`]) and the traits for implementing commands
//! ([`command`]).

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod external;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod parser;
pub mod redirect;

pub use error::ShellError;
pub use external::find_command_path;
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{BuiltinTable, Interpreter};
