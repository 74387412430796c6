use crate::env::Environment;
use crate::error::ShellError;
use std::io::{Read, Write};
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Abstraction over a readable input stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// A blanket implementation exists for any type that implements `Read` and `Into<Stdio>`.
pub trait InputStream: Read {
    /// Convert this input into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Read + Into<Stdio>> InputStream for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// Abstraction over a writable stream (standard output, standard error or a
/// redirection target) that can also be handed to a child process.
///
/// A blanket implementation exists for any type that implements `Write` and
/// `Into<Stdio>`, which covers `io::Stdout`, `io::Stderr` and `fs::File`.
pub trait OutputStream: Write {
    /// Convert this output into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Write + Into<Stdio>> OutputStream for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// The three standard streams a command runs with.
pub struct Streams {
    pub stdin: Box<dyn InputStream>,
    pub stdout: Box<dyn OutputStream>,
    pub stderr: Box<dyn OutputStream>,
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command, consuming the streams it was given.
    ///
    /// Streams are dropped (and redirect targets closed) when this returns.
    fn execute(self: Box<Self>, streams: Streams, env: &mut Environment)
    -> Result<ExitCode, ShellError>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
/// Implementations can use the environment to resolve executables (e.g., using PATH).
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
