use crate::command::{CommandFactory, ExecutableCommand, ExitCode, InputStream, OutputStream, Streams};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::ExternalCommand;
use crate::lexer;
use crate::parser::{self, SimpleCommand};
use crate::redirect::TargetStream;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::HashMap;
use std::io::Read;
use std::process::Stdio;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only support commands defined in this crate — BuiltinCommand and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Mapping from built-in name to the factory that creates it.
///
/// Lookup is exact (case-sensitive). Adding a built-in only means inserting it here.
#[derive(Default)]
pub struct BuiltinTable {
    handlers: HashMap<String, Box<dyn CommandFactory>>,
}

impl BuiltinTable {
    /// Register `factory` under `name`, replacing any previous handler.
    pub fn insert(&mut self, name: impl Into<String>, factory: Box<dyn CommandFactory>) {
        self.handlers.insert(name.into(), factory);
    }

    pub fn get(&self, name: &str) -> Option<&dyn CommandFactory> {
        self.handlers.get(name).map(|factory| factory.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// The `cd`, `echo`, `exit`, `pwd` and `type` built-ins.
    pub fn standard() -> Self {
        use crate::builtin::*;
        let mut table = Self::default();
        table.insert("cd", Box::new(Factory::<Cd>::default()));
        table.insert("echo", Box::new(Factory::<Echo>::default()));
        table.insert("exit", Box::new(Factory::<Exit>::default()));
        table.insert("pwd", Box::new(Factory::<Pwd>::default()));
        table.insert("type", Box::new(Factory::<Type>::default()));
        table
    }
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// Each input line is tokenized, split into command and redirection, dispatched
/// to a built-in or an external program, and run to completion before the call
/// returns. The [`Environment`] (variables, working directory) is the only
/// state carried from one line to the next.
///
/// Example
/// ```
/// use linesh::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.execute_line("echo hello world").unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    builtins: BuiltinTable,
    external: Box<dyn CommandFactory>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of built-ins.
    pub fn new(builtins: BuiltinTable) -> Self {
        let mut env = Environment::new();
        env.builtin_names = builtins.names().map(str::to_string).collect();
        Self {
            env,
            builtins,
            external: Box::new(Factory::<ExternalCommand>::default()),
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Status requested by `exit`, if it ran.
    pub fn exit_request(&self) -> Option<ExitCode> {
        self.env.exit_request
    }

    /// Pick the command `argv[0]` names: a built-in if one is registered under
    /// that exact name, otherwise a program found on the search path.
    pub fn dispatch(&self, argv: &[String]) -> Result<Box<dyn ExecutableCommand>, ShellError> {
        let (name, args) = match argv.split_first() {
            Some((name, args)) => (name.as_str(), args),
            None => return Err(ShellError::CommandNotFound(String::new())),
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        if let Some(factory) = self.builtins.get(name) {
            if let Some(cmd) = factory.try_create(&self.env, name, &args) {
                tracing::debug!(name, "dispatching to built-in");
                return Ok(cmd);
            }
        }
        self.external
            .try_create(&self.env, name, &args)
            .ok_or_else(|| ShellError::CommandNotFound(name.to_string()))
    }

    /// Run one input line against the interpreter's own standard streams.
    pub fn execute_line(&mut self, line: &str) -> Result<ExitCode, ShellError> {
        self.execute_line_with(line, Box::new(std::io::stdout()), Box::new(std::io::stderr()))
    }

    /// Run one input line with the given stdout and stderr.
    ///
    /// A redirection on the line replaces the matching stream with the target
    /// file, which is closed once the command has finished. Stdin is always
    /// inherited.
    pub fn execute_line_with(
        &mut self,
        line: &str,
        stdout: Box<dyn OutputStream>,
        stderr: Box<dyn OutputStream>,
    ) -> Result<ExitCode, ShellError> {
        let tokens = lexer::split_into_tokens(line)?;
        tracing::debug!(?tokens, "tokenized input");
        let Some(SimpleCommand { argv, redirect }) = parser::construct_command(tokens)? else {
            return Ok(0);
        };

        let cmd = self.dispatch(&argv)?;

        let (stdout, stderr) = match &redirect {
            None => (stdout, stderr),
            Some(spec) => {
                let file: Box<dyn OutputStream> = Box::new(spec.open(&self.env.current_dir)?);
                match spec.stream {
                    TargetStream::Stdout => (file, stderr),
                    TargetStream::Stderr => (stdout, file),
                }
            }
        };
        let streams = Streams {
            stdin: Box::new(InheritedStdin(std::io::stdin().lock())),
            stdout,
            stderr,
        };
        cmd.execute(streams, &mut self.env)
    }

    /// Read-Eval-Print Loop over a rustyline editor.
    ///
    /// Failures of a single line are printed to stderr and the loop continues.
    /// Returns the status to exit with, either requested by `exit` or the
    /// status of the last line when input ends.
    pub fn repl(&mut self, prompt: &str) -> rustyline::Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;
        let mut last_status = 0;

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    last_status = self.execute_reporting(&line);
                    if let Some(code) = self.env.exit_request {
                        return Ok(code);
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(last_status),
                Err(err) => return Err(err),
            }
        }
    }

    /// Execute `line`, printing any failure as one diagnostic line on stderr.
    pub fn execute_reporting(&mut self, line: &str) -> ExitCode {
        match self.execute_line(line) {
            Ok(code) => code,
            Err(err) => {
                tracing::debug!(error = ?err, "line failed");
                eprintln!("{err}");
                err.exit_code()
            }
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the standard built-ins and the external
    /// command launcher.
    fn default() -> Self {
        Self::new(BuiltinTable::standard())
    }
}

struct InheritedStdin<'a>(std::io::StdinLock<'a>);

impl Read for InheritedStdin<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

impl InputStream for InheritedStdin<'_> {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}
