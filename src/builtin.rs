use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Streams};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::find_command_path;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Executes the command writing to `stdout`, which may be a redirect target.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        streams: Streams,
        env: &mut Environment,
    ) -> Result<ExitCode, ShellError> {
        let Streams {
            mut stdout,
            mut stderr,
            ..
        } = streams;
        let code = match <T as BuiltinCommand>::execute(*self, &mut stdout, env) {
            Ok(x) => x,
            Err(e) => {
                writeln!(stderr, "{e:#}")?;
                1
            }
        };
        stdout.flush()?;
        stderr.flush()?;
        Ok(code)
    }
}

/// Result of `--help` or of arguments argh rejected.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        streams: Streams,
        _env: &mut Environment,
    ) -> Result<ExitCode, ShellError> {
        let mut sink = if self.is_error {
            streams.stderr
        } else {
            streams.stdout
        };
        writeln!(sink, "{}", self.output.trim_end())?;
        sink.flush()?;
        Ok(if self.is_error { 2 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute, relative, or starting with `~`. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl Cd {
    fn resolve_target(&self, env: &Environment) -> Result<PathBuf> {
        let home = || {
            env.get_var("HOME")
                .map(PathBuf::from)
                .context("cd: HOME not set")
        };
        let target = match self.target.as_deref() {
            None | Some("") | Some("~") => home()?,
            Some(t) => match t.strip_prefix("~/") {
                Some(rest) => home()?.join(rest),
                None => PathBuf::from(t),
            },
        };
        Ok(env.current_dir.join(target))
    }
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let new_dir = self.resolve_target(env)?;
        let shown = self.target.as_deref().unwrap_or("~");

        let canonical = match fs::canonicalize(&new_dir) {
            Ok(path) if path.is_dir() => path,
            Ok(_) => anyhow::bail!("cd: {shown}: Not a directory"),
            Err(_) => anyhow::bail!("cd: {shown}: No such file or directory"),
        };

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(0)
    }
}

/// Exit the shell with the given status.
///
/// Parsed by hand so that negative codes such as `-1` are not taken for flags.
pub struct Exit {
    /// status to exit with; 0 when omitted.
    pub code: Option<ExitCode>,
}

impl FromArgs for Exit {
    fn from_args(command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        let name = command_name.join(" ");
        match args {
            [] => Ok(Exit { code: None }),
            [code] => match code.parse() {
                Ok(code) => Ok(Exit { code: Some(code) }),
                Err(_) => Err(EarlyExit {
                    output: format!("{name}: {code}: numeric argument required"),
                    status: Err(()),
                }),
            },
            _ => Err(EarlyExit {
                output: format!("{name}: too many arguments"),
                status: Err(()),
            }),
        }
    }
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let code = self.code.unwrap_or(0);
        env.exit_request = Some(code);
        Ok(code)
    }
}

/// Write the arguments to standard output, separated by spaces.
/// By default, a trailing newline is printed.
///
/// Parsed by hand: apart from leading `-n` every argument, including ones that
/// look like flags, is printed as-is.
pub struct Echo {
    /// do not output the trailing newline.
    pub no_newline: bool,
    /// values to print as-is, separated by spaces.
    pub args: Vec<String>,
}

impl FromArgs for Echo {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        let flags = args.iter().take_while(|&&arg| arg == "-n").count();
        Ok(Echo {
            no_newline: flags > 0,
            args: args[flags..].iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        let s = self.args.join(" ");
        if self.no_newline {
            write!(stdout, "{}", s)?;
        } else {
            writeln!(stdout, "{}", s)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Tell how each name would be interpreted if used as a command.
pub struct Type {
    #[argh(positional, greedy)]
    /// command names to describe.
    pub names: Vec<String>,
}

impl BuiltinCommand for Type {
    fn name() -> &'static str {
        "type"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        if self.names.is_empty() {
            anyhow::bail!("type: usage: type name [name ...]");
        }
        let mut code = 0;
        for name in &self.names {
            if env.is_builtin(name) {
                writeln!(stdout, "{name} is a shell builtin")?;
                continue;
            }
            match find_command_path(&env.search_path(), &env.current_dir, Path::new(name)) {
                Some(path) => writeln!(stdout, "{name} is {}", path.display())?,
                None => {
                    writeln!(stdout, "{name}: not found")?;
                    code = 1;
                }
            }
        }
        Ok(code)
    }
}
