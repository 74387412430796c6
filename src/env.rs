use crate::command::ExitCode;
use std::collections::{BTreeSet, HashMap};
use std::env as stdenv;
use std::ffi::OsString;
use std::path::PathBuf;

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: a map of environment variables that will be visible to executed commands.
/// - `current_dir`: the working directory for command execution and relative redirect targets.
/// - `exit_request`: set by the `exit` built-in; the REPL stops once it is `Some`.
/// - `builtin_names`: names registered with the interpreter, consulted by `type`.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// Status the interpreter should terminate with, once requested.
    pub exit_request: Option<ExitCode>,
    /// Names of the built-in commands known to the interpreter.
    pub builtin_names: BTreeSet<String>,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// This copies variables from `std::env::vars()` and initializes `current_dir`
    /// from `std::env::current_dir()`.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            current_dir,
            exit_request: None,
            builtin_names: BTreeSet::new(),
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The executable search path (`PATH`), empty when unset.
    pub fn search_path(&self) -> OsString {
        self.get_var("PATH").map(OsString::from).unwrap_or_default()
    }

    /// Case-insensitive check against the registered built-in names.
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtin_names
            .iter()
            .any(|builtin| builtin.eq_ignore_ascii_case(name))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::collections::{BTreeSet, HashMap};
    use std::env as stdenv;

    fn empty_env() -> Environment {
        Environment {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap(),
            exit_request: None,
            builtin_names: BTreeSet::new(),
        }
    }

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = empty_env();

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
        assert!(!env.search_path().is_empty());
    }

    #[test]
    fn test_search_path_prefers_own_vars() {
        let mut env = empty_env();
        env.set_var("PATH", "/opt/bin:/usr/local/bin");
        assert_eq!(env.search_path(), "/opt/bin:/usr/local/bin");
    }

    #[test]
    fn test_builtin_lookup_ignores_case() {
        let mut env = empty_env();
        env.builtin_names.insert("echo".to_string());
        assert!(env.is_builtin("echo"));
        assert!(env.is_builtin("ECHO"));
        assert!(!env.is_builtin("ls"));
    }
}
