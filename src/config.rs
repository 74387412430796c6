use argh::FromArgs;

/// Environment variable consulted for the log filter when `--log` is absent.
pub const LOG_ENV: &str = "LINESH_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(FromArgs, Debug, PartialEq)]
/// A line-oriented command interpreter with built-ins and output redirection.
pub struct Options {
    #[argh(option, short = 'c')]
    /// run a single command line and exit with its status.
    pub command: Option<String>,

    #[argh(option, default = "String::from(\"$ \")")]
    /// prompt printed before each input line.
    pub prompt: String,

    #[argh(option)]
    /// tracing filter for diagnostics on stderr, e.g. "debug" (overrides LINESH_LOG).
    pub log: Option<String>,
}

impl Options {
    /// Filter directive for the log subscriber: `--log`, then `env_value`, then `warn`.
    pub fn log_filter(&self, env_value: Option<String>) -> String {
        self.log
            .clone()
            .or(env_value)
            .filter(|filter| !filter.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }
}
