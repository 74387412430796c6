use linesh::Interpreter;
use linesh::config::{LOG_ENV, Options};
use tracing_subscriber::EnvFilter;

fn init_logging(opts: &Options) {
    let filter = opts.log_filter(std::env::var(LOG_ENV).ok());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let opts: Options = argh::from_env();
    init_logging(&opts);

    let mut sh = Interpreter::default();
    let code = match &opts.command {
        Some(line) => sh.execute_reporting(line),
        None => sh.repl(&opts.prompt)?,
    };
    std::process::exit(code);
}
