use argh::FromArgs;
use osh::config::{DEFAULT_LOG_FILTER, DEFAULT_MAX_LINE, DEFAULT_PROMPT};
use osh::{Interpreter, ProcessLauncher, ShellConfig};
use tracing_subscriber::EnvFilter;

/// A small shell: `;` sequencing, `&` background, `<`/`>` redirection and one `|` per command.
#[derive(FromArgs)]
struct Options {
    /// read commands from the terminal instead of running the built-in self test
    #[argh(switch, short = 'i')]
    interactive: bool,

    /// longest accepted input line in characters, 0 for no limit
    #[argh(option, default = "DEFAULT_MAX_LINE")]
    max_line: usize,

    /// prompt printed before each line
    #[argh(option, default = "String::from(DEFAULT_PROMPT)")]
    prompt: String,

    /// log engine decisions to stderr
    #[argh(switch, short = 'd')]
    debug: bool,
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { DEFAULT_LOG_FILTER };
    let filter =
        EnvFilter::try_from_env("OSH_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    let options: Options = argh::from_env();
    init_logging(options.debug);

    let config = ShellConfig::default()
        .with_max_line(options.max_line)
        .with_prompt(options.prompt);
    let mut shell = Interpreter::new(config, Box::new(ProcessLauncher::new()));

    if options.interactive {
        shell.repl()
    } else {
        shell.run_self_tests(&mut std::io::stdout())
    }
}
