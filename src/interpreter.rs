use crate::builtin;
use crate::command::{Completion, LaunchResult, Launcher};
use crate::config::ShellConfig;
use crate::error::LaunchError;
use crate::history::{HistorySlot, RECALL_TOKEN};
use crate::launcher::ProcessLauncher;
use crate::parser::{self, Job};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;
use tracing::debug;

/// Line that ends the interactive loop.
pub const EXIT_COMMAND: &str = "exit";

/// Lines replayed by [`Interpreter::run_self_tests`], in order.
pub const SELF_TEST_LINES: [&str; 7] = [
    "ls",
    "ls -al",
    "ls & whoami ;",
    "ls > junk.txt",
    "cat < junk.txt",
    "ls | wc",
    "ascii",
];

/// What became of one command unit.
#[derive(Debug)]
pub enum UnitOutcome {
    /// The banner built-in ran in-process.
    Builtin,
    Launched(LaunchResult),
    /// Producer and consumer stages; each one fails or runs on its own.
    Piped([Result<LaunchResult, LaunchError>; 2]),
    /// Nothing could be launched for this unit (e.g. a pipe with an empty side).
    Skipped,
    /// The unit's process could not be started; the diagnostic was already printed.
    Failed(LaunchError),
}

/// Outcomes of every unit of a line, in launch order.
#[derive(Debug, Default)]
pub struct LineReport {
    pub outcomes: Vec<UnitOutcome>,
}

impl LineReport {
    /// Number of child processes started for the line.
    pub fn launched(&self) -> usize {
        self.outcomes
            .iter()
            .map(|outcome| match outcome {
                UnitOutcome::Launched(_) => 1,
                UnitOutcome::Piped(stages) => stages.iter().filter(|s| s.is_ok()).count(),
                _ => 0,
            })
            .sum()
    }
}

/// Whether the read loop should keep going after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Drives lines through parsing and launching, one command unit at a time.
///
/// Units run strictly left to right. A failing unit never prevents later
/// units from running, and launch errors never escape as `Err`: only a failure
/// to write to the output stream does.
///
/// Example
/// ```no_run
/// use osh::Interpreter;
/// let mut sh = Interpreter::default();
/// let report = sh.execute_line("ls -al; whoami").unwrap();
/// assert_eq!(report.outcomes.len(), 2);
/// ```
pub struct Interpreter {
    config: ShellConfig,
    launcher: Box<dyn Launcher>,
    history: HistorySlot,
}

impl Interpreter {
    /// Create an interpreter with a custom launcher.
    pub fn new(config: ShellConfig, launcher: Box<dyn Launcher>) -> Self {
        Self {
            config,
            launcher,
            history: HistorySlot::new(),
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn history(&self) -> &HistorySlot {
        &self.history
    }

    /// Execute every command unit of `line`, printing built-in output to stdout.
    pub fn execute_line(&mut self, line: &str) -> anyhow::Result<LineReport> {
        self.execute_line_with_output(line, &mut std::io::stdout())
    }

    /// Execute every command unit of `line`, printing built-in output to `stdout`.
    pub fn execute_line_with_output(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
    ) -> anyhow::Result<LineReport> {
        let reaped = self.launcher.reap();
        if reaped > 0 {
            debug!(reaped, "collected finished background children");
        }

        let mut report = LineReport::default();
        for unit in parser::parse_line(line) {
            debug!(?unit, "command unit");
            let outcome = match parser::resolve(unit) {
                Some(job) => self.execute_job(job, stdout)?,
                None => {
                    debug!("nothing to launch, skipping unit");
                    UnitOutcome::Skipped
                }
            };
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    fn execute_job(&mut self, job: Job, stdout: &mut dyn Write) -> anyhow::Result<UnitOutcome> {
        let outcome = match job {
            Job::Simple { argv, .. } if argv.program() == self.config.banner_command => {
                builtin::print_banner(stdout)?;
                UnitOutcome::Builtin
            }
            Job::Simple {
                argv,
                redirection,
                background,
            } => match self.launcher.launch(
                &argv,
                &redirection,
                Completion::from_background(background),
            ) {
                Ok(result) => UnitOutcome::Launched(result),
                Err(err) => {
                    report_failure(&err);
                    UnitOutcome::Failed(err)
                }
            },
            // Pipelines are always waited for, background marker or not.
            Job::Pipeline(pipeline) => {
                let stages = self.launcher.launch_pipeline(&pipeline);
                for err in stages.iter().filter_map(|stage| stage.as_ref().err()) {
                    report_failure(err);
                }
                UnitOutcome::Piped(stages)
            }
        };
        Ok(outcome)
    }

    /// Handle one line of interactive input: history recall, `exit`, and execution.
    ///
    /// `!!` and `exit` are only recognized as the whole line, surrounding
    /// whitespace included. `!!` replays the stored line without replacing it.
    /// Any other non-blank line within the length limit becomes the stored line.
    pub fn handle_input(&mut self, line: &str, stdout: &mut dyn Write) -> anyhow::Result<Flow> {
        let line = line.trim_end_matches(['\n', '\r']);

        if line == RECALL_TOKEN {
            match self.history.last().map(str::to_owned) {
                Some(last) => {
                    writeln!(stdout, "Executing last command: {last}")?;
                    self.execute_line_with_output(&last, stdout)?;
                }
                None => writeln!(stdout, "No commands in history.")?,
            }
            return Ok(Flow::Continue);
        }

        if !self.config.accepts(line) {
            eprintln!(
                "osh: line too long ({} > {} characters)",
                line.chars().count(),
                self.config.max_line.unwrap_or_default()
            );
            return Ok(Flow::Continue);
        }

        self.history.record(line);

        if line == EXIT_COMMAND {
            return Ok(Flow::Exit);
        }
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }

        self.execute_line_with_output(line, stdout)?;
        Ok(Flow::Continue)
    }

    /// Read-eval loop over the terminal until `exit` or end of input.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new()?;
        let prompt = self.config.prompt.clone();

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    if self.handle_input(&line, &mut std::io::stdout())? == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    println!("Exiting shell");
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }

    /// Run the canned command lines used as a smoke test of the whole engine.
    pub fn run_self_tests(&mut self, stdout: &mut dyn Write) -> anyhow::Result<()> {
        writeln!(stdout, "*** Running basic tests ***")?;
        for (i, line) in SELF_TEST_LINES.iter().enumerate() {
            writeln!(stdout, "* {}. Testing {} *", i + 1, line)?;
            stdout.flush()?;
            self.execute_line_with_output(line, stdout)?;
        }
        Ok(())
    }
}

/// The one user-facing line for a failed launch; logs stay at debug level.
fn report_failure(err: &LaunchError) {
    eprintln!("{err}");
    debug!(%err, "command unit failed");
}

impl Default for Interpreter {
    /// Default configuration with a launcher that spawns real processes.
    fn default() -> Self {
        Self::new(ShellConfig::default(), Box::new(ProcessLauncher::new()))
    }
}
