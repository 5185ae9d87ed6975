use crate::error::LaunchError;
use std::path::PathBuf;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// Children killed by a signal are reported as `128 + signal`, like POSIX shells do.
pub type ExitCode = i32;

/// Ordered program name and arguments handed to a launched process.
///
/// Never empty: the first element is always the program name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentVector(Vec<String>);

impl ArgumentVector {
    /// Build an argument vector, or `None` when there is no program name.
    pub fn new(words: Vec<String>) -> Option<Self> {
        if words.is_empty() {
            None
        } else {
            Some(Self(words))
        }
    }

    /// The program to execute (`argv[0]`).
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    /// Arguments following the program name.
    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    /// Program name followed by its arguments.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Optional input and output files for a single process.
///
/// Both targets are independent; the operator tokens themselves never end up here
/// or in the argument vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectionSpec {
    /// File bound to the child's standard input (`< path`).
    pub input: Option<PathBuf>,
    /// File created/truncated and bound to the child's standard output (`> path`).
    pub output: Option<PathBuf>,
}

impl RedirectionSpec {
    /// Neither stream is redirected.
    pub fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none()
    }
}

/// One `;`-delimited segment of a line after tokenization.
///
/// `words` holds the operator-free tokens collected before any `|`; when the unit
/// contains a pipe, `second_stage` holds the raw whitespace-split tokens after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandUnit {
    pub words: Vec<String>,
    pub redirection: RedirectionSpec,
    pub background: bool,
    pub second_stage: Option<Vec<String>>,
}

impl CommandUnit {
    /// A unit with no words and no pipe launches nothing.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.second_stage.is_none()
    }
}

/// Two processes joined by an anonymous pipe.
///
/// The producer's standard output feeds the consumer's standard input. The pipe
/// itself only exists while the launcher wires the two children together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSpec {
    pub producer: ArgumentVector,
    /// Input file for the producer, taken from a `<` before the `|`.
    pub producer_input: Option<PathBuf>,
    pub consumer: ArgumentVector,
}

/// Whether the orchestrator blocks until a launched process terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Synchronous,
    Background,
}

impl Completion {
    pub fn from_background(background: bool) -> Self {
        if background {
            Completion::Background
        } else {
            Completion::Synchronous
        }
    }
}

/// What happened to a launched process from the orchestrator's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchResult {
    /// The child was waited for and has terminated.
    Completed { pid: u32, code: ExitCode },
    /// The child was left running; its status is not collected here.
    Detached { pid: u32 },
}

/// Capability to start processes with rebound standard streams.
///
/// [`crate::ProcessLauncher`] implements this on top of `std::process::Command`.
/// Implementations must not leave pipe descriptors open in the calling process
/// once a launch returns.
pub trait Launcher {
    /// Launch a single program with optional file redirections.
    fn launch(
        &mut self,
        argv: &ArgumentVector,
        redirection: &RedirectionSpec,
        completion: Completion,
    ) -> Result<LaunchResult, LaunchError>;

    /// Launch both stages of a pipeline and wait for every stage that started.
    ///
    /// Stages fail independently: a producer that cannot start still leaves the
    /// consumer running on an empty input, and the other way round.
    fn launch_pipeline(
        &mut self,
        pipeline: &PipelineSpec,
    ) -> [Result<LaunchResult, LaunchError>; 2];

    /// Collect background children that have already exited.
    ///
    /// Returns how many were collected. Never blocks.
    fn reap(&mut self) -> usize {
        0
    }
}
