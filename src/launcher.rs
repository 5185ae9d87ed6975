use crate::command::{
    ArgumentVector, Completion, ExitCode, LaunchResult, Launcher, PipelineSpec, RedirectionSpec,
};
use crate::error::LaunchError;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use tracing::{debug, info};

/// Launches real OS processes through `std::process::Command`.
///
/// Redirection files are opened in the parent and moved into the child's
/// standard streams, so every descriptor the parent opens is closed again by
/// the time a launch returns. Background children are kept so they can be
/// reaped later instead of lingering as zombies.
#[derive(Debug, Default)]
pub struct ProcessLauncher {
    background: Vec<Child>,
}

impl ProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of background children not yet reaped.
    pub fn pending(&self) -> usize {
        self.background.len()
    }
}

impl Launcher for ProcessLauncher {
    fn launch(
        &mut self,
        argv: &ArgumentVector,
        redirection: &RedirectionSpec,
        completion: Completion,
    ) -> Result<LaunchResult, LaunchError> {
        // Output first: a failing `<` still leaves the `>` target created.
        let stdout = match &redirection.output {
            Some(path) => Stdio::from(open_output(path)?),
            None => Stdio::inherit(),
        };
        let stdin = match &redirection.input {
            Some(path) => Stdio::from(open_input(path)?),
            None => Stdio::inherit(),
        };

        let mut child = spawn(argv, stdin, stdout)?;
        let pid = child.id();

        match completion {
            Completion::Synchronous => wait_completed(argv, &mut child),
            Completion::Background => {
                info!(pid, program = argv.program(), "running in background");
                self.background.push(child);
                Ok(LaunchResult::Detached { pid })
            }
        }
    }

    fn launch_pipeline(
        &mut self,
        pipeline: &PipelineSpec,
    ) -> [Result<LaunchResult, LaunchError>; 2] {
        let mut producer = match &pipeline.producer_input {
            Some(path) => open_input(path).map(Stdio::from),
            None => Ok(Stdio::inherit()),
        }
        .and_then(|stdin| spawn(&pipeline.producer, stdin, Stdio::piped()));

        // The write end lives only in the producer now; the read end moves into
        // the consumer's stdin and is dropped from this process once it spawns.
        // Without a producer the consumer reads an empty stream.
        let channel = match producer.as_mut().ok().and_then(|child| child.stdout.take()) {
            Some(read_end) => Stdio::from(read_end),
            None => Stdio::null(),
        };
        let consumer = spawn(&pipeline.consumer, channel, Stdio::inherit());

        // Both stages are collected before either error is handed back.
        let producer =
            producer.and_then(|mut child| wait_completed(&pipeline.producer, &mut child));
        let consumer =
            consumer.and_then(|mut child| wait_completed(&pipeline.consumer, &mut child));
        [producer, consumer]
    }

    fn reap(&mut self) -> usize {
        let before = self.background.len();
        self.background.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = child.id(), code = exit_code(status), "background child exited");
                false
            }
            Ok(None) => true,
            Err(err) => {
                debug!(pid = child.id(), %err, "cannot poll background child, dropping it");
                false
            }
        });
        before - self.background.len()
    }
}

fn open_output(path: &Path) -> Result<File, LaunchError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o700);
    }
    options.open(path).map_err(|source| LaunchError::OpenOutput {
        path: path.to_path_buf(),
        source,
    })
}

fn open_input(path: &Path) -> Result<File, LaunchError> {
    File::open(path).map_err(|source| LaunchError::OpenInput {
        path: path.to_path_buf(),
        source,
    })
}

fn spawn(argv: &ArgumentVector, stdin: Stdio, stdout: Stdio) -> Result<Child, LaunchError> {
    // The `Command` (and the stdio handles it owns) is dropped before returning,
    // so the parent keeps no copy of redirected or piped descriptors.
    let child = Command::new(argv.program())
        .args(argv.args())
        .stdin(stdin)
        .stdout(stdout)
        .spawn()
        .map_err(|source| LaunchError::spawn(argv.program(), source))?;
    debug!(pid = child.id(), argv = ?argv.as_slice(), "spawned");
    Ok(child)
}

fn wait(argv: &ArgumentVector, child: &mut Child) -> Result<ExitCode, LaunchError> {
    let status = child
        .wait()
        .map_err(|source| LaunchError::wait(argv.program(), source))?;
    let code = exit_code(status);
    debug!(pid = child.id(), code, "child exited");
    Ok(code)
}

fn wait_completed(argv: &ArgumentVector, child: &mut Child) -> Result<LaunchResult, LaunchError> {
    let code = wait(argv, child)?;
    Ok(LaunchResult::Completed {
        pid: child.id(),
        code,
    })
}

fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ExitCode {
    -1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn argv(words: &[&str]) -> ArgumentVector {
        ArgumentVector::new(words.iter().map(|w| w.to_string()).collect()).unwrap()
    }

    fn redirect(input: Option<PathBuf>, output: Option<PathBuf>) -> RedirectionSpec {
        RedirectionSpec { input, output }
    }

    #[test]
    fn synchronous_launch_reports_exit_code() {
        let mut launcher = ProcessLauncher::new();
        let ok = launcher
            .launch(&argv(&["true"]), &RedirectionSpec::default(), Completion::Synchronous)
            .unwrap();
        assert!(matches!(ok, LaunchResult::Completed { code: 0, .. }));

        let failed = launcher
            .launch(&argv(&["false"]), &RedirectionSpec::default(), Completion::Synchronous)
            .unwrap();
        assert!(matches!(failed, LaunchResult::Completed { code: 1, .. }));
    }

    #[test]
    fn signal_termination_maps_to_128_plus_signal() {
        let mut launcher = ProcessLauncher::new();
        let result = launcher
            .launch(
                &argv(&["sh", "-c", "kill -9 $$"]),
                &RedirectionSpec::default(),
                Completion::Synchronous,
            )
            .unwrap();
        assert!(matches!(result, LaunchResult::Completed { code: 137, .. }));
    }

    #[test]
    fn output_redirection_truncates_and_captures() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("junk.txt");
        fs::write(&out, "stale content that must disappear\n").unwrap();

        let mut launcher = ProcessLauncher::new();
        launcher
            .launch(
                &argv(&["echo", "hello"]),
                &redirect(None, Some(out.clone())),
                Completion::Synchronous,
            )
            .unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "hello\n");
    }

    #[test]
    fn input_and_output_redirection_together() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        fs::write(&input, "b\na\nc\n").unwrap();

        let mut launcher = ProcessLauncher::new();
        launcher
            .launch(
                &argv(&["sort"]),
                &redirect(Some(input), Some(output.clone())),
                Completion::Synchronous,
            )
            .unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn missing_input_fails_after_creating_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.txt");
        let output = dir.path().join("out.txt");

        let mut launcher = ProcessLauncher::new();
        let err = launcher
            .launch(
                &argv(&["cat"]),
                &redirect(Some(input.clone()), Some(output.clone())),
                Completion::Synchronous,
            )
            .unwrap_err();

        match err {
            LaunchError::OpenInput { path, .. } => assert_eq!(path, input),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(output.exists());
    }

    #[test]
    fn unknown_program_is_named_in_error() {
        let mut launcher = ProcessLauncher::new();
        let err = launcher
            .launch(
                &argv(&["definitely-not-a-real-program-osh"]),
                &RedirectionSpec::default(),
                Completion::Synchronous,
            )
            .unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
        assert!(
            err.to_string()
                .starts_with("definitely-not-a-real-program-osh: ")
        );
    }

    #[test]
    fn background_child_is_detached_then_reaped() {
        let mut launcher = ProcessLauncher::new();
        let result = launcher
            .launch(&argv(&["true"]), &RedirectionSpec::default(), Completion::Background)
            .unwrap();
        assert!(matches!(result, LaunchResult::Detached { .. }));
        assert_eq!(launcher.pending(), 1);

        let deadline = Instant::now() + Duration::from_secs(10);
        while launcher.pending() > 0 && Instant::now() < deadline {
            launcher.reap();
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(launcher.pending(), 0);
    }

    #[test]
    fn pipeline_feeds_producer_output_to_consumer() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("words.txt");
        let output = dir.path().join("count.txt");
        fs::write(&input, "one\ntwo\nthree\n").unwrap();

        let consumer_script = format!("wc -l > {}", output.display());
        let pipeline = PipelineSpec {
            producer: argv(&["cat"]),
            producer_input: Some(input),
            consumer: argv(&["sh", "-c", &consumer_script]),
        };

        let mut launcher = ProcessLauncher::new();
        let [producer, consumer] = launcher.launch_pipeline(&pipeline);
        assert!(matches!(producer, Ok(LaunchResult::Completed { code: 0, .. })));
        assert!(matches!(consumer, Ok(LaunchResult::Completed { code: 0, .. })));

        assert_eq!(fs::read_to_string(&output).unwrap().trim(), "3");
    }

    #[test]
    fn pipeline_consumer_sees_eof() {
        // Would hang if the parent kept a copy of the write end.
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("copy.txt");
        let consumer_script = format!("cat > {}", output.display());
        let pipeline = PipelineSpec {
            producer: argv(&["echo", "through", "the", "pipe"]),
            producer_input: None,
            consumer: argv(&["sh", "-c", &consumer_script]),
        };

        let [producer, consumer] = ProcessLauncher::new().launch_pipeline(&pipeline);
        producer.unwrap();
        consumer.unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "through the pipe\n");
    }

    #[test]
    fn pipeline_with_unknown_consumer_still_collects_producer() {
        let pipeline = PipelineSpec {
            producer: argv(&["echo", "lost"]),
            producer_input: None,
            consumer: argv(&["definitely-not-a-real-program-osh"]),
        };
        let [producer, consumer] = ProcessLauncher::new().launch_pipeline(&pipeline);
        assert!(matches!(producer, Ok(LaunchResult::Completed { .. })));
        assert!(matches!(
            consumer,
            Err(LaunchError::Spawn { ref program, .. }) if program == "definitely-not-a-real-program-osh"
        ));
    }

    #[test]
    fn pipeline_consumer_runs_when_producer_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("ran.txt");
        let consumer_script = format!("wc -c > {}", output.display());
        let pipeline = PipelineSpec {
            producer: argv(&["definitely-not-a-real-program-osh"]),
            producer_input: None,
            consumer: argv(&["sh", "-c", &consumer_script]),
        };

        let [producer, consumer] = ProcessLauncher::new().launch_pipeline(&pipeline);
        assert!(matches!(producer, Err(LaunchError::Spawn { .. })));
        assert!(matches!(consumer, Ok(LaunchResult::Completed { code: 0, .. })));
        assert_eq!(fs::read_to_string(&output).unwrap().trim(), "0");
    }

    #[test]
    fn pipeline_consumer_runs_when_producer_input_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.txt");
        let output = dir.path().join("ran.txt");
        let consumer_script = format!("wc -l > {}", output.display());
        let pipeline = PipelineSpec {
            producer: argv(&["cat"]),
            producer_input: Some(input.clone()),
            consumer: argv(&["sh", "-c", &consumer_script]),
        };

        let [producer, consumer] = ProcessLauncher::new().launch_pipeline(&pipeline);
        match producer {
            Err(LaunchError::OpenInput { path, .. }) => assert_eq!(path, input),
            other => panic!("unexpected producer result: {other:?}"),
        }
        assert!(consumer.is_ok());
        assert_eq!(fs::read_to_string(&output).unwrap().trim(), "0");
    }
}
