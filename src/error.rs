use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to get a command unit's process(es) running.
///
/// Each variant is scoped to one command unit: the interpreter reports it and
/// moves on to the next unit.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("open: {}: {source}", .path.display())]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("open: {}: {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The program could not be found or executed.
    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program}: wait failed: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    pub(crate) fn spawn(program: &str, source: io::Error) -> Self {
        LaunchError::Spawn {
            program: program.to_string(),
            source,
        }
    }

    pub(crate) fn wait(program: &str, source: io::Error) -> Self {
        LaunchError::Wait {
            program: program.to_string(),
            source,
        }
    }
}
