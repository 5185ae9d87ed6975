//! A small command-line interpreter engine.
//!
//! A line of text is split into `;`-separated command units, each unit is
//! tokenized into an argument vector with optional `<`/`>` redirections, an
//! optional trailing `&` background marker and an optional single `|` pipe,
//! and the result is launched as one or two child processes.
//!
//! The main entry point is [`Interpreter`], which drives a line through the
//! [`lexer`] and [`parser`] and hands the resulting jobs to a [`Launcher`].
//! The default launcher, [`ProcessLauncher`], spawns real OS processes; tests
//! and embedders can plug in their own implementation.

mod builtin;
pub mod command;
pub mod config;
pub mod error;
mod history;
mod interpreter;
mod launcher;
pub mod lexer;
pub mod parser;

pub use command::{ArgumentVector, Completion, LaunchResult, Launcher, PipelineSpec};
pub use config::ShellConfig;
pub use error::LaunchError;
pub use history::HistorySlot;
pub use interpreter::{Flow, Interpreter, LineReport, UnitOutcome};
pub use launcher::ProcessLauncher;
