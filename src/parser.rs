//! Turns lexed unit sources into [`CommandUnit`]s and then into launchable [`Job`]s.
//!
//! Recognition is positional and single-pass, left to right:
//! - `>` and `<` consume the next token as their path, whatever it is;
//! - a standalone `&` marks the unit as background and ends it, the
//!   remaining tokens start a new unit;
//! - the first `|` ends the first stage, everything after it is kept verbatim
//!   as the second stage's arguments.
//!
//! Malformed input never errors: a dangling `>` or `<` means "no redirection",
//! and units left without a program are dropped.

use crate::command::{ArgumentVector, CommandUnit, PipelineSpec, RedirectionSpec};
use crate::lexer::{self, Token, UnitSource};
use std::path::PathBuf;
use tracing::debug;

/// A command unit resolved into something the launcher can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Simple {
        argv: ArgumentVector,
        redirection: RedirectionSpec,
        background: bool,
    },
    Pipeline(PipelineSpec),
}

struct UnitBuilder {
    tokens: Vec<Token>,
    pos: usize,
}

impl UnitBuilder {
    fn from(tokens: Vec<Token>) -> Self {
        UnitBuilder { tokens, pos: 0 }
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn has_more(&self) -> bool {
        self.pos < self.tokens.len()
    }

    /// Collect every remaining token as plain text.
    fn consume_rest_verbatim(&mut self) -> Vec<String> {
        let rest = self.tokens[self.pos..]
            .iter()
            .map(|token| token.text().to_string())
            .collect();
        self.pos = self.tokens.len();
        rest
    }

    fn consume_path(&mut self) -> Option<PathBuf> {
        self.consume().map(|token| PathBuf::from(token.text()))
    }

    /// Parse one unit, stopping after a standalone `&`, a pipe stage, or the end.
    fn parse_unit(&mut self) -> CommandUnit {
        let mut unit = CommandUnit::default();

        while let Some(token) = self.consume() {
            match token {
                Token::Word(word) => unit.words.push(word),
                Token::RedirectRight => {
                    if let Some(path) = self.consume_path() {
                        unit.redirection.output = Some(path);
                    }
                }
                Token::RedirectLeft => {
                    if let Some(path) = self.consume_path() {
                        unit.redirection.input = Some(path);
                    }
                }
                Token::Background => {
                    unit.background = true;
                    break;
                }
                Token::PipeOp => {
                    unit.second_stage = Some(self.consume_rest_verbatim());
                    break;
                }
            }
        }

        unit
    }

    fn parse_units(mut self, trailing_background: bool) -> Vec<CommandUnit> {
        let mut units = Vec::new();
        while self.has_more() {
            let mut unit = self.parse_unit();
            if !self.has_more() {
                unit.background |= trailing_background;
            }
            if !unit.is_empty() {
                units.push(unit);
            }
        }
        units
    }
}

/// Parse the command units of one unit source.
pub fn parse_source(source: UnitSource<'_>) -> Vec<CommandUnit> {
    UnitBuilder::from(lexer::split_into_tokens(source.text)).parse_units(source.background)
}

/// Parse a whole line into command units, in launch order.
pub fn parse_line(line: &str) -> Vec<CommandUnit> {
    lexer::split_units(line)
        .into_iter()
        .flat_map(parse_source)
        .collect()
}

/// Resolve a unit into a job whose argument vectors hold no operator or path tokens.
///
/// Returns `None` for units that cannot launch anything: no program name, or a
/// pipe with an empty stage on either side.
pub fn resolve(unit: CommandUnit) -> Option<Job> {
    let CommandUnit {
        words,
        redirection,
        background,
        second_stage,
    } = unit;

    match second_stage {
        None => Some(Job::Simple {
            argv: ArgumentVector::new(words)?,
            redirection,
            background,
        }),
        Some(consumer) => build_pipeline(words, redirection, consumer).map(Job::Pipeline),
    }
}

fn build_pipeline(
    producer: Vec<String>,
    redirection: RedirectionSpec,
    consumer: Vec<String>,
) -> Option<PipelineSpec> {
    let (Some(producer), Some(consumer)) =
        (ArgumentVector::new(producer), ArgumentVector::new(consumer))
    else {
        debug!("pipe with an empty stage, skipping unit");
        return None;
    };

    if let Some(output) = &redirection.output {
        debug!(
            path = %output.display(),
            program = producer.program(),
            "output redirection before a pipe is superseded by the pipe"
        );
    }

    Some(PipelineSpec {
        producer,
        producer_input: redirection.input,
        consumer,
    })
}
