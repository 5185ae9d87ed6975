/// Prompt printed before each interactive line.
pub const DEFAULT_PROMPT: &str = "osh> ";

/// Longest accepted input line, in characters.
pub const DEFAULT_MAX_LINE: usize = 80;

/// Name of the command that prints the banner instead of launching a process.
pub const DEFAULT_BANNER_COMMAND: &str = "ascii";

/// Log filter used when `OSH_LOG` is unset. Per-unit failures are printed as
/// plain diagnostics and only logged at `debug`, so they stay below it.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime settings of an [`crate::Interpreter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub prompt: String,
    /// `None` lifts the line length limit.
    pub max_line: Option<usize>,
    pub banner_command: String,
}

impl ShellConfig {
    /// Build a config from a user-facing limit where 0 means "unlimited".
    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.max_line = (max_line > 0).then_some(max_line);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Whether `line` is within the configured length limit.
    pub fn accepts(&self, line: &str) -> bool {
        self.max_line
            .is_none_or(|limit| line.chars().count() <= limit)
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            max_line: Some(DEFAULT_MAX_LINE),
            banner_command: DEFAULT_BANNER_COMMAND.to_string(),
        }
    }
}
