/// Token that replays the last stored line.
pub const RECALL_TOKEN: &str = "!!";

/// The single most recent line the user submitted.
///
/// Owned by the interpreter; there is no process-wide copy.
#[derive(Debug, Clone, Default)]
pub struct HistorySlot {
    last: Option<String>,
}

impl HistorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `line` unless it is blank or is itself a recall request.
    ///
    /// Returns whether the slot was overwritten.
    pub fn record(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() || line == RECALL_TOKEN {
            return false;
        }
        self.last = Some(line.to_string());
        true
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}
