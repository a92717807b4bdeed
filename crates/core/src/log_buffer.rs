use crate::log_line::LogLine;

/// Append-only log lines for the action currently shown in detail.
///
/// Arrival order is display order. The buffer lives as long as the
/// detail view that owns it and is never persisted.
#[derive(Debug, Default, Clone)]
pub struct LogBuffer {
    lines: Vec<LogLine>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: LogLine) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
