//! Execution log shown next to the stage panels

use chrono::{DateTime, Local};

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionLogEntry {
    pub timestamp: DateTime<Local>,
    pub text: String,
}

impl ExecutionLogEntry {
    pub fn new(text: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            text: text.into(),
        }
    }

    /// `[HH:MM:SS] text`
    pub fn display_line(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.text)
    }
}

/// Append-only log; entries only disappear on [`ExecutionLog::reset`].
#[derive(Debug, Clone)]
pub struct ExecutionLog {
    entries: Vec<ExecutionLogEntry>,
    /// Lines scrolled up from the bottom. Zero keeps the view pinned to the newest entry.
    scroll_back: usize,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            scroll_back: 0,
        }
    }

    pub fn append(&mut self, text: impl Into<String>, timestamp: DateTime<Local>) {
        let entry = ExecutionLogEntry::new(text, timestamp);
        tracing::debug!(text = %entry.text, "execution log");
        self.entries.push(entry);
        self.scroll_to_end();
    }

    pub fn push(&mut self, entry: ExecutionLogEntry) {
        self.append(entry.text, entry.timestamp);
    }

    /// Clear everything. Only a new workflow run does this.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.scroll_back = 0;
    }

    pub fn entries(&self) -> &[ExecutionLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.display_line()).collect()
    }

    pub fn scroll_to_end(&mut self) {
        self.scroll_back = 0;
    }

    pub fn scroll_up(&mut self) {
        if self.scroll_back + 1 < self.entries.len() {
            self.scroll_back += 1;
        }
    }

    pub fn scroll_down(&mut self) {
        self.scroll_back = self.scroll_back.saturating_sub(1);
    }

    /// First entry index to draw so the window of `height` rows ends at the current position.
    pub fn window_start(&self, height: usize) -> usize {
        let end = self.entries.len().saturating_sub(self.scroll_back);
        end.saturating_sub(height)
    }

    pub fn is_following(&self) -> bool {
        self.scroll_back == 0
    }
}

impl Default for ExecutionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 11, 20, h, m, s).unwrap()
    }

    #[test]
    fn test_display_line_format() {
        let entry = ExecutionLogEntry::new("WORKFLOW STARTED", at(9, 5, 7));
        assert_eq!(entry.display_line(), "[09:05:07] WORKFLOW STARTED");
    }

    #[test]
    fn test_append_preserves_order() {
        let mut log = ExecutionLog::new();
        log.append("first", at(9, 0, 0));
        log.append("second", at(9, 0, 1));
        log.append("third", at(9, 0, 1));

        let texts: Vec<_> = log.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_reset_clears_entries() {
        let mut log = ExecutionLog::new();
        log.append("one", at(9, 0, 0));
        log.scroll_up();
        log.reset();
        assert!(log.is_empty());
        assert!(log.is_following());
    }

    #[test]
    fn test_append_scrolls_to_end() {
        let mut log = ExecutionLog::new();
        for i in 0..10 {
            log.append(format!("line {}", i), at(9, 0, i));
        }
        log.scroll_up();
        log.scroll_up();
        assert!(!log.is_following());
        assert_eq!(log.window_start(3), 5);

        log.append("newest", at(9, 1, 0));
        assert!(log.is_following());
        assert_eq!(log.window_start(3), 8);
    }
}
