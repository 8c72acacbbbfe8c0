//! Tool registry display rows

use onground_sdk::{Tool, ToolStatus};

/// How a tool status is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Good,
    Muted,
    Bad,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolRow {
    pub name: String,
    pub details: Vec<String>,
    pub status_text: String,
    pub tone: StatusTone,
    pub result_line: Option<String>,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ToolRow {
    pub fn from_tool(tool: &Tool) -> Self {
        let (icon, tone) = match tool.status {
            ToolStatus::Success => ('✓', StatusTone::Good),
            ToolStatus::Idle => ('○', StatusTone::Muted),
            ToolStatus::Other(_) => ('×', StatusTone::Bad),
        };

        let result = tool.result.as_deref().filter(|r| !r.is_empty());
        let mut status_text = format!("{} {}", icon, capitalize(&tool.status.to_string()));
        if let Some(result) = result {
            status_text.push_str(&format!(" ({})", result));
        }

        let returns = tool
            .returns
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or("—");
        let last_used = tool
            .last_used
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or("Never");

        Self {
            name: tool.name.clone(),
            details: vec![
                format!("Type: {}", tool.kind),
                format!("Returns: {}", returns),
                format!("Last Used: {}", last_used),
            ],
            status_text,
            tone,
            result_line: result.map(|r| format!("Result: {}", r)),
        }
    }
}

/// Flat list of tools; re-rendering replaces it.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    rows: Vec<ToolRow>,
}

impl ToolRegistry {
    pub fn render(&mut self, tools: &[Tool]) {
        self.rows = tools.iter().map(ToolRow::from_tool).collect();
        tracing::info!(count = self.rows.len(), "rendered tool registry");
    }

    pub fn rows(&self) -> &[ToolRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
