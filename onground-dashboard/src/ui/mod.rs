//! UI rendering functions for the dashboard TUI
//!
//! Three columns under a header: worker cards and the tool registry, the
//! workflow stages and execution log, and the chat.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, Focus};

mod cards_view;
mod chat_view;
mod header_footer;
mod workflow_view;

pub use cards_view::{render_cards, render_tools};
pub use chat_view::{message_lines, render_chat};
pub use header_footer::{render_footer, render_header};
pub use workflow_view::{render_execution_log, render_stages};

/// Main UI rendering function
pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(32),
            Constraint::Percentage(36),
            Constraint::Percentage(32),
        ])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[0]);
    render_cards(f, left[0], app);
    render_tools(f, left[1], app);

    let middle = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(14), Constraint::Min(0)])
        .split(columns[1]);
    render_stages(f, middle[0], app);
    render_execution_log(f, middle[1], app);

    render_chat(f, columns[2], app);

    render_footer(f, chunks[2], app);
}

/// Bordered block, highlighted when `pane` has focus.
pub(crate) fn pane_block(title: &str, app: &App, pane: Option<Focus>) -> Block<'static> {
    let color = if pane.is_some_and(|p| p == app.focus) {
        Color::Yellow
    } else {
        Color::Cyan
    };
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .border_style(Style::default().fg(color))
}
