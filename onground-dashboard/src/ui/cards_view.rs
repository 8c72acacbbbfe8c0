//! Worker cards and tool registry

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::pane_block;
use crate::app::{App, Focus};
use crate::cards::{StatusDot, WorkerCard};
use crate::tools::StatusTone;

fn card_lines(card: &WorkerCard) -> Vec<Line<'static>> {
    let dot_color = match card.status.dot() {
        StatusDot::Green => Color::Green,
        StatusDot::Red => Color::Red,
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("● ", Style::default().fg(dot_color)),
            Span::styled(card.header_line(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(
            format!("  {}", card.status.label()),
            Style::default().fg(dot_color),
        )),
        Line::from(format!("  {}", card.task_line())),
    ];
    if let Some(message) = card.message_line() {
        lines.push(Line::from(Span::styled(
            format!("  {}", message),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!("  {}", card.action_line()),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));
    lines
}

pub fn render_cards(f: &mut Frame, area: Rect, app: &App) {
    let board = &app.dashboard.cards;
    let lines: Vec<Line> = if board.is_empty() {
        vec![Line::from(Span::styled(
            "No workers loaded",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        board
            .cards()
            .iter()
            .skip(app.dashboard.cards_scroll)
            .flat_map(card_lines)
            .collect()
    };

    let title = format!("Workers ({})", board.len());
    let widget = Paragraph::new(lines)
        .block(pane_block(&title, app, Some(Focus::Cards)))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

pub fn render_tools(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();
    for row in app.dashboard.tools.rows() {
        let tone = match row.tone {
            StatusTone::Good => Color::Green,
            StatusTone::Muted => Color::DarkGray,
            StatusTone::Bad => Color::Red,
        };
        lines.push(Line::from(vec![
            Span::styled(row.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(row.status_text.clone(), Style::default().fg(tone)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", row.details.join(" | ")),
            Style::default().fg(Color::DarkGray),
        )));
        if let Some(result) = &row.result_line {
            lines.push(Line::from(format!("  {}", result)));
        }
    }

    let widget = Paragraph::new(lines)
        .block(pane_block("Tool Registry", app, None))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
