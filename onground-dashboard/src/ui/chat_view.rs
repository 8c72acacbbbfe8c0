//! Chat view rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::pane_block;
use crate::app::{App, ChatBubble, ChatRole, Focus};
use crate::formatter::{Block as TextBlock, FormattedMessage, InlineText};

fn inline_spans(text: &InlineText, base: Style) -> Vec<Span<'static>> {
    text.runs()
        .into_iter()
        .map(|run| {
            let mut style = base;
            if run.strong {
                style = style.add_modifier(Modifier::BOLD);
            }
            if run.emphasis {
                style = style.add_modifier(Modifier::ITALIC);
            }
            Span::styled(run.text, style)
        })
        .collect()
}

/// Terminal lines for a formatted message.
pub fn message_lines(message: &FormattedMessage) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for block in &message.blocks {
        match block {
            TextBlock::Paragraph { heading, content } => {
                let base = if *heading {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                lines.push(Line::from(inline_spans(content, base)));
            }
            TextBlock::List { ordered, items } => {
                for (idx, item) in items.iter().enumerate() {
                    let marker = if *ordered {
                        format!("  {}. ", idx + 1)
                    } else {
                        "  • ".to_string()
                    };
                    let mut spans = vec![Span::raw(marker)];
                    spans.extend(inline_spans(item, Style::default()));
                    lines.push(Line::from(spans));
                }
            }
            TextBlock::Break => lines.push(Line::from("")),
        }
    }
    lines
}

fn bubble_lines(bubble: &ChatBubble) -> Vec<Line<'static>> {
    let (label, color) = match bubble.role {
        ChatRole::User => ("You", Color::Green),
        ChatRole::Agent => ("Agent", Color::Cyan),
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("{}:", label),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))];

    match &bubble.formatted {
        Some(formatted) => lines.extend(message_lines(formatted)),
        None if bubble.loading => lines.push(Line::from(Span::styled(
            bubble.text.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ))),
        None => lines.extend(bubble.text.lines().map(|l| Line::from(l.to_string()))),
    }
    lines.push(Line::from(""));
    lines
}

pub fn render_chat(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Messages
            Constraint::Length(3), // Input box
        ])
        .split(area);

    let chat = &app.dashboard.chat;
    let lines: Vec<Line> = if chat.is_empty() {
        vec![Line::from(Span::styled(
            "Ask the agents about today's field operations...",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        chat.bubbles().iter().flat_map(bubble_lines).collect()
    };

    let height = chunks[0].height.saturating_sub(2);
    let bottom = (lines.len() as u16).saturating_sub(height);
    let offset = bottom.saturating_sub(chat.scroll_back);

    let messages = Paragraph::new(lines)
        .block(pane_block("Chat", app, Some(Focus::Chat)))
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    f.render_widget(messages, chunks[0]);

    let input = Paragraph::new(app.input_buffer.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Type your message (Enter to send) ")
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(input, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_items_get_markers() {
        let message =
            FormattedMessage::parse("Delays:\n- W101 late\n- W194 late\n\n1. call\n2. reroute");
        let text: Vec<String> = message_lines(&message)
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(
            text,
            vec![
                "Delays:",
                "  • W101 late",
                "  • W194 late",
                "",
                "  1. call",
                "  2. reroute",
            ]
        );
    }

    #[test]
    fn test_bold_runs_are_styled() {
        let message = FormattedMessage::parse("see **W101** now");
        let lines = message_lines(&message);
        let bold: Vec<_> = lines[0]
            .spans
            .iter()
            .filter(|s| s.style.add_modifier.contains(Modifier::BOLD))
            .map(|s| s.content.to_string())
            .collect();
        assert_eq!(bold, vec!["W101"]);
    }
}
