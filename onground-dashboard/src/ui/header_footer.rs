//! Header and footer rendering functions

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

pub fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let header = &app.dashboard.header;
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled(
            "OnGround Agent Dashboard",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("      "),
        Span::styled("Session: ", label),
        Span::styled(header.session_id.clone(), value),
        Span::raw("   "),
        Span::styled("Agents: ", label),
        Span::styled(header.agents_completed.to_string(), value),
        Span::raw("   "),
        Span::styled("Duration: ", label),
        Span::styled(header.duration.clone().unwrap_or_else(|| "-".to_string()), value),
    ];
    if app.is_run_active() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            "● running",
            Style::default().fg(Color::Yellow),
        ));
    }

    let widget = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

pub fn render_footer(f: &mut Frame, area: Rect, _app: &App) {
    let key = Style::default().add_modifier(Modifier::BOLD);
    let footer_text = Line::from(vec![
        Span::styled("[Enter]", key),
        Span::raw(" Send  "),
        Span::styled("[Tab]", key),
        Span::raw(" Switch Pane  "),
        Span::styled("[↑↓]", key),
        Span::raw(" Scroll  "),
        Span::styled("[End]", key),
        Span::raw(" Follow  "),
        Span::styled("[Esc/Ctrl+C]", key),
        Span::raw(" Quit"),
    ]);

    let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}
