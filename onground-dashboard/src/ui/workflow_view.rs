//! Stage panels and execution log

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::pane_block;
use crate::app::{App, Focus, StagePanel};
use crate::workflow::StageStatus;

fn stage_lines(panel: &StagePanel) -> Vec<Line<'static>> {
    let color = match panel.status {
        StageStatus::Pending => Color::DarkGray,
        StageStatus::Running => Color::Yellow,
        StageStatus::Complete => Color::Green,
    };

    let mut header = vec![
        Span::styled("▌", Style::default().fg(color)),
        Span::styled(
            format!("{:<16}", panel.stage.agent_name()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(panel.status_line(), Style::default().fg(color)),
    ];
    if let Some(duration) = &panel.duration {
        header.push(Span::raw(format!(" {}", duration)));
    }

    let mut details = Vec::new();
    if let Some(tools) = &panel.tools {
        details.push(format!("Tools: {}", tools));
    }
    if let Some(findings) = &panel.findings {
        details.push(findings.clone());
    }
    if let Some(output) = &panel.output {
        details.push(format!("Output: {}", output));
    }

    let mut lines = vec![Line::from(header)];
    if !details.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", details.join("  ")),
            Style::default().fg(Color::Gray),
        )));
    }
    lines.extend(
        panel
            .items
            .iter()
            .map(|item| Line::from(format!("  {}", item))),
    );
    lines
}

pub fn render_stages(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app.dashboard.stages.iter().flat_map(stage_lines).collect();
    let widget = Paragraph::new(lines).block(pane_block("Workflow", app, None));
    f.render_widget(widget, area);
}

pub fn render_execution_log(f: &mut Frame, area: Rect, app: &App) {
    let log = &app.dashboard.log;
    let height = area.height.saturating_sub(2) as usize;
    let start = log.window_start(height);

    let lines: Vec<Line> = log
        .entries()
        .iter()
        .skip(start)
        .take(height)
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("[{}] ", entry.timestamp.format("%H:%M:%S")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(entry.text.clone()),
            ])
        })
        .collect();

    let title = if log.is_following() {
        "Execution Log".to_string()
    } else {
        "Execution Log (scrolled)".to_string()
    };
    let widget = Paragraph::new(lines).block(pane_block(&title, app, Some(Focus::ExecutionLog)));
    f.render_widget(widget, area);
}
