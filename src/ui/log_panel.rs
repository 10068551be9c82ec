use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::state::LogBuffer;
use crate::theme::Theme;

/// Log panel, pinned to the newest lines.
pub fn render(frame: &mut Frame, area: Rect, pod: Option<&str>, logs: &LogBuffer, theme: &Theme) {
    let title = match pod {
        Some(pod) => format!(" Logs: {pod} ({}) ", logs.len()),
        None => " Logs ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(theme.title()).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border()));

    let height = block.inner(area).height as usize;

    let lines: Vec<Line> = if pod.is_none() {
        vec![Line::styled(
            "Select a pod to follow its logs",
            Style::default().fg(theme.muted()),
        )]
    } else {
        let skip = logs.len().saturating_sub(height);
        logs.display_lines()
            .skip(skip)
            .map(|line| Line::styled(line.to_string(), Style::default().fg(theme.text)))
            .collect()
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
