use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::config::{GlobalAction, KeyResolver};
use crate::theme::Theme;

/// Full-screen error view. Once an error is set it replaces the dashboard.
pub fn render(frame: &mut Frame, area: Rect, message: &str, resolver: &KeyResolver, theme: &Theme) {
    let popup_area = area.centered(Constraint::Percentage(80), Constraint::Percentage(50));

    let title_style = Style::default().fg(theme.error()).add_modifier(Modifier::BOLD);
    let hint = format!(
        "Press {} to quit",
        resolver.display_global(GlobalAction::Quit)
    );

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("Error: {message}"), Style::default().fg(theme.text))),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(theme.muted()))),
    ];

    let block = Block::default()
        .title(" Error ")
        .title_style(title_style)
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.error()))
        .style(Style::default().bg(theme.base));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, popup_area);
}
