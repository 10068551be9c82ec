use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::config::{GlobalAction, KeyResolver, LogAction, NavAction};
use crate::theme::Theme;

struct Hint {
    key: String,
    description: &'static str,
}

impl Hint {
    const fn new(key: String, description: &'static str) -> Self {
        Self { key, description }
    }
}

fn hints(resolver: &KeyResolver) -> Vec<Hint> {
    vec![
        Hint::new(resolver.display_logs(LogAction::Select), "View logs"),
        Hint::new(resolver.display_logs(LogAction::Clear), "Clear"),
        Hint::new(
            format!(
                "{}/{}",
                resolver.display_nav(NavAction::Up),
                resolver.display_nav(NavAction::Down)
            ),
            "Navigate",
        ),
        Hint::new(resolver.display_global(GlobalAction::FocusNext), "Next panel"),
        Hint::new(resolver.display_global(GlobalAction::Refresh), "Refresh"),
        Hint::new(resolver.display_global(GlobalAction::Quit), "Quit"),
    ]
}

/// One-line summary of the configured keybindings.
pub fn render(frame: &mut Frame, area: Rect, resolver: &KeyResolver, theme: &Theme) {
    let mut spans = Vec::new();
    for (i, hint) in hints(resolver).into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(theme.surface1)));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(theme.key())));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(hint.description, Style::default().fg(theme.subtext0)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
