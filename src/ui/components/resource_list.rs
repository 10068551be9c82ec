use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::cluster::{ResourceItem, ResourceKind};
use crate::config::{KeyResolver, NavAction};
use crate::theme::Theme;
use crate::ui::{Component, EventResult, Result};

const PAGE_STEP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceListEvent {
    /// The cursor moved to a new row.
    Changed(usize),
}

/// Cursor over one resource panel.
///
/// The rows themselves live in the application state; the list only tracks
/// how many there are and which one is highlighted.
pub struct ResourceList {
    kind: ResourceKind,
    state: ListState,
    len: usize,
    resolver: Arc<KeyResolver>,
}

impl ResourceList {
    pub fn new(kind: ResourceKind, resolver: Arc<KeyResolver>) -> Self {
        Self {
            kind,
            state: ListState::default(),
            len: 0,
            resolver,
        }
    }

    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Highlighted row index, if the list has any rows.
    pub fn selected(&self) -> Option<usize> {
        self.state.selected().filter(|i| *i < self.len)
    }

    /// Adjust the cursor after the snapshot behind this list was replaced.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;

        if len == 0 {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= len {
                self.state.select(Some(len - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    fn get_change_event(&self, before: Option<usize>) -> EventResult<ResourceListEvent> {
        if let Some(selected) = self.selected()
            && Some(selected) != before
        {
            return ResourceListEvent::Changed(selected).into();
        }
        EventResult::Consumed
    }

    fn select_clamped(&mut self, index: usize) {
        if self.len > 0 {
            self.state.select(Some(index.min(self.len - 1)));
        }
    }

    /// Draw the panel. `marked` names the pod whose logs are being followed.
    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        items: &[ResourceItem],
        focused: bool,
        marked: Option<&str>,
        theme: &Theme,
    ) {
        let border = if focused {
            theme.border_focused()
        } else {
            theme.border()
        };
        let block = Block::default()
            .title(format!(" {title} [{}] ", items.len()))
            .title_style(Style::default().fg(theme.title()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border));

        let rows: Vec<ListItem> = items
            .iter()
            .map(|item| {
                let is_marked = marked == Some(item.name.as_str());
                let marker = if is_marked { "● " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(theme.green)),
                    Span::styled(item.name.clone(), Style::default().fg(theme.text)),
                    Span::raw(" "),
                    Span::styled(item.status.clone(), Style::default().fg(theme.status(&item.status))),
                ]))
            })
            .collect();

        let mut highlight = Style::default().bg(theme.selection_bg());
        if focused {
            highlight = highlight.fg(theme.lavender).add_modifier(Modifier::BOLD);
        }

        let list = List::new(rows)
            .block(block)
            .highlight_style(highlight)
            .highlight_symbol("▶ ");

        // Rendering adjusts the scroll offset; keep that out of the cursor state.
        let mut state = self.state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }
}

impl Component for ResourceList {
    type Output = ResourceListEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let before = self.selected();
        let current = before.unwrap_or(0);

        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.select_clamped(before.map_or(0, |i| i + 1));
        } else if self.resolver.matches_nav(&key, NavAction::Up) {
            self.select_clamped(current.saturating_sub(1));
        } else if self.resolver.matches_nav(&key, NavAction::Home) {
            self.select_clamped(0);
        } else if self.resolver.matches_nav(&key, NavAction::End) {
            self.select_clamped(usize::MAX);
        } else if self.resolver.matches_nav(&key, NavAction::PageDown) {
            self.select_clamped(current.saturating_add(PAGE_STEP));
        } else if self.resolver.matches_nav(&key, NavAction::PageUp) {
            self.select_clamped(current.saturating_sub(PAGE_STEP));
        } else {
            return Ok(EventResult::Ignored);
        }

        Ok(self.get_change_event(before))
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn list(len: usize) -> ResourceList {
        let mut list = ResourceList::new(ResourceKind::Pod, Arc::new(KeyResolver::default()));
        list.set_len(len);
        list
    }

    #[test]
    fn test_empty_list_has_no_selection() {
        let mut list = list(0);
        assert_eq!(list.selected(), None);
        assert!(list.handle_key(key(KeyCode::Down)).unwrap().is_consumed());
        assert_eq!(list.selected(), None);
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut list = list(3);
        assert_eq!(list.selected(), Some(0));

        list.handle_key(key(KeyCode::Char('j'))).unwrap();
        list.handle_key(key(KeyCode::Down)).unwrap();
        list.handle_key(key(KeyCode::Down)).unwrap();
        assert_eq!(list.selected(), Some(2));

        list.handle_key(key(KeyCode::Home)).unwrap();
        assert_eq!(list.selected(), Some(0));
        list.handle_key(key(KeyCode::Up)).unwrap();
        assert_eq!(list.selected(), Some(0));

        list.handle_key(key(KeyCode::PageDown)).unwrap();
        assert_eq!(list.selected(), Some(2));
    }

    #[test]
    fn test_change_event() {
        let mut list = list(2);
        assert!(matches!(
            list.handle_key(key(KeyCode::Down)).unwrap(),
            EventResult::Event(ResourceListEvent::Changed(1))
        ));
        assert_eq!(list.handle_key(key(KeyCode::Down)).unwrap(), EventResult::Consumed);
        assert_eq!(list.handle_key(key(KeyCode::Enter)).unwrap(), EventResult::Ignored);
    }

    #[test]
    fn test_shrinking_snapshot_clamps_cursor() {
        let mut list = list(5);
        list.handle_key(key(KeyCode::End)).unwrap();
        assert_eq!(list.selected(), Some(4));

        list.set_len(2);
        assert_eq!(list.selected(), Some(1));
        list.set_len(0);
        assert_eq!(list.selected(), None);
        list.set_len(3);
        assert_eq!(list.selected(), Some(0));
    }
}
