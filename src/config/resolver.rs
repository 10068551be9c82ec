use crate::config::actions::{GlobalAction, LogAction, NavAction};
use crate::config::keybindings::KeybindingsConfig;
use crossterm::event::KeyEvent;
use std::sync::Arc;

pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::Suspend => kb.suspend.matches(event),
            GlobalAction::Refresh => kb.refresh.matches(event),
            GlobalAction::FocusNext => kb.focus_next.matches(event),
            GlobalAction::FocusPrev => kb.focus_prev.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display(),
            GlobalAction::Suspend => kb.suspend.display(),
            GlobalAction::Refresh => kb.refresh.display(),
            GlobalAction::FocusNext => kb.focus_next.display(),
            GlobalAction::FocusPrev => kb.focus_prev.display(),
        }
    }

    // Navigation actions
    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.matches(event),
            NavAction::Down => kb.down.matches(event),
            NavAction::PageUp => kb.page_up.matches(event),
            NavAction::PageDown => kb.page_down.matches(event),
            NavAction::Home => kb.home.matches(event),
            NavAction::End => kb.end.matches(event),
        }
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.display(),
            NavAction::Down => kb.down.display(),
            NavAction::PageUp => kb.page_up.display(),
            NavAction::PageDown => kb.page_down.display(),
            NavAction::Home => kb.home.display(),
            NavAction::End => kb.end.display(),
        }
    }

    // Log panel actions
    pub fn matches_logs(&self, event: &KeyEvent, action: LogAction) -> bool {
        let kb = &self.keybindings.logs;
        match action {
            LogAction::Select => kb.select.matches(event),
            LogAction::Clear => kb.clear.matches(event),
        }
    }

    pub fn display_logs(&self, action: LogAction) -> String {
        let kb = &self.keybindings.logs;
        match action {
            LogAction::Select => kb.select.display(),
            LogAction::Clear => kb.clear.display(),
        }
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}
