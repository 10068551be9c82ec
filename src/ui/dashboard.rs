use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::cluster::ResourceKind;
use crate::config::KeyResolver;
use crate::state::AppState;
use crate::theme::Theme;
use crate::ui::components::{ResourceList, ResourceListEvent};
use crate::ui::{Component, EventResult, Result, error_view, hint_bar, log_panel};

const TITLE: &str = "Kubernetes & KrakenD Dashboard";

/// The three resource panels, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Pods,
    Deployments,
    Services,
}

impl Panel {
    pub const fn kind(self) -> ResourceKind {
        match self {
            Self::Pods => ResourceKind::Pod,
            Self::Deployments => ResourceKind::Deployment,
            Self::Services => ResourceKind::Service,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Pods => "Pods",
            Self::Deployments => "Deployments",
            Self::Services => "Services",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Pods => Self::Deployments,
            Self::Deployments => Self::Services,
            Self::Services => Self::Pods,
        }
    }

    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Pods => Self::Services,
            Self::Deployments => Self::Pods,
            Self::Services => Self::Deployments,
        }
    }
}

/// View-local dashboard state: one cursor per panel and the focused panel.
pub struct DashboardView {
    pods: ResourceList,
    deployments: ResourceList,
    services: ResourceList,
    focus: Panel,
    /// Label selector the panels were queried with.
    selector: String,
}

impl DashboardView {
    pub fn new(resolver: &Arc<KeyResolver>, selector: impl Into<String>) -> Self {
        Self {
            pods: ResourceList::new(ResourceKind::Pod, resolver.clone()),
            deployments: ResourceList::new(ResourceKind::Deployment, resolver.clone()),
            services: ResourceList::new(ResourceKind::Service, resolver.clone()),
            focus: Panel::default(),
            selector: selector.into(),
        }
    }

    /// Panel title qualified with the label selector, e.g. `Pods (app=my-app)`.
    fn panel_title(&self, panel: Panel) -> String {
        if self.selector.is_empty() {
            panel.title().to_string()
        } else {
            format!("{} ({})", panel.title(), self.selector)
        }
    }

    pub const fn focus(&self) -> Panel {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    const fn list(&self, panel: Panel) -> &ResourceList {
        match panel {
            Panel::Pods => &self.pods,
            Panel::Deployments => &self.deployments,
            Panel::Services => &self.services,
        }
    }

    fn list_mut(&mut self, panel: Panel) -> &mut ResourceList {
        match panel {
            Panel::Pods => &mut self.pods,
            Panel::Deployments => &mut self.deployments,
            Panel::Services => &mut self.services,
        }
    }

    /// Clamp every cursor to the current snapshot.
    pub fn sync(&mut self, state: &AppState) {
        for list in [&mut self.pods, &mut self.deployments, &mut self.services] {
            let len = state.resources(list.kind()).len();
            list.set_len(len);
        }
    }

    /// Name of the pod under the pod panel's cursor.
    pub fn highlighted_pod<'a>(&self, state: &'a AppState) -> Option<&'a str> {
        let index = self.pods.selected()?;
        state
            .resources(ResourceKind::Pod)
            .get(index)
            .map(|item| item.name.as_str())
    }
}

impl Component for DashboardView {
    type Output = ResourceListEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        self.list_mut(self.focus).handle_key(key)
    }
}

/// Draw the whole dashboard for `state`.
pub fn render(
    frame: &mut Frame,
    state: &AppState,
    view: &DashboardView,
    theme: &Theme,
    resolver: &KeyResolver,
) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.base)), area);

    if let Some(error) = state.error() {
        error_view::render(frame, area, error, resolver, theme);
        return;
    }

    let [title_area, panels_area, bottom_area, hints_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(45),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .areas(area);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            TITLE,
            Style::default().fg(theme.title()).add_modifier(Modifier::BOLD),
        ))),
        title_area,
    );

    let panel_areas: [Rect; 3] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .areas(panels_area);

    for (panel, panel_area) in [Panel::Pods, Panel::Deployments, Panel::Services]
        .into_iter()
        .zip(panel_areas)
    {
        view.list(panel).render(
            frame,
            panel_area,
            &view.panel_title(panel),
            state.resources(panel.kind()),
            view.focus() == panel,
            state.selected_pod(),
            theme,
        );
    }

    let [logs_area, endpoint_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .areas(bottom_area);

    log_panel::render(frame, logs_area, state.selected_pod(), state.logs(), theme);
    render_endpoint(frame, endpoint_area, state, theme);
    hint_bar::render(frame, hints_area, resolver, theme);
}

fn render_endpoint(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let block = Block::default()
        .title(" Gateway ")
        .title_style(Style::default().fg(theme.title()).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border()));

    let line = Line::from(vec![
        Span::styled("KrakenD Endpoint: ", Style::default().fg(theme.muted())),
        Span::styled(state.endpoint().to_string(), Style::default().fg(theme.teal)),
    ]);

    frame.render_widget(
        Paragraph::new(line).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::cluster::{ResourceItem, StreamTag};
    use crate::message::Message;

    fn loaded(kind: ResourceKind, items: Vec<ResourceItem>) -> Message {
        Message::ResourcesLoaded {
            kind,
            result: Ok(items),
        }
    }

    fn draw(state: &AppState, view: &DashboardView) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal
            .draw(|frame| render(frame, state, view, &Theme::default(), &KeyResolver::default()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn dashboard_view() -> DashboardView {
        DashboardView::new(&Arc::new(KeyResolver::default()), "app=my-app")
    }

    fn populated() -> AppState {
        let mut state = AppState::new(100);
        state.apply(loaded(
            ResourceKind::Pod,
            vec![
                ResourceItem::pod("my-pod", "Running"),
                ResourceItem::pod("other-pod", "Pending"),
            ],
        ));
        state.apply(loaded(
            ResourceKind::Deployment,
            vec![ResourceItem::deployment("my-app", 1, 1)],
        ));
        state.apply(loaded(
            ResourceKind::Service,
            vec![ResourceItem::service("my-app-service", "10.0.0.1")],
        ));
        state.apply(Message::EndpointLoaded(Ok("/api/v1".to_string())));
        state
    }

    #[test]
    fn test_renders_panels_and_endpoint() {
        let state = populated();
        let mut view = dashboard_view();
        view.sync(&state);

        let screen = draw(&state, &view);
        assert!(screen.contains(TITLE));
        assert!(screen.contains("Pods (app=my-app) [2]"));
        assert!(screen.contains("Deployments (app=my-app) [1]"));
        assert!(screen.contains("my-pod"));
        assert!(screen.contains("1/1 ready"));
        assert!(screen.contains("my-app-service"));
        assert!(screen.contains("KrakenD Endpoint: /api/v1"));
        assert!(screen.contains("Select a pod"));
    }

    #[test]
    fn test_empty_selector_leaves_plain_titles() {
        let state = populated();
        let mut view = DashboardView::new(&Arc::new(KeyResolver::default()), "");
        view.sync(&state);

        let screen = draw(&state, &view);
        assert!(screen.contains(" Pods [2] "));
        assert!(!screen.contains("Pods ("));
    }

    #[test]
    fn test_renders_selected_pod_logs() {
        let mut state = populated();
        state.apply(Message::Select("my-pod".to_string()));
        state.apply(Message::LogLine {
            tag: StreamTag::new("my-pod", 1),
            line: "server started\n".to_string(),
        });
        let mut view = dashboard_view();
        view.sync(&state);

        let screen = draw(&state, &view);
        assert!(screen.contains("Logs: my-pod"));
        assert!(screen.contains("server started"));
    }

    #[test]
    fn test_error_replaces_dashboard() {
        let mut state = populated();
        state.apply(Message::ResourcesLoaded {
            kind: ResourceKind::Pod,
            result: Err("connection refused".to_string()),
        });
        let view = dashboard_view();

        let screen = draw(&state, &view);
        assert!(screen.contains("Error: connection refused"));
        assert!(screen.contains("Press q to quit"));
        assert!(!screen.contains("my-pod"));
        assert!(!screen.contains("KrakenD Endpoint"));
    }

    #[test]
    fn test_error_freezes_output() {
        let mut state = populated();
        state.apply(Message::Failed("boom".to_string()));
        let view = dashboard_view();
        let before = draw(&state, &view);

        state.apply(loaded(ResourceKind::Pod, vec![ResourceItem::pod("new-pod", "Running")]));
        state.apply(Message::EndpointLoaded(Ok("/other".to_string())));

        assert_eq!(draw(&state, &view), before);
    }

    #[test]
    fn test_focus_routes_navigation() {
        let state = populated();
        let mut view = dashboard_view();
        view.sync(&state);
        let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);

        view.focus_next();
        assert_eq!(view.focus(), Panel::Deployments);
        view.handle_key(down).unwrap();
        assert_eq!(view.highlighted_pod(&state), Some("my-pod"));

        view.focus_prev();
        view.handle_key(down).unwrap();
        assert_eq!(view.highlighted_pod(&state), Some("other-pod"));

        view.focus_prev();
        assert_eq!(view.focus(), Panel::Services);
    }
}
