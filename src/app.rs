use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::cluster::ResourceClient;
use crate::commands::{self, Command, FetchEndpointCmd, FetchResourcesCmd};
use crate::config::{AppConfig, GlobalAction, KeyResolver, LogAction};
use crate::logs::LogStreamer;
use crate::message::Message;
use crate::state::{AppState, Effect};
use crate::theme::Theme;
use crate::tui::{Event, Tui};
use crate::ui::{Component, DashboardView, EventResult, ResourceListEvent, dashboard};

const FRAME_RATE: f64 = 30.0;

/// Owner of the dashboard state and the dispatch loop.
///
/// Every producer feeds the same message queue; the loop folds each message
/// into [`AppState`] and turns the resulting effects into commands.
pub struct App {
    state: AppState,
    view: DashboardView,
    streamer: LogStreamer,
    client: Arc<dyn ResourceClient>,
    config: Arc<AppConfig>,
    resolver: Arc<KeyResolver>,
    theme: Theme,

    message_tx: UnboundedSender<Message>,
    message_rx: UnboundedReceiver<Message>,
    ticker_token: CancellationToken,

    should_quit: bool,
    should_suspend: bool,
    /// Something changed since the last draw.
    dirty: bool,
}

impl App {
    pub fn new(
        client: Arc<dyn ResourceClient>,
        config: Arc<AppConfig>,
        resolver: Arc<KeyResolver>,
        theme: Theme,
    ) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(config.logs.capacity),
            view: DashboardView::new(&resolver, config.cluster.selector.clone()),
            streamer: LogStreamer::new(client.clone(), config.logs.tail_lines),
            client,
            config,
            resolver,
            theme,
            message_tx,
            message_rx,
            ticker_token: CancellationToken::new(),
            should_quit: false,
            should_suspend: false,
            dirty: true,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, self.message_tx.clone())?;
        tui.enter()?;
        self.start();

        while let Some(message) = self.message_rx.recv().await {
            match message {
                Message::Input(Event::Render) => {
                    if self.dirty {
                        self.render(&mut tui)?;
                    }
                }
                Message::Input(Event::Resize(width, height)) => {
                    tui.resize(Rect::new(0, 0, width, height))?;
                    self.render(&mut tui)?;
                }
                message => self.update(message)?,
            }

            if self.should_suspend {
                tui.suspend()?;
                tui.resume()?;
                self.should_suspend = false;
                self.dirty = true;
            } else if self.should_quit {
                break;
            }
        }

        info!(
            selection = ?self.state.selection(),
            stream = ?self.streamer.current(),
            "Shutting down"
        );
        self.ticker_token.cancel();
        self.streamer.stop();
        tui.exit()?;
        Ok(())
    }

    /// Issue the initial queries and start the refresh ticker.
    fn start(&mut self) {
        debug!(
            selector = %self.config.cluster.selector,
            log_capacity = self.state.logs().capacity(),
            "Starting dashboard"
        );
        let effects = self.state.init();
        self.execute_effects(effects);
        self.spawn_refresh_ticker();
    }

    fn spawn_refresh_ticker(&self) {
        let secs = self.config.refresh_interval_secs;
        if secs == 0 {
            return;
        }

        debug!(secs, "Starting refresh ticker");
        let message_tx = self.message_tx.clone();
        let token = self.ticker_token.clone();
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(secs));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; startup already queried.
            ticker.tick().await;
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if message_tx.send(Message::Refresh).is_err() {
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Fold one message into the state and carry out its effects.
    fn update(&mut self, message: Message) -> Result<()> {
        let message = match message {
            Message::Input(event) => match self.handle_input(event)? {
                Some(message) => message,
                None => return Ok(()),
            },
            message => message,
        };

        match &message {
            Message::LogLine { tag, .. } => trace!(%tag, "Log line"),
            other => debug!(message = ?other, "Handling message"),
        }

        let effects = self.state.apply(message);
        self.view.sync(&self.state);
        self.dirty = true;
        self.execute_effects(effects);
        Ok(())
    }

    fn handle_input(&mut self, event: Event) -> Result<Option<Message>> {
        match event {
            Event::Init => {
                debug!("Terminal input started");
                Ok(None)
            }
            Event::Quit => Ok(Some(Message::Quit)),
            Event::Error(err) => {
                warn!(error = %err, "Terminal input error");
                Ok(None)
            }
            Event::Key(key) => self.handle_key(key),
            Event::Render | Event::Resize(..) => Ok(None),
        }
    }

    /// Translate a key press into a message, or apply it to the view.
    fn handle_key(&mut self, key: KeyEvent) -> Result<Option<Message>> {
        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            return Ok(Some(Message::Quit));
        }
        if self.resolver.matches_global(&key, GlobalAction::Suspend) {
            self.should_suspend = true;
            return Ok(None);
        }

        // The error view only offers quitting.
        if self.state.error().is_some() {
            return Ok(None);
        }

        if self.resolver.matches_global(&key, GlobalAction::Refresh) {
            return Ok(Some(Message::Refresh));
        }
        if self.resolver.matches_global(&key, GlobalAction::FocusNext) {
            self.view.focus_next();
            self.dirty = true;
            return Ok(None);
        }
        if self.resolver.matches_global(&key, GlobalAction::FocusPrev) {
            self.view.focus_prev();
            self.dirty = true;
            return Ok(None);
        }
        if self.resolver.matches_logs(&key, LogAction::Select) {
            let pod = self.view.highlighted_pod(&self.state).map(str::to_string);
            return Ok(pod.map(Message::Select));
        }
        if self.resolver.matches_logs(&key, LogAction::Clear) {
            return Ok(Some(Message::Clear));
        }

        let result = self.view.handle_key(key)?;
        if let EventResult::Event(ResourceListEvent::Changed(index)) = &result {
            trace!(panel = ?self.view.focus(), index, "Cursor moved");
        }
        if result.is_consumed() {
            self.dirty = true;
        }
        Ok(None)
    }

    fn execute_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Query(kind) => self.spawn(Box::new(FetchResourcesCmd::new(
                    self.client.clone(),
                    kind,
                    self.config.cluster.selector.clone(),
                ))),
                Effect::FetchEndpoint => self.spawn(Box::new(FetchEndpointCmd::new(
                    self.client.clone(),
                    self.config.endpoint.clone(),
                ))),
                Effect::StartLogStream(tag) => {
                    let command = self.streamer.start(tag);
                    self.spawn(Box::new(command));
                }
                Effect::StopLogStream => self.streamer.stop(),
                Effect::Quit => self.should_quit = true,
            }
        }
    }

    fn spawn(&self, command: Box<dyn Command>) {
        commands::spawn(command, self.message_tx.clone());
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        tui.draw(|frame| {
            dashboard::render(frame, &self.state, &self.view, &self.theme, &self.resolver);
        })?;
        self.dirty = false;
        Ok(())
    }
}
