//! Application state and the pure transition function that folds messages
//! into it.
//!
//! [`AppState::apply`] never performs I/O. Side effects it needs (queries,
//! starting or stopping the log stream, quitting) are returned as [`Effect`]s
//! for the App to carry out.

mod log_buffer;

use std::fmt::Display;

use tracing::{debug, warn};

use crate::cluster::{ResourceItem, ResourceKind, StreamTag};
use crate::message::Message;

pub use log_buffer::LogBuffer;

/// Side effects requested by a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// List resources of one kind
    Query(ResourceKind),
    /// Look up the gateway endpoint
    FetchEndpoint,
    /// Start streaming logs, cancelling any current stream
    StartLogStream(StreamTag),
    /// Cancel the current log stream, if any
    StopLogStream,
    /// Leave the dispatch loop
    Quit,
}

/// Latest successful list result for each resource kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSnapshot {
    pods: Vec<ResourceItem>,
    deployments: Vec<ResourceItem>,
    services: Vec<ResourceItem>,
}

impl ResourceSnapshot {
    pub fn get(&self, kind: ResourceKind) -> &[ResourceItem] {
        match kind {
            ResourceKind::Pod => &self.pods,
            ResourceKind::Deployment => &self.deployments,
            ResourceKind::Service => &self.services,
        }
    }

    fn replace(&mut self, kind: ResourceKind, items: Vec<ResourceItem>) {
        let slot = match kind {
            ResourceKind::Pod => &mut self.pods,
            ResourceKind::Deployment => &mut self.deployments,
            ResourceKind::Service => &mut self.services,
        };
        *slot = items;
    }
}

/// The gateway endpoint routed to the watched service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EndpointInfo {
    #[default]
    NotFetched,
    Resolved(String),
}

impl Display for EndpointInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFetched => write!(f, "Not fetched"),
            Self::Resolved(endpoint) => write!(f, "{endpoint}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    snapshot: ResourceSnapshot,
    selection: Option<StreamTag>,
    logs: LogBuffer,
    endpoint: EndpointInfo,
    error: Option<String>,
    /// Incremented on every selection; tags the log stream it starts.
    generation: u64,
}

impl AppState {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            snapshot: ResourceSnapshot::default(),
            selection: None,
            logs: LogBuffer::new(log_capacity),
            endpoint: EndpointInfo::NotFetched,
            error: None,
            generation: 0,
        }
    }

    /// Effects to run once at startup: one query per data source.
    pub fn init(&self) -> Vec<Effect> {
        Self::refresh_effects()
    }

    fn refresh_effects() -> Vec<Effect> {
        ResourceKind::ALL
            .into_iter()
            .map(Effect::Query)
            .chain(std::iter::once(Effect::FetchEndpoint))
            .collect()
    }

    pub fn resources(&self, kind: ResourceKind) -> &[ResourceItem] {
        self.snapshot.get(kind)
    }

    pub const fn selection(&self) -> Option<&StreamTag> {
        self.selection.as_ref()
    }

    pub fn selected_pod(&self) -> Option<&str> {
        self.selection.as_ref().map(|tag| tag.pod.as_str())
    }

    pub const fn logs(&self) -> &LogBuffer {
        &self.logs
    }

    pub const fn endpoint(&self) -> &EndpointInfo {
        &self.endpoint
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fold one message into the state.
    pub fn apply(&mut self, message: Message) -> Vec<Effect> {
        match message {
            // Terminal input is translated by the App before it reaches here.
            Message::Input(_) => Vec::new(),

            Message::Quit => vec![Effect::Quit],

            Message::Refresh => {
                if self.error.is_some() {
                    Vec::new()
                } else {
                    Self::refresh_effects()
                }
            }

            Message::Select(pod) => {
                self.generation += 1;
                let tag = StreamTag::new(pod, self.generation);
                debug!(%tag, "Selected pod");
                self.selection = Some(tag.clone());
                self.logs.clear();
                vec![Effect::StartLogStream(tag)]
            }

            Message::Clear => {
                self.selection = None;
                self.logs.clear();
                vec![Effect::StopLogStream]
            }

            Message::ResourcesLoaded { kind, result } => {
                match result {
                    Ok(items) => self.snapshot.replace(kind, items),
                    Err(err) => self.set_error(err),
                }
                Vec::new()
            }

            Message::EndpointLoaded(result) => {
                match result {
                    Ok(endpoint) => self.endpoint = EndpointInfo::Resolved(endpoint),
                    Err(err) => self.set_error(err),
                }
                Vec::new()
            }

            Message::LogLine { tag, line } => {
                if self.selection.as_ref() == Some(&tag) {
                    self.logs.push(line);
                }
                Vec::new()
            }

            Message::Failed(err) => {
                self.set_error(err);
                Vec::new()
            }
        }
    }

    /// Record an error. The first one wins and stays for the process lifetime.
    fn set_error(&mut self, err: String) {
        if self.error.is_none() {
            warn!(error = %err, "Dashboard entered error state");
            self.error = Some(err);
        }
    }
}
