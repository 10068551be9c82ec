//! Messages flowing into the dispatch loop.
//!
//! Every producer (terminal input task, commands, the log worker, the refresh
//! ticker) talks to the App exclusively through this type, sent over a single
//! unbounded channel.

use crate::cluster::{ResourceItem, ResourceKind, StreamTag};
use crate::tui::Event;

/// Outcome of a cluster query, with the error already rendered to text.
pub type QueryResult<T> = Result<T, String>;

#[derive(Debug, Clone)]
pub enum Message {
    // === Terminal ===
    /// Raw terminal input, translated by the App before folding.
    Input(Event),

    // === User intents ===
    /// Stop the dashboard
    Quit,
    /// Re-run every resource query
    Refresh,
    /// Start following the logs of a pod
    Select(String),
    /// Stop following logs and empty the log panel
    Clear,

    // === Async results ===
    /// A resource list query finished
    ResourcesLoaded {
        kind: ResourceKind,
        result: QueryResult<Vec<ResourceItem>>,
    },
    /// The gateway endpoint lookup finished
    EndpointLoaded(QueryResult<String>),
    /// One line from the log stream identified by `tag`
    LogLine { tag: StreamTag, line: String },
    /// A command failed outside of its normal result path
    Failed(String),
}
