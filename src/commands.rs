//! Async commands pattern for side effects.
//!
//! Commands represent async operations that run outside the dispatch loop.
//! The App turns state effects into commands and spawns them; each command
//! reports back by sending [`Message`]s through the queue it is given.

mod query;
mod stream;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::message::Message;

pub use query::{FetchEndpointCmd, FetchResourcesCmd};
pub use stream::StreamLogsCmd;

/// Async command that performs side effects.
///
/// Query commands send exactly one message, carrying either the result or the
/// error as data. Streaming commands send one message per item produced.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for logging.
    /// Include context like resource kinds or pod names.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>, message_tx: UnboundedSender<Message>) -> Result<()>;
}

/// Run a command on its own task.
///
/// An `Err` from the command is logged and delivered as [`Message::Failed`],
/// so a failing command can never take the dispatch loop down.
pub fn spawn(command: Box<dyn Command>, message_tx: UnboundedSender<Message>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = command.name();
        debug!(command = %name, "Running command");
        if let Err(err) = command.execute(message_tx.clone()).await {
            error!(command = %name, error = ?err, "Command failed");
            let _ = message_tx.send(Message::Failed(format!("{name}: {err}")));
        }
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory [`ResourceClient`] for command and App tests.

    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use color_eyre::Result;
    use color_eyre::eyre::eyre;
    use futures::io::Cursor;

    use crate::cluster::{ResourceClient, ResourceItem};
    use crate::logs::{LogSink, StreamOutcome};

    #[derive(Default)]
    pub struct FakeClient {
        pub pods: Vec<ResourceItem>,
        pub deployments: Vec<ResourceItem>,
        pub services: Vec<ResourceItem>,
        pub config_map: Option<BTreeMap<String, String>>,
        pub logs: Option<String>,
        pub fail_deployments: bool,
        /// Every `(pod, tail_lines, follow)` a log stream was requested with.
        pub stream_requests: Mutex<Vec<(String, u32, bool)>>,
    }

    impl FakeClient {
        pub fn stream_requests(&self) -> Vec<(String, u32, bool)> {
            self.stream_requests
                .lock()
                .map(|requests| requests.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl ResourceClient for FakeClient {
        async fn list_pods(&self, _selector: &str) -> Result<Vec<ResourceItem>> {
            Ok(self.pods.clone())
        }

        async fn list_deployments(&self, _selector: &str) -> Result<Vec<ResourceItem>> {
            if self.fail_deployments {
                return Err(eyre!("deployments are forbidden"));
            }
            Ok(self.deployments.clone())
        }

        async fn list_services(&self, _selector: &str) -> Result<Vec<ResourceItem>> {
            Ok(self.services.clone())
        }

        async fn get_config_map(&self, name: &str) -> Result<BTreeMap<String, String>> {
            self.config_map
                .clone()
                .ok_or_else(|| eyre!("config map '{name}' not found"))
        }

        async fn stream_logs(
            &self,
            pod: &str,
            tail_lines: u32,
            follow: bool,
            sink: &LogSink<'_>,
        ) -> Result<StreamOutcome> {
            if let Ok(mut requests) = self.stream_requests.lock() {
                requests.push((pod.to_string(), tail_lines, follow));
            }
            let logs = self
                .logs
                .clone()
                .ok_or_else(|| eyre!("pod '{pod}' has no logs"))?;
            Ok(sink.pump(Cursor::new(logs.into_bytes())).await)
        }
    }
}
