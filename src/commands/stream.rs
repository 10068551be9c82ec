use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cluster::{ResourceClient, StreamTag};
use crate::commands::Command;
use crate::logs::LogSink;
use crate::message::Message;

/// Follow the logs of one pod until the stream ends or is cancelled.
///
/// Failures stay inside the worker: they are logged and end the stream, but
/// never reach the dashboard's error state.
pub struct StreamLogsCmd {
    client: Arc<dyn ResourceClient>,
    tag: StreamTag,
    tail_lines: u32,
    token: CancellationToken,
}

impl StreamLogsCmd {
    pub fn new(
        client: Arc<dyn ResourceClient>,
        tag: StreamTag,
        tail_lines: u32,
        token: CancellationToken,
    ) -> Self {
        Self {
            client,
            tag,
            tail_lines,
            token,
        }
    }

    #[cfg(test)]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[async_trait]
impl Command for StreamLogsCmd {
    fn name(&self) -> String {
        format!("Streaming logs of {}", self.tag.pod)
    }

    async fn execute(self: Box<Self>, message_tx: UnboundedSender<Message>) -> Result<()> {
        let sink = LogSink::new(&self.tag, &self.token, &message_tx);
        info!(tag = %self.tag, tail_lines = self.tail_lines, "Log stream started");

        let result = tokio::select! {
            () = self.token.cancelled() => {
                debug!(tag = %self.tag, "Log stream cancelled");
                return Ok(());
            }
            result = self.client.stream_logs(&self.tag.pod, self.tail_lines, true, &sink) => result,
        };

        match result {
            Ok(outcome) => info!(tag = %self.tag, ?outcome, "Log stream finished"),
            Err(err) => warn!(tag = %self.tag, error = ?err, "Log stream aborted"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::commands::testing::FakeClient;

    #[tokio::test]
    async fn test_streams_tagged_lines() {
        let client = Arc::new(FakeClient {
            logs: Some("starting\nready\n".to_string()),
            ..FakeClient::default()
        });
        let tag = StreamTag::new("my-pod", 3);
        let cmd = StreamLogsCmd::new(client, tag.clone(), 100, CancellationToken::new());

        let (tx, mut rx) = mpsc::unbounded_channel();
        crate::commands::spawn(Box::new(cmd), tx).await.unwrap();

        let mut lines = Vec::new();
        while let Some(message) = rx.recv().await {
            match message {
                Message::LogLine { tag: line_tag, line } => {
                    assert_eq!(line_tag, tag);
                    lines.push(line);
                }
                other => panic!("unexpected message: {other:?}"),
            }
        }
        assert_eq!(lines, ["starting\n", "ready\n"]);
    }

    #[tokio::test]
    async fn test_follows_with_configured_tail() {
        let client = Arc::new(FakeClient {
            logs: Some(String::new()),
            ..FakeClient::default()
        });
        let tag = StreamTag::new("my-pod", 1);
        let cmd = StreamLogsCmd::new(client.clone(), tag, 250, CancellationToken::new());

        let (tx, _rx) = mpsc::unbounded_channel();
        crate::commands::spawn(Box::new(cmd), tx).await.unwrap();

        assert_eq!(client.stream_requests(), [("my-pod".to_string(), 250, true)]);
    }

    #[tokio::test]
    async fn test_open_failure_is_silent() {
        let client = Arc::new(FakeClient::default());
        let cmd = StreamLogsCmd::new(client, StreamTag::new("gone", 1), 100, CancellationToken::new());

        let (tx, mut rx) = mpsc::unbounded_channel();
        crate::commands::spawn(Box::new(cmd), tx).await.unwrap();

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_emits_nothing() {
        let client = Arc::new(FakeClient {
            logs: Some("late\n".to_string()),
            ..FakeClient::default()
        });
        let token = CancellationToken::new();
        token.cancel();
        let cmd = StreamLogsCmd::new(client, StreamTag::new("my-pod", 1), 100, token);

        let (tx, mut rx) = mpsc::unbounded_channel();
        crate::commands::spawn(Box::new(cmd), tx).await.unwrap();

        assert!(rx.recv().await.is_none());
    }
}
