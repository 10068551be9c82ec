//! Log streaming for the selected pod.
//!
//! A stream moves through `Idle -> Streaming -> (Ended | Aborted)`.
//! [`LogStreamer`] lives on the dispatch loop and decides which stream is
//! current: starting a new one cancels the previous worker through its
//! [`CancellationToken`]. The worker runs on a command task and drains the
//! stream through a [`LogSink`], which emits one [`Message::LogLine`] per
//! complete line, tagged with the [`StreamTag`] it was started for so the fold
//! can drop anything stale.

use std::sync::Arc;

use futures::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cluster::{ResourceClient, StreamTag};
use crate::commands::StreamLogsCmd;
use crate::message::Message;

/// How a log worker finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The stream reached end of data.
    Ended,
    /// A read error, a cancellation, or the dispatch loop going away.
    Aborted,
}

struct ActiveStream {
    tag: StreamTag,
    token: CancellationToken,
}

/// Owner of the current log stream.
pub struct LogStreamer {
    client: Arc<dyn ResourceClient>,
    tail_lines: u32,
    current: Option<ActiveStream>,
}

impl LogStreamer {
    pub fn new(client: Arc<dyn ResourceClient>, tail_lines: u32) -> Self {
        Self {
            client,
            tail_lines,
            current: None,
        }
    }

    /// Make `tag` the current stream and return the command that runs it.
    ///
    /// Any previous worker is cancelled first.
    pub fn start(&mut self, tag: StreamTag) -> StreamLogsCmd {
        self.stop();
        let token = CancellationToken::new();
        self.current = Some(ActiveStream {
            tag: tag.clone(),
            token: token.clone(),
        });
        StreamLogsCmd::new(self.client.clone(), tag, self.tail_lines, token)
    }

    /// Cancel the current worker, if any.
    pub fn stop(&mut self) {
        if let Some(active) = self.current.take() {
            debug!(tag = %active.tag, "Cancelling log stream");
            active.token.cancel();
        }
    }

    pub fn current(&self) -> Option<&StreamTag> {
        self.current.as_ref().map(|active| &active.tag)
    }
}

impl Drop for LogStreamer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Destination of one log stream.
pub struct LogSink<'a> {
    tag: &'a StreamTag,
    token: &'a CancellationToken,
    message_tx: &'a UnboundedSender<Message>,
}

impl<'a> LogSink<'a> {
    pub const fn new(
        tag: &'a StreamTag,
        token: &'a CancellationToken,
        message_tx: &'a UnboundedSender<Message>,
    ) -> Self {
        Self {
            tag,
            token,
            message_tx,
        }
    }

    /// Read `stream` line by line until it ends, fails or the token is
    /// cancelled.
    ///
    /// Only newline-terminated lines are emitted; a trailing fragment at end
    /// of data is dropped. Lines are decoded lossily so binary output cannot
    /// abort the stream. Nothing is sent once the token is cancelled.
    pub async fn pump<R>(&self, mut stream: R) -> StreamOutcome
    where
        R: AsyncBufRead + Unpin,
    {
        let tag = self.tag;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = tokio::select! {
                () = self.token.cancelled() => return StreamOutcome::Aborted,
                read = stream.read_until(b'\n', &mut buf) => read,
            };

            match read {
                Ok(0) => return StreamOutcome::Ended,
                Ok(_) if buf.ends_with(b"\n") => {
                    if self.token.is_cancelled() {
                        return StreamOutcome::Aborted;
                    }
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    let message = Message::LogLine {
                        tag: tag.clone(),
                        line,
                    };
                    if self.message_tx.send(message).is_err() {
                        return StreamOutcome::Aborted;
                    }
                }
                Ok(len) => {
                    debug!(%tag, len, "Dropping partial line at end of stream");
                }
                Err(err) => {
                    warn!(%tag, error = %err, "Log stream read failed");
                    return StreamOutcome::Aborted;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use futures::TryStreamExt;
    use futures::io::Cursor;
    use tokio::sync::mpsc;

    use super::*;
    use crate::commands::testing::FakeClient;

    fn stream_of(text: &str) -> Cursor<Vec<u8>> {
        Cursor::new(text.as_bytes().to_vec())
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<(StreamTag, String)> {
        let mut lines = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let Message::LogLine { tag, line } = message {
                lines.push((tag, line));
            }
        }
        lines
    }

    #[tokio::test]
    async fn test_emits_lines_in_order_then_ends() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let tag = StreamTag::new("my-pod", 1);
        let token = CancellationToken::new();

        let sink = LogSink::new(&tag, &token, &tx);
        let outcome = sink.pump(stream_of("starting\nready\n")).await;

        assert_eq!(outcome, StreamOutcome::Ended);
        assert_eq!(
            drain(&mut rx),
            vec![
                (tag.clone(), "starting\n".to_string()),
                (tag, "ready\n".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_trailing_line_is_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let tag = StreamTag::new("p", 1);

        let token = CancellationToken::new();
        let outcome = LogSink::new(&tag, &token, &tx).pump(stream_of("one\ntwo")).await;

        assert_eq!(outcome, StreamOutcome::Ended);
        let lines: Vec<String> = drain(&mut rx).into_iter().map(|(_, line)| line).collect();
        assert_eq!(lines, ["one\n"]);
    }

    #[tokio::test]
    async fn test_cancelled_stream_emits_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        token.cancel();

        let tag = StreamTag::new("p", 1);
        let outcome = LogSink::new(&tag, &token, &tx).pump(stream_of("a\nb\n")).await;

        assert_eq!(outcome, StreamOutcome::Aborted);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_read_error_aborts_after_delivered_lines() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let chunks: Vec<io::Result<Vec<u8>>> = vec![
            Ok(b"first\n".to_vec()),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ];
        let stream = Box::pin(futures::stream::iter(chunks).into_async_read());
        let (tag, token) = (StreamTag::new("p", 1), CancellationToken::new());

        let outcome = LogSink::new(&tag, &token, &tx).pump(stream).await;

        assert_eq!(outcome, StreamOutcome::Aborted);
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stream = Cursor::new(b"bad \xff byte\n".to_vec());
        let (tag, token) = (StreamTag::new("p", 1), CancellationToken::new());

        LogSink::new(&tag, &token, &tx).pump(stream).await;

        let lines = drain(&mut rx);
        assert_eq!(lines[0].1, "bad \u{fffd} byte\n");
    }

    #[test]
    fn test_start_cancels_previous_stream() {
        let mut streamer = LogStreamer::new(Arc::new(FakeClient::default()), 100);
        assert!(streamer.current().is_none());

        let first = streamer.start(StreamTag::new("pod-a", 1));
        let second = streamer.start(StreamTag::new("pod-b", 2));

        assert!(first.token().is_cancelled());
        assert!(!second.token().is_cancelled());
        assert_eq!(streamer.current(), Some(&StreamTag::new("pod-b", 2)));

        streamer.stop();
        assert!(second.token().is_cancelled());
        assert!(streamer.current().is_none());
    }
}
