//! Consumer for the live notification stream.
//!
//! Runs independently of the edit session: messages are delivered on a
//! channel in arrival order. A failed or closed stream is reported once and
//! not reopened.

use crate::config::ClientConfig;
use crate::error::{ConsoleError, Result};
use crate::notifications::{Notification, SseParser};
use crate::transport::check_status;
use reqwest::header::ACCEPT;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const EVENT_STREAM: &str = "text/event-stream";

/// What the stream task reports.
#[derive(Debug)]
pub enum StreamEvent {
    Message(Notification),
    Error(ConsoleError),
    /// The server ended the stream.
    Closed,
}

pub struct NotificationStream {
    client: reqwest::Client,
    url: String,
}

impl NotificationStream {
    /// The stream is long-lived, so only connecting is bounded by the
    /// configured timeout.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            url: config.notification_stream_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open the stream and forward its messages to `tx` from a background
    /// task.
    ///
    /// Fails if the stream cannot be opened. Returns a handle that stops the
    /// task.
    pub async fn start(self, tx: mpsc::Sender<StreamEvent>) -> Result<StreamHandle> {
        info!(url = %self.url, "opening notification stream");
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, EVENT_STREAM)
            .send()
            .await
            .map_err(|e| ConsoleError::Stream(e.to_string()))?;
        let mut response = check_status(response, &self.url)?;

        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let task = tokio::spawn(async move {
            let mut parser = SseParser::new();

            loop {
                tokio::select! {
                    _ = stop_rx.recv() => {
                        debug!("notification stream stopped");
                        break;
                    }

                    chunk = response.chunk() => match chunk {
                        Ok(Some(bytes)) => {
                            for message in parser.feed(&bytes) {
                                if tx.send(StreamEvent::Message(message)).await.is_err() {
                                    return; // Receiver dropped
                                }
                            }
                        }
                        Ok(None) => {
                            if let Some(message) = parser.finish() {
                                let _ = tx.send(StreamEvent::Message(message)).await;
                            }
                            info!("notification stream closed by server");
                            let _ = tx.send(StreamEvent::Closed).await;
                            break;
                        }
                        Err(e) => {
                            warn!("notification stream failed: {}", e);
                            let _ = tx
                                .send(StreamEvent::Error(ConsoleError::Stream(e.to_string())))
                                .await;
                            break;
                        }
                    }
                }
            }
        });

        Ok(StreamHandle {
            stop_tx,
            task,
        })
    }
}

/// Handle to a running stream task. Dropping it also stops the task.
pub struct StreamHandle {
    stop_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl StreamHandle {
    pub async fn stop(self) {
        let _ = self.stop_tx.send(()).await;
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
