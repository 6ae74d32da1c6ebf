//! Runs an [`EditSession`] against a [`Transport`].

use crate::error::Result;
use crate::session::{EditSession, LoadTicket, SessionState};
use crate::transport::Transport;
use confpath::v1::TreeEvent;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type LoadResult = (LoadTicket, Result<Value>);

/// Issues the fetches and writes an [`EditSession`] asks for.
///
/// Loads run as spawned tasks so a new selection never waits on an old one;
/// selecting again aborts the previous fetch, and any answer that still
/// arrives for it is discarded by the session's ticket check. Must be used
/// from within a tokio runtime.
pub struct SessionDriver<T: Transport + ?Sized + 'static> {
    transport: Arc<T>,
    session: EditSession,
    in_flight: Option<JoinHandle<()>>,
    results_tx: mpsc::UnboundedSender<LoadResult>,
    results_rx: mpsc::UnboundedReceiver<LoadResult>,
}

impl<T: Transport + ?Sized + 'static> SessionDriver<T> {
    pub fn new(transport: Arc<T>) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            session: EditSession::new(),
            in_flight: None,
            results_tx,
            results_rx,
        }
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Start fetching `path`, superseding whatever was selected before.
    pub fn select_path(&mut self, path: &str) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }

        let ticket = self.session.select_path(path);
        let transport = Arc::clone(&self.transport);
        let tx = self.results_tx.clone();
        debug!(path, "loading");

        self.in_flight = Some(tokio::spawn(async move {
            let result = transport.get(ticket.path()).await;
            let _ = tx.send((ticket, result));
        }));
    }

    pub fn handle_event(&mut self, event: TreeEvent) {
        match event {
            TreeEvent::PathSelected(path) => self.select_path(&path),
        }
    }

    /// Apply any load results that have already arrived.
    pub fn poll(&mut self) -> &SessionState {
        while let Ok((ticket, result)) = self.results_rx.try_recv() {
            self.session.complete_load(ticket, result);
        }
        self.session.state()
    }

    /// Wait until the current selection has finished loading.
    ///
    /// If the task fetching it dies without answering, the session moves to
    /// `Error` instead of waiting forever.
    pub async fn settle(&mut self) -> &SessionState {
        while matches!(self.session.state(), SessionState::Loading { .. }) {
            let Some(task) = self.in_flight.as_mut() else {
                match self.results_rx.recv().await {
                    Some((ticket, result)) => {
                        self.session.complete_load(ticket, result);
                    }
                    None => break,
                }
                continue;
            };

            tokio::select! {
                received = self.results_rx.recv() => match received {
                    Some((ticket, result)) => {
                        self.session.complete_load(ticket, result);
                    }
                    None => break,
                },
                joined = task => {
                    self.in_flight = None;
                    if let Err(e) = joined {
                        warn!("load task failed: {}", e);
                        // A result sent just before the task ended still wins.
                        self.poll();
                        self.session.fail_load("load task failed");
                    }
                }
            }
        }
        self.in_flight = None;
        self.session.state()
    }

    pub fn set_buffer<S: Into<String>>(&mut self, text: S) -> Result<()> {
        self.session.set_buffer(text)
    }

    /// Write the edit buffer back to the selected path.
    ///
    /// The buffer is left exactly as it was whether or not the write
    /// succeeds; the outcome is reflected in the session message.
    pub async fn save(&mut self) -> Result<()> {
        let ticket = self.session.begin_save()?;
        debug!(path = ticket.path(), "saving");

        let result = self.transport.put(ticket.path(), ticket.payload()).await;
        if let Err(e) = &result {
            warn!(path = ticket.path(), "save failed: {}", e);
        }
        self.session.complete_save(ticket, &result);
        result
    }
}

impl<T: Transport + ?Sized + 'static> Drop for SessionDriver<T> {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsoleError;
    use crate::test_support::FakeTransport;
    use serde_json::json;
    use std::time::Duration;

    fn transport() -> FakeTransport {
        FakeTransport::new()
            .with_document("slow", json!({"from": "slow"}))
            .with_delay("slow", Duration::from_millis(200))
            .with_document("fast", json!({"from": "fast"}))
            .with_document("system", json!({"system": {"hostname": "r1"}}))
            .with_failure("broken", 500)
            .with_put_failure("readonly", 403)
            .with_document("readonly", json!({"v": 1}))
    }

    #[tokio::test]
    async fn test_load_on_selection_event() {
        let mut driver = SessionDriver::new(Arc::new(transport()));
        driver.handle_event(TreeEvent::PathSelected("system".into()));
        assert!(matches!(
            driver.session().state(),
            SessionState::Loading { .. }
        ));

        driver.settle().await;
        assert_eq!(
            driver.session().buffer(),
            Some("{\n  \"system\": {\n    \"hostname\": \"r1\"\n  }\n}")
        );
    }

    #[tokio::test]
    async fn test_late_response_never_wins() {
        let mut driver = SessionDriver::new(Arc::new(transport()));
        driver.select_path("slow");
        driver.select_path("fast");

        match driver.settle().await {
            SessionState::Ready { path, content, .. } => {
                assert_eq!(path, "fast");
                assert_eq!(content, &json!({"from": "fast"}));
            }
            other => panic!("Expected Ready, got {other:?}"),
        }

        tokio::time::sleep(Duration::from_millis(300)).await;
        driver.poll();
        assert_eq!(driver.session().current_path(), Some("fast"));
        assert!(driver.session().buffer().unwrap().contains("fast"));
    }

    /// Transport whose fetches never return normally.
    struct PanickingTransport;

    #[async_trait::async_trait]
    impl Transport for PanickingTransport {
        async fn get(&self, path: &str) -> Result<Value> {
            panic!("fetch of {path} blew up");
        }

        async fn put(&self, _path: &str, _body: &Value) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_settle_when_load_task_dies() {
        let mut driver = SessionDriver::new(Arc::new(PanickingTransport));
        driver.select_path("system");

        let state = tokio::time::timeout(Duration::from_secs(5), driver.settle())
            .await
            .expect("settle should not hang");
        assert!(matches!(state, SessionState::Error { .. }));
        assert_eq!(
            driver.session().message(),
            Some("Failed to load: load task failed")
        );
    }

    #[tokio::test]
    async fn test_failed_load_message() {
        let mut driver = SessionDriver::new(Arc::new(transport()));
        driver.select_path("broken");
        driver.settle().await;
        assert_eq!(driver.session().message(), Some("Failed to load: HTTP 500"));
    }

    #[tokio::test]
    async fn test_save_writes_parsed_buffer() {
        let t = Arc::new(transport());
        let mut driver = SessionDriver::new(Arc::clone(&t));
        driver.select_path("fast");
        driver.settle().await;

        driver.set_buffer("{\"from\": \"edited\"}").unwrap();
        driver.save().await.unwrap();

        assert_eq!(t.puts(), vec![("fast".into(), json!({"from": "edited"}))]);
        assert_eq!(driver.session().message(), Some("Saved successfully"));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_buffer() {
        let t = Arc::new(transport());
        let mut driver = SessionDriver::new(Arc::clone(&t));
        driver.select_path("readonly");
        driver.settle().await;

        let edited = "{\"v\": 2}";
        driver.set_buffer(edited).unwrap();
        let err = driver.save().await.unwrap_err();

        assert!(matches!(err, ConsoleError::Network { status: 403, .. }));
        assert_eq!(driver.session().buffer(), Some(edited));
        assert_eq!(driver.session().message(), Some("Save failed: HTTP 403"));
        assert!(t.puts().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_buffer_is_not_sent() {
        let t = Arc::new(transport());
        let mut driver = SessionDriver::new(Arc::clone(&t));
        driver.select_path("fast");
        driver.settle().await;

        driver.set_buffer("not json").unwrap();
        assert!(matches!(
            driver.save().await,
            Err(ConsoleError::Parse(_))
        ));
        assert!(t.puts().is_empty());
        assert_eq!(driver.session().buffer(), Some("not json"));
    }
}
