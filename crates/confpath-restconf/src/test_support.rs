//! Fixtures shared by the unit tests.

use crate::error::{ConsoleError, Result};
use crate::transport::Transport;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

/// Serve `router` on an ephemeral local port.
pub async fn spawn_server(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// In-memory [`Transport`] with canned documents, failures and delays.
#[derive(Debug, Default)]
pub struct FakeTransport {
    documents: HashMap<String, Value>,
    failures: HashMap<String, u16>,
    put_failures: HashMap<String, u16>,
    delays: HashMap<String, Duration>,
    puts: Mutex<Vec<(String, Value)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: &str, value: Value) -> Self {
        self.documents.insert(path.to_string(), value);
        self
    }

    pub fn with_failure(mut self, path: &str, status: u16) -> Self {
        self.failures.insert(path.to_string(), status);
        self
    }

    pub fn with_put_failure(mut self, path: &str, status: u16) -> Self {
        self.put_failures.insert(path.to_string(), status);
        self
    }

    /// Delay responses (reads and writes) for `path`.
    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    pub fn puts(&self) -> Vec<(String, Value)> {
        self.puts.lock().unwrap().clone()
    }

    async fn pause(&self, path: &str) {
        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
    }
}

fn network(status: u16, path: &str) -> ConsoleError {
    ConsoleError::Network {
        status,
        url: format!("fake:///{}", path),
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str) -> Result<Value> {
        self.pause(path).await;
        if let Some(status) = self.failures.get(path) {
            return Err(network(*status, path));
        }
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| network(404, path))
    }

    async fn put(&self, path: &str, body: &Value) -> Result<()> {
        self.pause(path).await;
        if let Some(status) = self.put_failures.get(path) {
            return Err(network(*status, path));
        }
        self.puts
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));
        Ok(())
    }
}
