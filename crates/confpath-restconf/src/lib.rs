#![doc = include_str!("../README.md")]

pub mod config;
pub mod driver;
pub mod error;
pub mod explorer;
pub mod notifications;
pub mod session;
pub mod stream;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use config::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_DATA_PREFIX, DEFAULT_NOTIFICATION_PREFIX, YANG_JSON,
};
pub use driver::SessionDriver;
pub use error::{ConsoleError, Result};
pub use explorer::Explorer;
pub use notifications::{Notification, NotificationLog, SseParser};
pub use session::{EditSession, LoadTicket, SaveTicket, SessionState};
pub use stream::{NotificationStream, StreamEvent, StreamHandle};
pub use transport::{HttpTransport, Transport};

use confpath::v1::{Node, TreeEvent};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The browse / edit / save console for one RESTCONF server.
///
/// Wires an [`Explorer`] to a [`SessionDriver`]: selecting a node in the
/// tree emits a [`TreeEvent`] which starts a load in the session.
///
/// # Example
///
/// ```rust,no_run
/// use confpath_restconf::{ClientConfig, RestconfConsole};
///
/// # async fn run() -> confpath_restconf::Result<()> {
/// let config = ClientConfig::new("http://localhost:9000")?;
/// let mut console = RestconfConsole::connect(config)?;
///
/// console.load_root().await?;
/// console.select("system")?;
/// console.settle().await;
///
/// if let Some(text) = console.session().buffer() {
///     let edited = text.replace("\"r1\"", "\"r2\"");
///     console.set_buffer(edited)?;
///     console.save().await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct RestconfConsole<T: Transport + ?Sized + 'static = HttpTransport> {
    transport: Arc<T>,
    explorer: Explorer,
    events: mpsc::UnboundedReceiver<TreeEvent>,
    driver: SessionDriver<T>,
}

impl RestconfConsole<HttpTransport> {
    /// Console over HTTP. Must be called within a tokio runtime before any
    /// selection is made.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new(config)?)))
    }
}

impl<T: Transport + ?Sized + 'static> RestconfConsole<T> {
    pub fn with_transport(transport: Arc<T>) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        Self {
            explorer: Explorer::new().with_events(tx),
            driver: SessionDriver::new(Arc::clone(&transport)),
            transport,
            events,
        }
    }

    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    pub fn nodes(&self) -> &[Node] {
        self.explorer.nodes()
    }

    pub fn session(&self) -> &EditSession {
        self.driver.session()
    }

    /// Fetch the datastore root and rebuild the tree.
    pub async fn load_root(&mut self) -> Result<usize> {
        self.explorer.load_root(self.transport.as_ref()).await
    }

    /// Select a node of the current tree and start loading it.
    pub fn select(&mut self, path: &str) -> Result<()> {
        self.explorer.select(path)?;
        while let Ok(event) = self.events.try_recv() {
            self.driver.handle_event(event);
        }
        Ok(())
    }

    /// Start loading `path` directly, without consulting the tree.
    pub fn open(&mut self, path: &str) {
        self.driver.select_path(path);
    }

    /// Wait for the current load to finish.
    pub async fn settle(&mut self) -> &SessionState {
        self.driver.settle().await
    }

    pub fn set_buffer<S: Into<String>>(&mut self, text: S) -> Result<()> {
        self.driver.set_buffer(text)
    }

    pub async fn save(&mut self) -> Result<()> {
        self.driver.save().await
    }
}
