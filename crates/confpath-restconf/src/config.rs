use crate::error::Result;
use std::time::Duration;
use url::Url;

/// Media type for RESTCONF JSON bodies.
pub const YANG_JSON: &str = "application/yang-data+json";

pub const DEFAULT_BASE_URL: &str = "http://localhost:9000";
pub const DEFAULT_DATA_PREFIX: &str = "/restconf/data";
pub const DEFAULT_NOTIFICATION_PREFIX: &str = "/restconf/operations";

/// Where the RESTCONF server lives and how to talk to it.
///
/// Passed explicitly to every component that issues requests.
///
/// # Example
///
/// ```rust
/// use confpath_restconf::ClientConfig;
///
/// let config = ClientConfig::new("http://device:8080/")?
///     .with_data_prefix("/restconf/data");
///
/// assert_eq!(
///     config.data_url("interfaces/interface=eth0"),
///     "http://device:8080/restconf/data/interfaces/interface=eth0"
/// );
/// assert_eq!(config.data_url(""), "http://device:8080/restconf/data");
/// # Ok::<(), confpath_restconf::ConsoleError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    data_prefix: String,
    notification_prefix: String,
    timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            data_prefix: DEFAULT_DATA_PREFIX.to_string(),
            notification_prefix: DEFAULT_NOTIFICATION_PREFIX.to_string(),
            timeout: Duration::from_secs(30),
        })
    }

    pub fn with_data_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.data_prefix = prefix.into();
        self
    }

    pub fn with_notification_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.notification_prefix = prefix.into();
        self
    }

    /// Request timeout for data reads and writes. The notification stream
    /// is long-lived and not subject to it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn data_prefix(&self) -> &str {
        &self.data_prefix
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// URL of the datastore resource at `path`; the datastore root when
    /// `path` is empty.
    pub fn data_url(&self, path: &str) -> String {
        build_url(&build_url(self.base_url.as_str(), &self.data_prefix), path)
    }

    pub fn notification_stream_url(&self) -> String {
        build_url(
            &build_url(self.base_url.as_str(), &self.notification_prefix),
            "notifications/stream",
        )
    }
}

/// Join a base URL and a path with exactly one slash between them.
pub fn build_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}
