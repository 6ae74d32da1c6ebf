//! Fetching and writing configuration subtrees.

use crate::config::{ClientConfig, YANG_JSON};
use crate::error::{ConsoleError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

/// Reads and writes datastore resources by tree path.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the resource at `path` (the datastore root when empty).
    async fn get(&self, path: &str) -> Result<Value>;

    /// Replace the resource at `path` with `body`.
    async fn put(&self, path: &str, body: &Value) -> Result<()>;
}

/// [`Transport`] over HTTP with `application/yang-data+json` bodies.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Value> {
        let url = self.config.data_url(path);
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, YANG_JSON)
            .send()
            .await?;
        let response = check_status(response, &url)?;

        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn put(&self, path: &str, body: &Value) -> Result<()> {
        let url = self.config.data_url(path);
        let payload = serde_json::to_vec(body)?;
        debug!(%url, bytes = payload.len(), "PUT");

        let response = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, YANG_JSON)
            .header(ACCEPT, YANG_JSON)
            .body(payload)
            .send()
            .await?;
        check_status(response, &url)?;
        Ok(())
    }
}

/// Turn a non-2xx response into [`ConsoleError::Network`].
pub(crate) fn check_status(response: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        debug!(%url, %status, "request failed");
        Err(ConsoleError::Network {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode, Uri};
    use axum::routing::get;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    type Puts = Arc<Mutex<Vec<(String, String, Value)>>>;

    async fn root(headers: HeaderMap) -> (StatusCode, String) {
        let accept = headers
            .get("accept")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = json!({"ietf-restconf:data": {"system": {"accept": accept}}});
        (StatusCode::OK, body.to_string())
    }

    async fn resource(uri: Uri) -> (StatusCode, String) {
        match uri.path() {
            "/restconf/data/system/user=a%2Fb" => (
                StatusCode::OK,
                json!({"user": [{"name": "a/b"}]}).to_string(),
            ),
            _ => (StatusCode::NOT_FOUND, String::new()),
        }
    }

    async fn write(
        State(puts): State<Puts>,
        uri: Uri,
        headers: HeaderMap,
        body: String,
    ) -> StatusCode {
        if uri.path() == "/restconf/data/locked" {
            return StatusCode::CONFLICT;
        }
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let value: Value = serde_json::from_str(&body).unwrap();
        puts.lock()
            .unwrap()
            .push((uri.path().to_string(), content_type, value));
        StatusCode::NO_CONTENT
    }

    fn router(puts: Puts) -> Router {
        Router::new()
            .route("/restconf/data", get(root))
            .route("/restconf/data/{*rest}", get(resource).put(write))
            .with_state(puts)
    }

    async fn transport(puts: Puts) -> HttpTransport {
        let addr = spawn_server(router(puts)).await;
        let config = ClientConfig::new(&format!("http://{}", addr)).unwrap();
        HttpTransport::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_get_root_sends_accept() {
        let t = transport(Puts::default()).await;
        let value = t.get("").await.unwrap();
        assert_eq!(
            value["ietf-restconf:data"]["system"]["accept"],
            json!(YANG_JSON)
        );
    }

    #[tokio::test]
    async fn test_get_escaped_path() {
        let t = transport(Puts::default()).await;
        let value = t.get("system/user=a%2Fb").await.unwrap();
        assert_eq!(value["user"][0]["name"], json!("a/b"));
    }

    #[tokio::test]
    async fn test_get_non_2xx_is_network_error() {
        let t = transport(Puts::default()).await;
        let err = t.get("locked").await.unwrap_err();
        match err {
            ConsoleError::Network { status, url } => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/restconf/data/locked"));
            }
            other => panic!("Expected Network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_put_sends_body_and_content_type() {
        let puts = Puts::default();
        let t = transport(puts.clone()).await;
        t.put("system/user=a%2Fb", &json!({"user": [{"name": "a/b", "uid": 3}]}))
            .await
            .unwrap();

        let recorded = puts.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, "/restconf/data/system/user=a%2Fb");
        assert_eq!(recorded[0].1, YANG_JSON);
        assert_eq!(recorded[0].2["user"][0]["uid"], json!(3));
    }

    #[tokio::test]
    async fn test_put_non_2xx_is_network_error() {
        let t = transport(Puts::default()).await;
        let err = t.put("locked", &json!({})).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Network { status: 409, .. }));
        assert_eq!(err.to_string(), "HTTP 409");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let config = ClientConfig::new("http://127.0.0.1:1").unwrap();
        let t = HttpTransport::new(config).unwrap();
        assert!(matches!(
            t.get("").await.unwrap_err(),
            ConsoleError::Transport(_)
        ));
    }
}
