//! Same-origin forwarding proxy for a RESTCONF server.
//!
//! `/restconf/data` and everything below it is relayed to the upstream
//! RESTCONF base; the `/restconf` prefix of the incoming path is replaced by
//! the upstream base path.

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:9000";
pub const DEFAULT_UPSTREAM: &str = "http://localhost:8080/restconf";

const DEFAULT_ACCEPT: &str = "application/yang-data+json, application/json";

/// Headers that only make sense for a single connection.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

#[derive(Clone)]
struct ProxyState {
    client: reqwest::Client,
    upstream: Url,
}

pub async fn run(listen: &str, upstream: &str) -> Result<()> {
    let upstream = Url::parse(upstream.trim_end_matches('/'))
        .with_context(|| format!("invalid upstream URL {:?}", upstream))?;
    let app = router(upstream.clone())?;

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to listen on {}", listen))?;
    info!(
        "RESTCONF proxy listening on {} -> upstream {}",
        listener.local_addr()?,
        upstream
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}

fn router(upstream: Url) -> Result<Router> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    Ok(Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/restconf/data", any(forward))
        .route("/restconf/data/{*rest}", any(forward))
        .fallback(|| async { (StatusCode::NOT_FOUND, "not found") })
        .with_state(ProxyState { client, upstream }))
}

/// Upstream URL for an incoming request URI.
fn target_url(upstream: &Url, uri: &Uri) -> Url {
    let incoming = uri.path().strip_prefix("/restconf").unwrap_or(uri.path());
    let mut target = upstream.clone();
    target.set_path(&format!(
        "{}{}",
        upstream.path().trim_end_matches('/'),
        incoming
    ));
    target.set_query(uri.query());
    target
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Request headers to send upstream.
fn upstream_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in incoming {
        if is_hop_by_hop(name)
            || name == header::HOST
            || name == header::AUTHORIZATION
            || name == header::CONTENT_LENGTH
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    if !headers.contains_key(header::ACCEPT) {
        headers.insert(header::ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
    }
    headers
}

async fn forward(
    State(state): State<ProxyState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let target = target_url(&state.upstream, &uri);
    info!("--> {} {}", method, target);

    let request = state
        .client
        .request(method.clone(), target.as_str())
        .headers(upstream_headers(&headers))
        .body(body);

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            warn!("upstream error for {} {}: {}", method, target, e);
            return (StatusCode::BAD_GATEWAY, format!("upstream error: {}", e)).into_response();
        }
    };

    let status = response.status();
    let mut relayed = HeaderMap::new();
    for (name, value) in response.headers() {
        if is_hop_by_hop(name) || name == header::CONTENT_LENGTH {
            continue;
        }
        relayed.append(name.clone(), value.clone());
    }

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("upstream body error for {} {}: {}", method, target, e);
            return (StatusCode::BAD_GATEWAY, format!("upstream error: {}", e)).into_response();
        }
    };

    info!(
        "<-- {} {} {} {}B in {:?}",
        method,
        uri.path(),
        status.as_u16(),
        bytes.len(),
        start.elapsed()
    );
    (status, relayed, bytes).into_response()
}
