//! Chat-completion transport: the only code that talks to the network.
//!
//! [`ChatTransport`] is the seam between the translation client and the
//! remote API. Production code uses [`HttpChatTransport`], an
//! OpenAI-compatible `POST {base}/chat/completions` client; tests plug in
//! stubs.
//!
//! ## Proxy handling
//!
//! A configured proxy is probed exactly once, when the transport is built
//! ([`build_transport`]). A quick TCP connect decides between a proxied client
//! and a direct one. A proxy that cannot be used is logged and skipped
//! rather than failing every later request.

use crate::config::TranslationConfig;
use crate::error::{TranslatorError, TransportError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// How long the proxy reachability probe may take.
pub const PROXY_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Connect timeout used when routing through a proxy.
pub const PROXY_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One message of a chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Sends one chat-completion request and returns the first choice's content.
///
/// Implementations perform exactly one attempt; retrying is the caller's job.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, TransportError>;
}

/// Where requests are routed, decided once by [`resolve_route`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportRoute {
    Direct,
    Proxied(String),
}

/// OpenAI-compatible chat-completions client over `reqwest`.
pub struct HttpChatTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    route: TransportRoute,
}

impl HttpChatTransport {
    /// Build a client for `route` with the configured per-attempt timeout.
    pub fn new(config: &TranslationConfig, route: TransportRoute) -> Result<Self, TranslatorError> {
        let total = Duration::from_secs(config.timeout_secs);
        let mut builder = reqwest::Client::builder().timeout(total);

        if let TransportRoute::Proxied(ref url) = route {
            let proxy = reqwest::Proxy::all(url.as_str()).map_err(|e| {
                TranslatorError::InvalidConfig(format!("Invalid proxy URL '{url}': {e}"))
            })?;
            builder = builder.proxy(proxy).connect_timeout(PROXY_CONNECT_TIMEOUT);
        }

        let client = builder
            .build()
            .map_err(|e| TranslatorError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.chat_completions_url(),
            api_key: config.api_key.clone(),
            route,
        })
    }

    pub fn route(&self) -> &TransportRoute {
        &self.route
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<String, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // A body that breaks off mid-read is a network failure, not a bad payload.
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(e.to_string())
            } else {
                TransportError::Connect(format!("connection lost while reading response: {e}"))
            }
        })?;
        let parsed: ChatResponse =
            serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(TransportError::EmptyResponse)
    }
}

/// Probe `proxy` and decide how requests should be routed.
///
/// Only the `host:port` of the URL is checked. Anything that stops requests
/// from going through the proxy, including a scheme `reqwest` cannot handle,
/// results in a direct route.
pub async fn resolve_route(proxy: Option<&str>) -> TransportRoute {
    let Some(proxy) = proxy.map(str::trim).filter(|p| !p.is_empty()) else {
        return TransportRoute::Direct;
    };

    let (host, port) = match proxy_host_port(proxy) {
        Some(hp) => hp,
        None => {
            warn!("Proxy '{}' could not be parsed; connecting directly", proxy);
            return TransportRoute::Direct;
        }
    };

    if let Err(e) = reqwest::Proxy::all(proxy) {
        warn!("Proxy '{}' is not supported ({}); connecting directly", proxy, e);
        return TransportRoute::Direct;
    }

    match probe_tcp(&host, port).await {
        Ok(()) => {
            debug!("Proxy {}:{} is reachable", host, port);
            TransportRoute::Proxied(proxy.to_string())
        }
        Err(e) => {
            warn!("Proxy {} is not reachable ({}); connecting directly", proxy, e);
            TransportRoute::Direct
        }
    }
}

/// Open (and drop) a TCP connection to `host:port` within [`PROXY_PROBE_TIMEOUT`].
pub async fn probe_tcp(host: &str, port: u16) -> std::io::Result<()> {
    match timeout(PROXY_PROBE_TIMEOUT, TcpStream::connect((host, port))).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("no answer within {PROXY_PROBE_TIMEOUT:?}"),
        )),
    }
}

fn proxy_host_port(proxy: &str) -> Option<(String, u16)> {
    let url = reqwest::Url::parse(proxy).ok()?;
    let host = url.host_str()?.trim_matches(['[', ']']).to_string();
    let port = url.port_or_known_default()?;
    Some((host, port))
}

/// Build the production transport for `config`: probe the proxy, then
/// construct a proxied or direct client.
pub async fn build_transport(
    config: &TranslationConfig,
) -> Result<Arc<dyn ChatTransport>, TranslatorError> {
    let route = resolve_route(config.proxy.as_deref()).await;
    let transport = HttpChatTransport::new(config, route)?;
    info!(
        "Chat transport ready: {} ({})",
        transport.endpoint(),
        match transport.route() {
            TransportRoute::Direct => "direct".to_string(),
            TransportRoute::Proxied(p) => format!("via {p}"),
        }
    );
    Ok(Arc::new(transport))
}
