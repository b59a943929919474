//! HTTP transport for Breeze API calls.
//!
//! `ConnectTransport` is the single network seam: one GET per action,
//! returning status, headers and body untouched. `HttpTransport` is the
//! `reqwest` implementation; it keeps one pooled client per instance and
//! attaches the session token as the `BREEZESESSION` cookie.

use crate::config::{ConnectConfig, SESSION_COOKIE};
use crate::error::{ConnectError, ConnectResult};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, LOCATION, REFERER};
use reqwest::{redirect, Client};
use std::time::Duration;
use url::Url;

/// One outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub url: String,
    pub session_token: Option<String>,
}

/// Raw response of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Headers in arrival order; repeated headers appear once per value.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TransportResponse {
    /// A 200 response with an XML body and no headers.
    pub fn xml(body: &str) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// All values of a header, case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Network seam used by `ConnectClient`.
#[async_trait]
pub trait ConnectTransport: Send + Sync {
    async fn send(&self, request: &TransportRequest) -> ConnectResult<TransportResponse>;
}

/// `reqwest`-backed transport.
///
/// Redirects are followed here rather than inside `reqwest` so that the
/// headers of every hop end up in the response. A session cookie set on a
/// hop is replayed on the following hops.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    max_redirects: usize,
}

impl HttpTransport {
    /// Build the HTTP client from connection configuration.
    pub fn new(config: &ConnectConfig) -> ConnectResult<Self> {
        let mut default_headers = HeaderMap::new();
        let referer = HeaderValue::from_str(config.base_url.trim())
            .map_err(|e| ConnectError::Config(format!("Invalid base URL header value: {}", e)))?;
        default_headers.insert(REFERER, referer);

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .redirect(redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .default_headers(default_headers);

        if let Some(ref proxy_url) = config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| ConnectError::Config(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ConnectError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_redirects: config.max_redirects,
        })
    }
}

#[async_trait]
impl ConnectTransport for HttpTransport {
    async fn send(&self, request: &TransportRequest) -> ConnectResult<TransportResponse> {
        let mut url = Url::parse(&request.url)?;
        let mut session_token = request.session_token.clone();
        let mut headers: Vec<(String, String)> = Vec::new();
        let mut hops = 0;

        loop {
            let mut req = self.client.get(url.clone());
            if let Some(ref token) = session_token {
                req = req.header(COOKIE, format!("{}={}", SESSION_COOKIE, token));
            }

            let resp = req.send().await?;
            let status = resp.status();
            let hop_headers: Vec<(String, String)> = resp
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
                .collect();

            if status.is_redirection() {
                let location = hop_headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(LOCATION.as_str()))
                    .map(|(_, v)| v.clone());
                if let Some(location) = location {
                    if hops >= self.max_redirects {
                        return Err(ConnectError::Transport(format!(
                            "Too many redirects (limit {})",
                            self.max_redirects
                        )));
                    }
                    hops += 1;
                    let hop = TransportResponse {
                        status: status.as_u16(),
                        headers: hop_headers,
                        body: String::new(),
                    };
                    if let Ok(token) = extract_session_token(&hop) {
                        session_token = Some(token);
                    }
                    headers.extend(hop.headers);
                    url = url.join(&location)?;
                    debug!("Breeze API redirect {} → {}", status.as_u16(), url);
                    continue;
                }
            }

            headers.extend(hop_headers);
            let body = resp.text().await?;

            if !status.is_success() {
                return Err(ConnectError::Transport(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    body.chars().take(200).collect::<String>()
                )));
            }

            debug!("Breeze API ← HTTP {} ({} bytes)", status.as_u16(), body.len());
            return Ok(TransportResponse {
                status: status.as_u16(),
                headers,
                body,
            });
        }
    }
}

/// Pull the session token out of `Set-Cookie` headers.
///
/// The value looks like `BREEZESESSION=<token>;HttpOnly;path=/`. The token
/// ends at `;Http`, else at the next `;`, else at the end of the value.
pub fn extract_session_token(response: &TransportResponse) -> ConnectResult<String> {
    let marker = format!("{}=", SESSION_COOKIE);
    for value in response.header_values("set-cookie") {
        let Some(start) = value.find(&marker) else {
            continue;
        };
        let rest = &value[start + marker.len()..];
        let end = rest
            .find(";Http")
            .or_else(|| rest.find(';'))
            .unwrap_or(rest.len());
        let token = rest[..end].trim();
        if token.is_empty() {
            return Err(ConnectError::Authentication("Empty session token in response".into()));
        }
        return Ok(token.to_string());
    }
    Err(ConnectError::Authentication("no session".into()))
}
