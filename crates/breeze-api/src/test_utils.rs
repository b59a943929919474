//! In-memory transport for unit tests.
//!
//! Replays canned responses in order and records every request so tests
//! can assert on the exact query string and cookie that would have been
//! sent.

use crate::config::ConnectConfig;
use crate::client::ConnectClient;
use crate::error::{ConnectError, ConnectResult};
use crate::transport::{ConnectTransport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use url::Url;

pub const BASE_URL: &str = "https://meet.example.com/api/";

pub const OK: &str = r#"<?xml version="1.0" encoding="utf-8"?><results><status code="ok"/></results>"#;

#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<ConnectResult<TransportResponse>>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: TransportResponse) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn push_xml(&self, body: &str) -> &Self {
        self.push(TransportResponse::xml(body))
    }

    pub fn push_error(&self, error: ConnectError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// A successful login answer carrying `token`.
    pub fn push_login(&self, token: &str) -> &Self {
        self.push(
            TransportResponse::xml(OK)
                .with_header("Set-Cookie", &format!("BREEZESESSION={};HttpOnly;path=/", token)),
        )
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Query pairs of the `n`th request, `action` included.
    pub fn query(&self, n: usize) -> Vec<(String, String)> {
        let url = Url::parse(&self.requests()[n].url).unwrap();
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
    }

    /// Value of one query parameter of the `n`th request.
    pub fn param(&self, n: usize, key: &str) -> Option<String> {
        self.query(n).into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

#[async_trait]
impl ConnectTransport for ScriptedTransport {
    async fn send(&self, request: &TransportRequest) -> ConnectResult<TransportResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ConnectError::Transport("no scripted response left".into())))
    }
}

/// Owned query pairs, for comparing against `ScriptedTransport::query`.
pub fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn test_config() -> ConnectConfig {
    ConnectConfig::new(BASE_URL)
        .with_credentials("admin@example.com", "secret")
        .with_root_folder("11002")
}

/// A client over a fresh scripted transport, not yet logged in.
pub fn scripted_client() -> (ConnectClient<ScriptedTransport>, ScriptedTransport) {
    scripted_client_with(test_config())
}

pub fn scripted_client_with(config: ConnectConfig) -> (ConnectClient<ScriptedTransport>, ScriptedTransport) {
    let transport = ScriptedTransport::new();
    let client = ConnectClient::with_transport(config, transport.clone()).unwrap();
    (client, transport)
}

/// A client that has already logged in with token `tok-1`.
pub async fn logged_in_client() -> (ConnectClient<ScriptedTransport>, ScriptedTransport) {
    let (mut client, transport) = scripted_client();
    transport.push_login("tok-1");
    client.login(None).await.unwrap();
    (client, transport)
}

/// `principal-list` answer for one user.
pub fn principal_list_one(id: &str, email: &str) -> String {
    format!(
        r#"<results><status code="ok"/><principal-list><principal principal-id="{id}" account-id="624500" type="user" has-children="false" is-primary="false" is-hidden="false"><name>Ada Lovelace</name><login>{email}</login><email>{email}</email></principal></principal-list></results>"#
    )
}
