//! Session registry owning any number of logged-in clients by id.

use crate::client::ConnectClient;
use crate::config::ConnectConfig;
use crate::error::{ConnectError, ConnectResult};
use crate::transport::{ConnectTransport, HttpTransport};
use crate::types::ConnectSessionInfo;
use log::info;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared form of the registry.
pub type ConnectServiceState<T = HttpTransport> = Arc<Mutex<ConnectService<T>>>;

pub struct ConnectService<T: ConnectTransport = HttpTransport> {
    /// Live sessions keyed by id.
    sessions: HashMap<String, (ConnectSessionInfo, ConnectClient<T>)>,
}

impl<T: ConnectTransport> Default for ConnectService<T> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }
}

impl ConnectService<HttpTransport> {
    /// Create an empty registry wrapped in `Arc<Mutex<_>>`.
    pub fn new() -> ConnectServiceState {
        Arc::new(Mutex::new(ConnectService::default()))
    }

    /// Validate `config`, log in over HTTP and register the session.
    pub async fn connect(&mut self, config: ConnectConfig) -> ConnectResult<ConnectSessionInfo> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        self.connect_with(config, transport).await
    }
}

impl<T: ConnectTransport> ConnectService<T> {
    /// Log in over `transport` with the configured credentials and
    /// register the session.
    pub async fn connect_with(&mut self, config: ConnectConfig, transport: T) -> ConnectResult<ConnectSessionInfo> {
        let credentials = config
            .credentials()
            .ok_or_else(|| ConnectError::Config("No login credentials configured".into()))?;
        info!("Breeze API connecting to {}", config.base_url);

        let mut client = ConnectClient::with_transport(config, transport)?;
        client.login(Some(&credentials)).await?;

        let info = ConnectSessionInfo {
            id: uuid::Uuid::new_v4().to_string(),
            base_url: client.session().base_url.clone(),
            login: credentials.login.clone(),
            connected_at: chrono::Utc::now(),
        };
        self.sessions.insert(info.id.clone(), (info.clone(), client));
        info!("Breeze API session {} registered for {}", info.id, info.base_url);
        Ok(info)
    }

    /// Drop a session. The service keeps no logout action, so this only
    /// forgets the token locally.
    pub fn disconnect(&mut self, id: &str) -> ConnectResult<()> {
        if self.sessions.remove(id).is_some() {
            info!("Breeze API session {} disconnected", id);
            Ok(())
        } else {
            Err(ConnectError::SessionNotFound(id.to_string()))
        }
    }

    pub fn disconnect_all(&mut self) {
        let count = self.sessions.len();
        self.sessions.clear();
        if count > 0 {
            info!("Breeze API: {} session(s) disconnected", count);
        }
    }

    pub fn session_info(&self, id: &str) -> ConnectResult<&ConnectSessionInfo> {
        self.sessions
            .get(id)
            .map(|(info, _)| info)
            .ok_or_else(|| ConnectError::SessionNotFound(id.to_string()))
    }

    /// All live sessions, oldest first.
    pub fn list_sessions(&self) -> Vec<ConnectSessionInfo> {
        let mut list: Vec<_> = self.sessions.values().map(|(info, _)| info.clone()).collect();
        list.sort_by_key(|info| info.connected_at);
        list
    }

    /// The client behind a session.
    pub fn client(&self, id: &str) -> ConnectResult<&ConnectClient<T>> {
        self.sessions
            .get(id)
            .map(|(_, client)| client)
            .ok_or_else(|| ConnectError::SessionNotFound(id.to_string()))
    }
}
