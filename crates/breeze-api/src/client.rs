//! Session client for the Breeze XML API.
//!
//! Every request is a GET to `<base>xml?action=<name>&<params>`. The
//! `login` action answers with a `BREEZESESSION` cookie that is replayed on
//! every later call. Answers are XML envelopes whose `status/@code` must be
//! `ok`; anything else is turned into [`ConnectError::Request`].
//!
//! Domain operations live in sibling modules (`users`, `groups`, `folders`,
//! `meetings`, `permissions`, `sco`) as further `impl ConnectClient` blocks.

use crate::config::{ConnectConfig, Credentials, SESSION_COOKIE};
use crate::error::{ConnectError, ConnectResult};
use crate::response::ActionResponse;
use crate::transport::{
    extract_session_token, ConnectTransport, HttpTransport, TransportRequest, TransportResponse,
};
use crate::types::{ActionParams, ActionRequest, ConnectSession};
use log::{debug, info};
use tokio::sync::Mutex;
use url::Url;

/// Authenticated session against one Breeze API endpoint.
///
/// A client is single-flight: an internal lock is held for the whole of
/// each network exchange, so at most one request is outstanding.
pub struct ConnectClient<T: ConnectTransport = HttpTransport> {
    config: ConnectConfig,
    endpoint: Url,
    transport: T,
    session: ConnectSession,
    in_flight: Mutex<()>,
}

impl ConnectClient<HttpTransport> {
    /// Build a client over HTTP. No request is sent until `login`/`invoke`.
    pub fn new(config: ConnectConfig) -> ConnectResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: ConnectTransport> ConnectClient<T> {
    /// Build a client over a custom transport.
    pub fn with_transport(config: ConnectConfig, transport: T) -> ConnectResult<Self> {
        config.validate()?;
        let endpoint = config.endpoint()?;
        info!("Breeze API client created for {}", endpoint);
        Ok(Self {
            session: ConnectSession::new(config.base_url.trim()),
            config,
            endpoint,
            transport,
            in_flight: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &ConnectConfig {
        &self.config
    }

    /// The `…/xml` endpoint every action is sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn session(&self) -> &ConnectSession {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.authenticated
    }

    /// The session token obtained at login, for handing to a browser.
    pub fn session_token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    /// `BREEZESESSION=<token>`, ready for a `Cookie` header.
    pub fn cookie_header(&self) -> Option<String> {
        self.session_token()
            .map(|token| format!("{}={}", SESSION_COOKIE, token))
    }

    /// Scheme, host and (non-default) port of the endpoint, used as the
    /// prefix for meeting join links.
    pub fn url_base(&self) -> String {
        self.endpoint.origin().ascii_serialization()
    }

    // ── Session ─────────────────────────────────────────────────────────

    /// Log in with `credentials`, or with the configured ones when `None`.
    ///
    /// The session token is read from the `Set-Cookie` headers before the
    /// status is checked; the session only changes once both succeed.
    pub async fn login(&mut self, credentials: Option<&Credentials>) -> ConnectResult<()> {
        let credentials = match credentials {
            Some(c) => c.clone(),
            None => self
                .config
                .credentials()
                .ok_or_else(|| ConnectError::Config("No login credentials configured".into()))?,
        };

        let mut params = ActionParams::new()
            .with("login", &credentials.login)
            .with("password", &credentials.password);
        if self.config.external_auth {
            params.insert("external-auth", "use");
        }

        let raw = self.exchange(&ActionRequest::new("login", params)).await?;
        let token = extract_session_token(&raw)?;
        ActionResponse::parse("login", &raw.body)?.ensure_ok()?;

        self.session.token = Some(token);
        self.session.authenticated = true;
        info!(
            "Breeze API session established for {} at {}",
            credentials.login, self.session.base_url
        );
        Ok(())
    }

    // ── Generic action call ─────────────────────────────────────────────

    /// Call one action and return its parsed, status-checked answer.
    pub async fn invoke(&self, action: &str, params: ActionParams) -> ConnectResult<ActionResponse> {
        let raw = self.exchange(&ActionRequest::new(action, params)).await?;
        let response = ActionResponse::parse(action, &raw.body)?.ensure_ok()?;
        debug!("Breeze API ← action={} ok", action);
        Ok(response)
    }

    /// Send one request while holding the in-flight lock. The token is
    /// attached only once the session is authenticated.
    async fn exchange(&self, request: &ActionRequest) -> ConnectResult<TransportResponse> {
        let url = request.to_url(&self.endpoint);
        let session_token = if self.session.authenticated {
            self.session.token.clone()
        } else {
            None
        };

        let _guard = self.in_flight.lock().await;
        debug!(
            "Breeze API → action={} ({} params)",
            request.action,
            request.params.len()
        );
        self.transport
            .send(&TransportRequest {
                url: url.into(),
                session_token,
            })
            .await
    }

    // ── Account ─────────────────────────────────────────────────────────

    /// `common-info`: server, account and current user details.
    pub async fn get_common_info(&self) -> ConnectResult<ActionResponse> {
        self.invoke("common-info", ActionParams::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crate::transport::TransportResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    const COMMON_INFO: &str = r#"<results><status code="ok"/><common locale="en" time-zone-id="85"><cookie>tok-1</cookie><host>https://meet.example.com</host><version>12.4</version><user user-id="624520" type="user"><name>Ada Lovelace</name><login>ada@example.com</login></user></common></results>"#;

    #[tokio::test]
    async fn login_stores_token() {
        let (mut client, transport) = scripted_client();
        transport.push(
            TransportResponse::xml(OK).with_header("Set-Cookie", "BREEZESESSION=abc123;HttpOnly;path=/"),
        );
        client.login(None).await.unwrap();

        assert!(client.is_authenticated());
        assert_eq!(client.session_token(), Some("abc123"));
        assert_eq!(client.cookie_header().as_deref(), Some("BREEZESESSION=abc123"));

        assert_eq!(
            transport.query(0),
            pairs(&[
                ("action", "login"),
                ("login", "admin@example.com"),
                ("password", "secret"),
                ("external-auth", "use"),
            ])
        );
        assert_eq!(transport.requests()[0].session_token, None);
    }

    #[tokio::test]
    async fn login_with_explicit_credentials() {
        let (mut client, transport) = scripted_client();
        transport.push_login("t");
        client
            .login(Some(&Credentials::new("other@example.com", "pw")))
            .await
            .unwrap();
        assert_eq!(transport.param(0, "login").as_deref(), Some("other@example.com"));
        assert_eq!(transport.param(0, "password").as_deref(), Some("pw"));
    }

    #[tokio::test]
    async fn login_without_external_auth() {
        let mut cfg = test_config();
        cfg.external_auth = false;
        let (mut client, transport) = scripted_client_with(cfg);
        transport.push_login("t");
        client.login(None).await.unwrap();
        assert_eq!(transport.param(0, "external-auth"), None);
    }

    #[tokio::test]
    async fn login_without_marker_is_authentication_error() {
        let (mut client, transport) = scripted_client();
        transport.push(TransportResponse::xml(OK).with_header("Set-Cookie", "JSESSIONID=x;HttpOnly"));
        let err = client.login(None).await.unwrap_err();
        assert!(matches!(err, ConnectError::Authentication(_)));
        assert!(!client.is_authenticated());
        assert_eq!(client.session_token(), None);
    }

    #[tokio::test]
    async fn login_with_bad_status_leaves_session_untouched() {
        let (mut client, transport) = scripted_client();
        transport.push(
            TransportResponse::xml(r#"<results><status code="no-data"/></results>"#)
                .with_header("Set-Cookie", "BREEZESESSION=abc123;HttpOnly"),
        );
        let err = client.login(None).await.unwrap_err();
        assert_eq!(err.action(), Some("login"));
        assert_eq!(err.status_code(), Some("no-data"));
        assert!(!client.is_authenticated());
        assert_eq!(client.session_token(), None);
    }

    #[tokio::test]
    async fn login_without_credentials_sends_nothing() {
        let (mut client, transport) = scripted_client_with(ConnectConfig::new(BASE_URL));
        let err = client.login(None).await.unwrap_err();
        assert!(matches!(err, ConnectError::Config(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn token_attached_only_after_login() {
        let (mut client, transport) = scripted_client();
        transport.push_xml(COMMON_INFO);
        transport.push_login("tok-9");
        transport.push_xml(COMMON_INFO);

        client.get_common_info().await.unwrap();
        client.login(None).await.unwrap();
        client.get_common_info().await.unwrap();

        let sent: Vec<_> = transport.requests().into_iter().map(|r| r.session_token).collect();
        assert_eq!(sent, vec![None, None, Some("tok-9".to_string())]);
    }

    #[tokio::test]
    async fn invoke_builds_url_and_checks_status() {
        let (client, transport) = logged_in_client().await;
        transport.push_xml(OK);
        let resp = client
            .invoke("sco-info", ActionParams::new().with("sco-id", 2006))
            .await
            .unwrap();
        assert_eq!(resp.status_code(), Some("ok"));
        assert_eq!(
            transport.requests()[1].url,
            "https://meet.example.com/api/xml?action=sco-info&sco-id=2006"
        );
    }

    #[tokio::test]
    async fn invoke_non_ok_names_action() {
        let (client, transport) = logged_in_client().await;
        transport.push_xml(r#"<results><status code="no-access" subcode="denied"/></results>"#);
        let err = client.invoke("principal-list", ActionParams::new()).await.unwrap_err();
        assert_eq!(err.action(), Some("principal-list"));
        assert_eq!(err.status_code(), Some("no-access"));
        assert!(err.to_string().contains("principal-list"));
    }

    #[tokio::test]
    async fn invoke_propagates_transport_and_parse_errors() {
        let (client, transport) = logged_in_client().await;
        transport.push_error(ConnectError::Transport("HTTP 502".into()));
        transport.push_xml("<html><body>gateway");
        assert!(matches!(
            client.invoke("common-info", ActionParams::new()).await,
            Err(ConnectError::Transport(_))
        ));
        assert!(matches!(
            client.invoke("common-info", ActionParams::new()).await,
            Err(ConnectError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn common_info_is_idempotent() {
        let (client, transport) = logged_in_client().await;
        transport.push_xml(COMMON_INFO).push_xml(COMMON_INFO);
        let a = client.get_common_info().await.unwrap();
        let b = client.get_common_info().await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.str_at(&["common", "user", "user-id"]), Some("624520"));
        assert_eq!(transport.query(1), pairs(&[("action", "common-info")]));
    }

    #[test]
    fn url_base_is_origin() {
        let (client, _) = scripted_client();
        assert_eq!(client.url_base(), "https://meet.example.com");
        let (client, _) = scripted_client_with(ConnectConfig::new("http://10.0.0.5:8080/api"));
        assert_eq!(client.url_base(), "http://10.0.0.5:8080");
        assert_eq!(client.endpoint().as_str(), "http://10.0.0.5:8080/api/xml");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = ConnectClient::with_transport(ConnectConfig::new("ftp://x/"), ScriptedTransport::new());
        assert!(matches!(result, Err(ConnectError::Config(_))));
    }

    /// Counts how many sends overlap.
    struct SlowTransport {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ConnectTransport for SlowTransport {
        async fn send(&self, _request: &TransportRequest) -> ConnectResult<TransportResponse> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(TransportResponse::xml(OK))
        }
    }

    #[tokio::test]
    async fn requests_are_single_flight() {
        let client = Arc::new(
            ConnectClient::with_transport(
                test_config(),
                SlowTransport {
                    active: AtomicUsize::new(0),
                    peak: AtomicUsize::new(0),
                },
            )
            .unwrap(),
        );
        let (a, b, c) = tokio::join!(
            client.get_common_info(),
            client.get_common_info(),
            client.get_common_info()
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(client.transport.peak.load(Ordering::SeqCst), 1);
    }
}
