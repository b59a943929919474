//! Connection configuration and credentials.
//!
//! A `ConnectConfig` can be built in code, deserialised from JSON, or read
//! from `BREEZE_*` environment variables. The base URL is the API root that
//! `xml?action=…` is appended to, e.g. `https://meet.example.com/api/`.

use crate::error::{ConnectError, ConnectResult};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Name of the session cookie issued by the login action.
pub const SESSION_COOKIE: &str = "BREEZESESSION";

const DEFAULT_USER_AGENT: &str = "breeze-api/0.1";

// ── Credentials ─────────────────────────────────────────────────────────

/// Login credentials for the `login` action.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: &str, password: &str) -> Self {
        Self {
            login: login.to_string(),
            password: password.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ── Connection Configuration ────────────────────────────────────────────

/// Full connection configuration for a Breeze API session.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectConfig {
    /// API root, e.g. `https://meet.example.com/api/`.
    pub base_url: String,
    /// Default login used by `login(None)`.
    pub username: Option<String>,
    /// Default password used by `login(None)`.
    pub password: Option<String>,
    /// Folder that `create_folder` / `check_folder` operate in.
    pub root_folder_id: Option<String>,
    /// Send `external-auth=use` with the login action.
    pub external_auth: bool,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    pub verify_tls: bool,
    pub proxy: Option<String>,
    pub user_agent: String,
    pub max_redirects: usize,
    /// Offset applied to meeting dates given without one.
    pub utc_offset_minutes: i32,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: None,
            password: None,
            root_folder_id: None,
            external_auth: true,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            verify_tls: true,
            proxy: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 10,
            utc_offset_minutes: 0,
        }
    }
}

impl fmt::Debug for ConnectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("root_folder_id", &self.root_folder_id)
            .field("external_auth", &self.external_auth)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("verify_tls", &self.verify_tls)
            .field("proxy", &self.proxy)
            .field("user_agent", &self.user_agent)
            .field("max_redirects", &self.max_redirects)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .finish()
    }
}

impl ConnectConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, login: &str, password: &str) -> Self {
        self.username = Some(login.to_string());
        self.password = Some(password.to_string());
        self
    }

    pub fn with_root_folder(mut self, folder_id: &str) -> Self {
        self.root_folder_id = Some(folder_id.to_string());
        self
    }

    /// Resolve configuration from `BREEZE_*` environment variables.
    pub fn from_environment() -> ConnectResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ConnectResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("BREEZE_BASE_URL")
            .ok_or_else(|| ConnectError::Config("BREEZE_BASE_URL is not set".into()))?;
        let mut config = Self::new(&base_url);
        config.username = lookup("BREEZE_USERNAME");
        config.password = lookup("BREEZE_PASSWORD");
        config.root_folder_id = lookup("BREEZE_ROOT_FOLDER_ID");
        config.proxy = lookup("BREEZE_PROXY");
        if let Some(v) = lookup("BREEZE_VERIFY_TLS") {
            config.verify_tls = parse_bool(&v)
                .ok_or_else(|| ConnectError::Config(format!("BREEZE_VERIFY_TLS: '{}' is not a boolean", v)))?;
        }
        if let Some(v) = lookup("BREEZE_TIMEOUT_SECS") {
            config.timeout_secs = v
                .parse()
                .map_err(|_| ConnectError::Config(format!("BREEZE_TIMEOUT_SECS: '{}' is not a number", v)))?;
        }
        if let Some(v) = lookup("BREEZE_UTC_OFFSET_MINUTES") {
            config.utc_offset_minutes = v.parse().map_err(|_| {
                ConnectError::Config(format!("BREEZE_UTC_OFFSET_MINUTES: '{}' is not a number", v))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConnectResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConnectError::Config("Base URL is required".into()));
        }
        let url = Url::parse(self.base_url.trim())?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConnectError::Config(format!(
                "Unsupported URL scheme '{}'",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConnectError::Config("Timeout must be greater than zero".into()));
        }
        self.utc_offset()?;
        if url.scheme() == "http" {
            log::warn!("Breeze API endpoint {} is not using TLS", url);
        }
        Ok(())
    }

    /// The action endpoint: `<base_url>xml`.
    pub fn endpoint(&self) -> ConnectResult<Url> {
        let mut base = self.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Url::parse(&base)?.join("xml")?)
    }

    /// The configured default credentials, if both halves are present.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(login), Some(password)) => Some(Credentials::new(login, password)),
            _ => None,
        }
    }

    /// Offset for dates supplied without one.
    pub fn utc_offset(&self) -> ConnectResult<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConnectError::Config(format!(
                    "UTC offset of {} minutes is out of range",
                    self.utc_offset_minutes
                ))
            })
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn endpoint_appends_xml() {
        let cfg = ConnectConfig::new("https://meet.example.com/api/");
        assert_eq!(cfg.endpoint().unwrap().as_str(), "https://meet.example.com/api/xml");
    }

    #[test]
    fn endpoint_adds_missing_slash() {
        let cfg = ConnectConfig::new("https://meet.example.com/api");
        assert_eq!(cfg.endpoint().unwrap().as_str(), "https://meet.example.com/api/xml");
    }

    #[test]
    fn validate_ok() {
        assert!(ConnectConfig::new("https://meet.example.com/api/").validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_and_bad_scheme() {
        assert!(ConnectConfig::new("").validate().is_err());
        assert!(ConnectConfig::new("ftp://meet.example.com/").validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut cfg = ConnectConfig::new("https://meet.example.com/api/");
        cfg.timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_offset_out_of_range() {
        let mut cfg = ConnectConfig::new("https://meet.example.com/api/");
        cfg.utc_offset_minutes = 24 * 60;
        assert!(matches!(cfg.validate(), Err(ConnectError::Config(_))));
        cfg.utc_offset_minutes = 50_000_000;
        assert!(matches!(cfg.validate(), Err(ConnectError::Config(_))));
        cfg.utc_offset_minutes = i32::MIN;
        assert!(matches!(cfg.utc_offset(), Err(ConnectError::Config(_))));
    }

    #[test]
    fn credentials_need_both_halves() {
        let cfg = ConnectConfig::new("https://x/");
        assert!(cfg.credentials().is_none());
        let cfg = cfg.with_credentials("admin@example.com", "secret");
        assert_eq!(cfg.credentials(), Some(Credentials::new("admin@example.com", "secret")));
    }

    #[test]
    fn debug_redacts_password() {
        let cfg = ConnectConfig::new("https://x/").with_credentials("admin", "hunter2");
        assert!(!format!("{:?}", cfg).contains("hunter2"));
        assert!(!format!("{:?}", cfg.credentials().unwrap()).contains("hunter2"));
    }

    #[test]
    fn from_lookup_reads_all_keys() {
        let cfg = ConnectConfig::from_lookup(lookup_from(&[
            ("BREEZE_BASE_URL", "https://meet.example.com/api/"),
            ("BREEZE_USERNAME", "admin"),
            ("BREEZE_PASSWORD", "secret"),
            ("BREEZE_ROOT_FOLDER_ID", "11002"),
            ("BREEZE_VERIFY_TLS", "false"),
            ("BREEZE_TIMEOUT_SECS", "5"),
            ("BREEZE_UTC_OFFSET_MINUTES", "120"),
        ]))
        .unwrap();
        assert_eq!(cfg.username.as_deref(), Some("admin"));
        assert_eq!(cfg.root_folder_id.as_deref(), Some("11002"));
        assert!(!cfg.verify_tls);
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.utc_offset().unwrap().local_minus_utc(), 7200);
    }

    #[test]
    fn from_lookup_requires_base_url() {
        let err = ConnectConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("BREEZE_BASE_URL"));
    }

    #[test]
    fn from_lookup_rejects_huge_offset() {
        let err = ConnectConfig::from_lookup(lookup_from(&[
            ("BREEZE_BASE_URL", "https://meet.example.com/api/"),
            ("BREEZE_UTC_OFFSET_MINUTES", "50000000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConnectError::Config(_)));
    }

    #[test]
    fn from_lookup_rejects_bad_bool() {
        let err = ConnectConfig::from_lookup(lookup_from(&[
            ("BREEZE_BASE_URL", "https://meet.example.com/api/"),
            ("BREEZE_VERIFY_TLS", "maybe"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConnectError::Config(_)));
    }

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let cfg: ConnectConfig =
            serde_json::from_str(r#"{"base_url": "https://meet.example.com/api/"}"#).unwrap();
        assert!(cfg.external_auth);
        assert!(cfg.verify_tls);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_redirects, 10);
    }
}
