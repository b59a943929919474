//! Error types for the Breeze API client.
//!
//! The service reports failures inside the XML envelope (`<status code="…">`)
//! rather than through HTTP status codes, so the interesting variants are
//! `Authentication`, `Request` and `NotFound`. Everything else describes a
//! local problem: transport, parsing, configuration or bad caller input.

use serde_json::Value;

/// Unified error type for all Breeze API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The login response did not carry a usable session cookie.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The remote status code was not `ok` (or was missing).
    #[error("Couldn't perform the action '{action}': {}", describe_status(.status))]
    Request { action: String, status: Value },

    /// A lookup returned no record.
    #[error("{0}")]
    NotFound(String),

    /// A begin/end date could not be parsed.
    #[error("Invalid date '{input}': expected a date such as 2024-01-01 10:00")]
    InvalidDate { input: String },

    /// Network / HTTP failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed XML or a response missing an expected field.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid or incomplete configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown session id in the session registry.
    #[error("Session '{0}' not found")]
    SessionNotFound(String),
}

impl ConnectError {
    /// Build a `Request` error for an action and its status payload.
    pub fn request(action: &str, status: Value) -> Self {
        Self::Request {
            action: action.to_string(),
            status,
        }
    }

    /// The remote status code carried by a `Request` error, if any.
    pub fn status_code(&self) -> Option<&str> {
        match self {
            Self::Request { status, .. } => status.get("code").and_then(Value::as_str),
            _ => None,
        }
    }

    /// The action that failed, for `Request` errors.
    pub fn action(&self) -> Option<&str> {
        match self {
            Self::Request { action, .. } => Some(action),
            _ => None,
        }
    }
}

/// Render a status payload such as `{"code": "invalid", "invalid": {...}}`
/// as `invalid (field=name, subcode=duplicate)`.
fn describe_status(status: &Value) -> String {
    let Some(obj) = status.as_object() else {
        return "no status in response".to_string();
    };
    let code = obj.get("code").and_then(Value::as_str).unwrap_or("unknown");
    let details: Vec<String> = obj
        .iter()
        .filter(|(k, _)| k.as_str() != "code")
        .flat_map(|(_, v)| match v {
            Value::Object(inner) => inner
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| format!("{}={}", k, s)))
                .collect::<Vec<_>>(),
            Value::String(s) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        })
        .collect();
    if details.is_empty() {
        code.to_string()
    } else {
        format!("{} ({})", code, details.join(", "))
    }
}

impl From<reqwest::Error> for ConnectError {
    fn from(e: reqwest::Error) -> Self {
        ConnectError::Transport(e.to_string())
    }
}

impl From<quick_xml::Error> for ConnectError {
    fn from(e: quick_xml::Error) -> Self {
        ConnectError::Parse(format!("XML error: {}", e))
    }
}

impl From<quick_xml::events::attributes::AttrError> for ConnectError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        ConnectError::Parse(format!("XML attribute error: {}", e))
    }
}

impl From<serde_json::Error> for ConnectError {
    fn from(e: serde_json::Error) -> Self {
        ConnectError::Parse(e.to_string())
    }
}

impl From<url::ParseError> for ConnectError {
    fn from(e: url::ParseError) -> Self {
        ConnectError::Config(format!("Invalid URL: {}", e))
    }
}

/// Convert ConnectError to a String for string-typed command surfaces.
impl From<ConnectError> for String {
    fn from(e: ConnectError) -> Self {
        e.to_string()
    }
}

/// Convenience Result alias.
pub type ConnectResult<T> = Result<T, ConnectError>;
