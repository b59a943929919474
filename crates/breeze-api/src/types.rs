//! Data structures shared across the crate: action requests, session state,
//! principals, permissions and typed inputs for the domain methods.

use crate::error::{ConnectError, ConnectResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use url::Url;

// ── Action request ──────────────────────────────────────────────────────

/// Ordered flat mapping of query parameters for one action.
///
/// Insertion order is kept so the query string reads the way it was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParams(Vec<(String, String)>);

impl ActionParams {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a parameter, replacing an existing value for the same key.
    pub fn insert(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: ToString, V: ToString> FromIterator<(K, V)> for ActionParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = ActionParams::new();
        for (k, v) in iter {
            params.insert(&k.to_string(), v);
        }
        params
    }
}

/// One remote call: an action name plus its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    pub params: ActionParams,
}

impl ActionRequest {
    pub fn new(action: &str, params: ActionParams) -> Self {
        Self {
            action: action.to_string(),
            params,
        }
    }

    /// `<endpoint>?action=<name>&<urlencoded params>`.
    pub fn to_url(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("action", &self.action);
            for (k, v) in self.params.iter() {
                query.append_pair(k, v);
            }
        }
        url
    }
}

// ── Session ─────────────────────────────────────────────────────────────

/// Session state held by a client: `Unauthenticated → Authenticated`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectSession {
    pub base_url: String,
    pub token: Option<String>,
    pub authenticated: bool,
}

impl ConnectSession {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            token: None,
            authenticated: false,
        }
    }
}

/// A live session as seen by the session registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectSessionInfo {
    pub id: String,
    pub base_url: String,
    pub login: String,
    pub connected_at: DateTime<Utc>,
}

// ── Principals ──────────────────────────────────────────────────────────

/// A user or group record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Principal {
    #[serde(deserialize_with = "text_value")]
    pub principal_id: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub account_id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "optional_text")]
    pub principal_type: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub has_children: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub is_primary: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub is_hidden: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub login: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub email: Option<String>,
    /// Present in `permissions-info` answers.
    #[serde(default, deserialize_with = "optional_text")]
    pub permission_id: Option<String>,
}

impl Principal {
    /// Parse a principal from a response node.
    pub fn from_node(node: &Value) -> ConnectResult<Self> {
        Ok(serde_json::from_value(node.clone())?)
    }
}

/// Leaf values arrive as strings; empty elements arrive as `{}`.
fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn text_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    optional_text(deserializer)?.ok_or_else(|| serde::de::Error::custom("expected a text value"))
}

// ── Permissions ─────────────────────────────────────────────────────────

/// Values of the `permission-id` parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    /// Participant.
    #[default]
    View,
    Host,
    /// Presenter.
    MiniHost,
    Denied,
    /// Clears any permission the principal had.
    Remove,
    Publish,
    Manage,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Host => "host",
            Self::MiniHost => "mini-host",
            Self::Denied => "denied",
            Self::Remove => "remove",
            Self::Publish => "publish",
            Self::Manage => "manage",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "view" => Ok(Self::View),
            "host" => Ok(Self::Host),
            "mini-host" => Ok(Self::MiniHost),
            "denied" => Ok(Self::Denied),
            "remove" => Ok(Self::Remove),
            "publish" => Ok(Self::Publish),
            "manage" => Ok(Self::Manage),
            other => Err(ConnectError::Parse(format!("Unknown permission '{}'", other))),
        }
    }
}

// ── Domain inputs ───────────────────────────────────────────────────────

/// Input for `create_user`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// Principal type; the service default is `user`.
    pub principal_type: String,
}

impl NewUser {
    pub fn new(email: &str, password: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            principal_type: "user".to_string(),
        }
    }

    pub fn with_type(mut self, principal_type: &str) -> Self {
        self.principal_type = principal_type.to_string();
        self
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("principal_type", &self.principal_type)
            .finish()
    }
}

/// Fields to change on an existing meeting. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingUpdate {
    pub name: Option<String>,
    pub date_begin: Option<String>,
    pub date_end: Option<String>,
    pub url_path: Option<String>,
}
