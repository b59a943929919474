//! Parsed action responses and the uniform status check.

use crate::error::{ConnectError, ConnectResult};
use crate::xml;
use serde::Serialize;
use serde_json::Value;

/// Status code the service uses for success.
pub const STATUS_OK: &str = "ok";

/// The nested mapping produced from one action's XML answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResponse {
    action: String,
    data: Value,
}

impl ActionResponse {
    /// Parse an XML body without checking its status.
    pub fn parse(action: &str, body: &str) -> ConnectResult<Self> {
        Ok(Self {
            action: action.to_string(),
            data: xml::xml_to_value(body)?,
        })
    }

    /// Pass the response through when `status/code` is `ok`; otherwise fail
    /// with the action name and the status payload.
    pub fn ensure_ok(self) -> ConnectResult<Self> {
        if self.status_code() == Some(STATUS_OK) {
            Ok(self)
        } else {
            let status = self.data.get("status").cloned().unwrap_or(Value::Null);
            log::warn!(
                "Breeze API action '{}' failed with status {}",
                self.action,
                status
            );
            Err(ConnectError::request(&self.action, status))
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn status_code(&self) -> Option<&str> {
        self.data
            .get("status")
            .and_then(|s| s.get("code"))
            .and_then(Value::as_str)
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    /// Walk a path of keys, e.g. `["sco", "sco-id"]`.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(&self.data, |node, key| node.get(*key))
    }

    /// The string at `path`, if present.
    pub fn str_at(&self, path: &[&str]) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// The string at `path`, or a parse error naming the path.
    pub fn require_str(&self, path: &[&str]) -> ConnectResult<String> {
        self.str_at(path).map(str::to_string).ok_or_else(|| {
            ConnectError::Parse(format!(
                "Response to '{}' has no '{}'",
                self.action,
                path.join("/")
            ))
        })
    }

    /// The node(s) at `path` as a list: a single element, repeated elements
    /// and an empty element all read uniformly.
    pub fn items(&self, path: &[&str]) -> Vec<&Value> {
        self.get(path).map(xml::node_list).unwrap_or_default()
    }

    /// Whether the node at `path` is missing or empty.
    pub fn is_empty_at(&self, path: &[&str]) -> bool {
        self.get(path).map(xml::is_empty_node).unwrap_or(true)
    }
}
