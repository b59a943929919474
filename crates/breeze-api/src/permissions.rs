//! Meeting permissions (ACLs).
//!
//! Users are addressed by email and resolved to a principal id first.
//! Taking a user off a meeting sets `permission-id=remove`; meeting
//! membership is the list of principals holding `view`.

use crate::client::ConnectClient;
use crate::error::ConnectResult;
use crate::response::ActionResponse;
use crate::transport::ConnectTransport;
use crate::types::{ActionParams, Permission, Principal};
use log::debug;
use serde_json::Value;

impl<T: ConnectTransport> ConnectClient<T> {
    /// Grant `permission` on `meeting_id` to the user registered under `email`.
    pub async fn add_user_to_meeting(
        &self,
        meeting_id: &str,
        email: &str,
        permission: Permission,
    ) -> ConnectResult<ActionResponse> {
        let principal_id = self.get_user_id_by_email(email).await?;
        self.update_permission(meeting_id, &principal_id, permission).await
    }

    /// Clear whatever permission the user has on `meeting_id`.
    pub async fn remove_user_from_meeting(&self, meeting_id: &str, email: &str) -> ConnectResult<ActionResponse> {
        let principal_id = self.get_user_id_by_email(email).await?;
        self.update_permission(meeting_id, &principal_id, Permission::Remove)
            .await
    }

    async fn update_permission(
        &self,
        acl_id: &str,
        principal_id: &str,
        permission: Permission,
    ) -> ConnectResult<ActionResponse> {
        let params = ActionParams::new()
            .with("principal-id", principal_id)
            .with("acl-id", acl_id)
            .with("permission-id", permission);
        self.invoke("permissions-update", params).await
    }

    /// Principals holding `view` on `meeting_id`.
    pub async fn get_meeting_users(&self, meeting_id: &str) -> ConnectResult<Vec<Principal>> {
        let params = ActionParams::new()
            .with("acl-id", meeting_id)
            .with("filter-permission-id", Permission::View);
        let resp = self.invoke("permissions-info", params).await?;
        resp.items(&["permissions", "principal"])
            .into_iter()
            .map(Principal::from_node)
            .collect()
    }

    /// The permission the user registered under `email` holds on
    /// `meeting_id`, or `None` when there is none.
    pub async fn check_user_access(&self, meeting_id: &str, email: &str) -> ConnectResult<Option<Permission>> {
        let principal_id = self.get_user_id_by_email(email).await?;
        let params = ActionParams::new()
            .with("acl-id", meeting_id)
            .with("principal-id", &principal_id);
        let resp = self.invoke("permissions-info", params).await?;

        let entries = resp
            .items(&["permissions", "principal"])
            .into_iter()
            .chain(resp.items(&["permission"]));
        let permission_id = entries
            .filter(|node| match node.get("principal-id").and_then(Value::as_str) {
                Some(id) => id == principal_id,
                None => true,
            })
            .find_map(|node| node.get("permission-id").and_then(Value::as_str))
            .filter(|id| !id.is_empty());

        debug!(
            "Principal {} on {}: {}",
            principal_id,
            meeting_id,
            permission_id.unwrap_or("none")
        );
        permission_id.map(str::parse::<Permission>).transpose()
    }
}
