//! Group membership.

use crate::client::ConnectClient;
use crate::error::ConnectResult;
use crate::response::ActionResponse;
use crate::transport::ConnectTransport;
use crate::types::ActionParams;

impl<T: ConnectTransport> ConnectClient<T> {
    /// Add the user registered under `email` to `group_id`.
    pub async fn add_user_to_group(&self, group_id: &str, email: &str) -> ConnectResult<ActionResponse> {
        self.set_group_membership(group_id, email, true).await
    }

    /// Remove the user registered under `email` from `group_id`.
    pub async fn remove_user_from_group(&self, group_id: &str, email: &str) -> ConnectResult<ActionResponse> {
        self.set_group_membership(group_id, email, false).await
    }

    async fn set_group_membership(
        &self,
        group_id: &str,
        email: &str,
        is_member: bool,
    ) -> ConnectResult<ActionResponse> {
        let principal_id = self.get_user_id_by_email(email).await?;
        let params = ActionParams::new()
            .with("group-id", group_id)
            .with("principal-id", principal_id)
            .with("is-member", is_member);
        self.invoke("group-membership-update", params).await
    }
}
